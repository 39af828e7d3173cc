use colored::Colorize;

use cgm_container::Hdf5Format;
use cgm_engine::{MergeOutcome, MergeOutput, Merger};
use cgm_types::{exit_code, InputSelector, MergeError, MergeOptions, MergeRequest};

use crate::cli::Cli;
use crate::host::HostRecord;

/// Run the merge described by `cli` and return the process exit code.
pub fn run(cli: Cli) -> i32 {
    match execute(cli) {
        Ok(outcome) => {
            report(&outcome);
            exit_code::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            match err.downcast_ref::<MergeError>() {
                Some(merge) => merge.exit_code(),
                None => exit_code::UNEXPECTED,
            }
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<MergeOutcome> {
    let request = build_request(cli)?;
    let outcome = Merger::new(Hdf5Format).run(&request)?;
    Ok(outcome)
}

fn build_request(cli: Cli) -> anyhow::Result<MergeRequest> {
    if let Some(path) = &cli.host_config {
        let record = HostRecord::load(path)
            .map_err(|e| MergeError::user_input(format!("{e:#}")))?;
        return Ok(record.into_request()?);
    }

    let input = match (cli.project, cli.result_dir_input) {
        (Some(project), None) => InputSelector::Project(project),
        (None, Some(results)) => InputSelector::ResultsDir(results),
        _ => return Err(MergeError::user_input("exactly one input path is required").into()),
    };
    let output_dir = cli
        .output_dir
        .ok_or_else(|| MergeError::user_input("--output-dir is required"))?;

    let mut options = MergeOptions {
        results_subfolder: cli.result_dir,
        pattern: cli.pattern,
        time_source: cli.time_source.into(),
        missing_policy: cli.missing_policy.into(),
        dry_run: cli.dry_run,
        ..MergeOptions::default()
    };
    if let Some(name) = cli.output_cgns_name.filter(|n| !n.is_empty()) {
        options.output_name = name;
    }
    Ok(MergeRequest::new(input, output_dir).with_options(options))
}

fn report(outcome: &MergeOutcome) {
    for line in report_lines(outcome) {
        println!("{line}");
    }
}

/// Console summary of a finished run. A dry run names no output path.
fn report_lines(outcome: &MergeOutcome) -> Vec<String> {
    let mut lines: Vec<String> = outcome
        .skipped
        .iter()
        .map(|skipped| {
            format!(
                "  {} {} ({})",
                "skipped:".yellow(),
                skipped.source_path.display(),
                skipped.reason
            )
        })
        .collect();
    match &outcome.output {
        None => lines.push(format!(
            "{} dry-run complete: no output written ({} timesteps valid)",
            "✓".green().bold(),
            outcome.entries.len()
        )),
        Some(output) => {
            let label = match output {
                MergeOutput::Archive(_) => "archive",
                MergeOutput::ProjectFolder(_) => "project folder",
                MergeOutput::Container(_) => "container",
            };
            lines.push(format!(
                "{} merged {} timesteps",
                "✓".green().bold(),
                outcome.entries.len().to_string().bold()
            ));
            lines.push(format!(
                "  output written ({label}): {}",
                output.path().display().to_string().cyan()
            ));
        }
    }
    lines
}
