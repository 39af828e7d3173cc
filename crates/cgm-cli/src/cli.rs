use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use cgm_types::{MissingPolicy, TimeSource, DEFAULT_PATTERN, DEFAULT_RESULTS_SUBFOLDER};

#[derive(Parser)]
#[command(
    name = "cgmerge",
    about = "Merge per-timestep CGNS results into a single container",
    version,
)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["project", "result_dir_input", "host_config"]),
))]
pub struct Cli {
    /// Project to merge: an .ipro archive or a folder holding project.xml
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Results folder to merge directly, without a project
    #[arg(long)]
    pub result_dir_input: Option<PathBuf>,

    /// Read every setting from a host record (TOML)
    #[arg(
        long,
        conflicts_with_all = [
            "output_dir", "result_dir", "pattern", "output_cgns_name",
            "time_source", "missing_policy", "dry_run",
        ],
    )]
    pub host_config: Option<PathBuf>,

    /// Directory receiving the merged project or container
    #[arg(long, required_unless_present = "host_config")]
    pub output_dir: Option<PathBuf>,

    /// Results subfolder inside the project
    #[arg(long, default_value = DEFAULT_RESULTS_SUBFOLDER)]
    pub result_dir: String,

    /// Glob selecting the timestep files
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// File name of the merged container [default: Case1.cgn]
    #[arg(long)]
    pub output_cgns_name: Option<String>,

    #[arg(long, value_enum, default_value = "from_filename")]
    pub time_source: TimeSourceArg,

    #[arg(long, value_enum, default_value = "error")]
    pub missing_policy: MissingPolicyArg,

    /// Validate only; write nothing
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum TimeSourceArg {
    FromFilename,
    FromCgns,
}

impl From<TimeSourceArg> for TimeSource {
    fn from(arg: TimeSourceArg) -> Self {
        match arg {
            TimeSourceArg::FromFilename => TimeSource::FromFilename,
            TimeSourceArg::FromCgns => TimeSource::FromCgns,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum MissingPolicyArg {
    Error,
    Skip,
}

impl From<MissingPolicyArg> for MissingPolicy {
    fn from(arg: MissingPolicyArg) -> Self {
        match arg {
            MissingPolicyArg::Error => MissingPolicy::Error,
            MissingPolicyArg::Skip => MissingPolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_project_with_defaults() {
        let cli = Cli::try_parse_from(["cgmerge", "--project", "case.ipro", "--output-dir", "out"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("case.ipro")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.result_dir, "result");
        assert_eq!(cli.pattern, "Solution*.cgn");
        assert_eq!(cli.time_source, TimeSourceArg::FromFilename);
        assert_eq!(cli.missing_policy, MissingPolicyArg::Error);
        assert!(!cli.dry_run);
    }

    #[test]
    fn parse_all_options() {
        let cli = Cli::try_parse_from([
            "cgmerge", "--result-dir-input", "r", "--output-dir", "o",
            "--pattern", "Step*.cgn", "--output-cgns-name", "M.cgn",
            "--time-source", "from_cgns", "--missing-policy", "skip", "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.result_dir_input, Some(PathBuf::from("r")));
        assert_eq!(cli.output_cgns_name, Some("M.cgn".into()));
        assert_eq!(cli.time_source, TimeSourceArg::FromCgns);
        assert_eq!(cli.missing_policy, MissingPolicyArg::Skip);
        assert!(cli.dry_run);
    }

    #[test]
    fn inputs_are_exclusive() {
        let res = Cli::try_parse_from([
            "cgmerge", "--project", "p", "--result-dir-input", "r", "--output-dir", "o",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn an_input_is_required() {
        assert!(Cli::try_parse_from(["cgmerge", "--output-dir", "o"]).is_err());
    }

    #[test]
    fn output_dir_required_without_host_config() {
        assert!(Cli::try_parse_from(["cgmerge", "--project", "p"]).is_err());
        let cli = Cli::try_parse_from(["cgmerge", "--host-config", "host.toml"]).unwrap();
        assert_eq!(cli.host_config, Some(PathBuf::from("host.toml")));
    }

    #[test]
    fn host_config_conflicts_with_run_flags() {
        for extra in [
            &["--output-dir", "o"][..],
            &["--dry-run"][..],
            &["--pattern", "Step*.cgn"][..],
            &["--missing-policy", "skip"][..],
        ] {
            let mut argv = vec!["cgmerge", "--host-config", "host.toml"];
            argv.extend_from_slice(extra);
            let err = Cli::try_parse_from(argv).err().unwrap();
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict, "{extra:?}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn unknown_time_source_rejected() {
        let res = Cli::try_parse_from([
            "cgmerge", "--project", "p", "--output-dir", "o", "--time-source", "from_clock",
        ]);
        assert!(res.is_err());
    }
}
