use clap::Parser;
use tracing::Level;

mod cli;
mod commands;
mod host;

fn main() {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    std::process::exit(commands::run(cli));
}
