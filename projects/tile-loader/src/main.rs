mod cli;
mod commands;

use anyhow::Result;
use cli::{Args, Command};

fn main() -> Result<()> {
    let args = Args::parse_args();

    // Logs go to stderr so stdout stays valid JSON
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let report = match args.command {
        Command::Count(dataset) => commands::count(dataset)?,
        Command::Summarize(dataset) => commands::summarize(dataset)?,
    };
    println!("{}", report);

    Ok(())
}
