//! CLI entrypoint wiring for the judgebox binary.
//!
//! Thin wrapper around the core: parses the option surface into a
//! [`RunConfig`], runs the judging core, and serializes the verdict to
//! stdout. A launch failure still prints a verdict record; the verdict
//! is the only reporting channel.

use crate::config::types::{RunAsUser, RunConfig};
use crate::exec::executor;
use crate::verdict::RunVerdict;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command line to run the judged program (whitespace-tokenized, no quoting)
    #[arg(short = 'C', long = "command_line")]
    command_line: String,
    /// Time limit in milliseconds (0 = unlimited)
    #[arg(short = 'T', long = "time_limit", default_value_t = 0)]
    time_limit: u64,
    /// Memory limit in KB (0 = unlimited)
    #[arg(short = 'M', long = "memory_limit", default_value_t = 0)]
    memory_limit: u64,
    /// Standard input file path
    #[arg(short = 'I', long = "input_file_path")]
    input_file_path: Option<PathBuf>,
    /// Output file path
    #[arg(short = 'O', long = "output_file_path")]
    output_file_path: Option<PathBuf>,
    /// Standard error file path
    #[arg(short = 'E', long = "error_file_path")]
    error_file_path: Option<PathBuf>,
    /// Run the child as this unprivileged uid
    #[arg(long = "run_as_uid", requires = "run_as_gid")]
    run_as_uid: Option<u32>,
    /// Run the child as this unprivileged gid
    #[arg(long = "run_as_gid", requires = "run_as_uid")]
    run_as_gid: Option<u32>,
    /// Print verbose messages
    #[arg(short = 'v', long)]
    verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Verbosity is a log filter threaded from here, not ambient globals.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .init();

    let mut config = RunConfig::new(cli.command_line);
    config.time_limit_ms = cli.time_limit;
    config.memory_limit_kb = cli.memory_limit;
    config.stdin_file = cli.input_file_path;
    config.stdout_file = cli.output_file_path;
    config.stderr_file = cli.error_file_path;
    config.run_as = match (cli.run_as_uid, cli.run_as_gid) {
        (Some(uid), Some(gid)) => Some(RunAsUser { uid, gid }),
        _ => None,
    };

    let verdict = match executor::run(&config) {
        Ok(verdict) => verdict,
        Err(e) => {
            log::error!("launch failed: {}", e);
            RunVerdict::launch_failure()
        }
    };

    println!("{}", serde_json::to_string(&verdict)?);
    Ok(())
}
