//! Run orchestration: spawn the child, then hand it to the monitor.

use crate::config::types::{Result, RunConfig};
use crate::exec::launcher;
use crate::monitor::supervise::supervise;
use crate::verdict::RunVerdict;
use std::time::Instant;

/// Execute one judging run end to end.
///
/// A `Err` here means the child was never created (setup failure); the
/// caller must not monitor anything and renders the launch-failure
/// verdict instead. Once the fork succeeds every outcome, including a
/// failed exec inside the child, arrives as a verdict.
pub fn run(config: &RunConfig) -> Result<RunVerdict> {
    let child = launcher::spawn(config)?;

    // The clock starts at successful creation, not at parse time.
    let started = Instant::now();

    let verdict = supervise(child, config, started);
    log::debug!(
        "run finished: pid {} time {}ms peak {}KB exit {}",
        child,
        verdict.used_time_ms,
        verdict.used_memory_kb,
        verdict.exit_code
    );
    Ok(verdict)
}
