//! judgebox: a single-use process sandbox for program judging
//!
//! Launches exactly one external program under wall-clock-time and
//! resident-memory ceilings, observes it until it terminates or violates a
//! limit, and reports the outcome as a fixed-shape verdict record.
//!
//! # Architecture
//!
//! Data flows strictly downward through the stages:
//!
//! - [`exec::launcher`]: signal-mask setup, fork, child-side stdio
//!   redirection, privilege drop, and image replacement
//! - [`monitor::sampler`]: `/proc/<pid>/statm` resident-memory sampling
//!   with artifact filtering
//! - [`monitor::supervise`]: the polling limit-enforcement loop
//! - [`monitor::terminate`]: idempotent forced kill of a runaway child
//! - [`verdict`]: the terminal `{usedTime, usedMemory, exitCode}` record
//!
//! # Design principles
//!
//! 1. **Kernel as truth** - verdicts derive from wait status and `/proc`,
//!    never from guesses about what the child did
//! 2. **Bounded detection latency** - polling with an explicit quantum and
//!    grace margin, never an unbounded blocking wait
//! 3. **Violations are fatal** - a limit breach always kills the child;
//!    there is no graceful-shutdown or retry path
//! 4. **One reporting channel** - every outcome, including judge-side
//!    failure, is expressed in the verdict's exit-code space

// Configuration & error types
pub mod config;

// Process creation and run orchestration
pub mod exec;

// Sampling, limit enforcement, termination
pub mod monitor;

// Terminal verdict record
pub mod verdict;

// CLI entrypoint wiring for the judgebox binary
pub mod cli;

// Re-export commonly used types for convenience
pub use config::types::{
    ArtifactFilter, JudgeError, MonitorTuning, Result, RunAsUser, RunConfig,
};
pub use verdict::RunVerdict;
