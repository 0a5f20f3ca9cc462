/// Core types and structures for the judgebox system
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Unprivileged credentials the child transitions to before exec.
///
/// When configured this is unconditionally applied in the child branch;
/// a failed transition aborts the child rather than letting it run with
/// the controller's privileges.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RunAsUser {
    pub uid: u32,
    pub gid: u32,
}

/// Heuristic filter for memory readings that reflect the controller's own
/// footprint rather than the child's.
///
/// A managed-runtime host (e.g. a VM-hosted judge harness) can bleed its
/// own resident size into readings taken from the judging process. A
/// reading inside `[lower_ratio, upper_ratio]` of the controller's current
/// resident memory is treated as ignorable: it never updates the peak and
/// never triggers a memory violation. The bounds are configuration, not
/// physics; set `enabled = false` to take every reading at face value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ArtifactFilter {
    pub enabled: bool,
    pub lower_ratio: f64,
    pub upper_ratio: f64,
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        ArtifactFilter {
            enabled: true,
            lower_ratio: 0.5,
            upper_ratio: 2.0,
        }
    }
}

/// Monitor loop cadence parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MonitorTuning {
    /// Sleep between polls. Long enough to avoid pegging a core, short
    /// enough that violations are caught with sub-limit-scale latency.
    pub poll_quantum: Duration,
    /// Additive slack on the time limit to absorb scheduling jitter that
    /// the polling cadence itself introduces.
    pub grace: Duration,
}

impl Default for MonitorTuning {
    fn default() -> Self {
        MonitorTuning {
            poll_quantum: Duration::from_micros(500),
            grace: Duration::from_millis(100),
        }
    }
}

/// Immutable input for one judging run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Command line for the judged program. Tokenized into argv by
    /// whitespace; quoting and escaping are not supported.
    pub command_line: String,
    /// Redirect child stdin from this file (optional)
    pub stdin_file: Option<PathBuf>,
    /// Redirect child stdout to this file (optional)
    pub stdout_file: Option<PathBuf>,
    /// Redirect child stderr to this file (optional)
    pub stderr_file: Option<PathBuf>,
    /// Wall-clock time limit in milliseconds, 0 meaning unlimited
    pub time_limit_ms: u64,
    /// Resident-memory limit in kilobytes, 0 meaning unlimited
    pub memory_limit_kb: u64,
    /// Credentials to drop to in the child before exec
    pub run_as: Option<RunAsUser>,
    /// Polling cadence and artifact-filter settings
    #[serde(default)]
    pub tuning: MonitorTuning,
    /// Artifact-filter settings for memory readings
    #[serde(default)]
    pub artifact_filter: ArtifactFilter,
}

impl RunConfig {
    /// Build a config with default tuning for the given command line.
    pub fn new<S: Into<String>>(command_line: S) -> Self {
        RunConfig {
            command_line: command_line.into(),
            stdin_file: None,
            stdout_file: None,
            stderr_file: None,
            time_limit_ms: 0,
            memory_limit_kb: 0,
            run_as: None,
            tuning: MonitorTuning::default(),
            artifact_filter: ArtifactFilter::default(),
        }
    }

    /// Naive whitespace tokenization of the command line. No shell, no
    /// quoting: `echo "a b"` produces three arguments.
    pub fn argv(&self) -> Vec<String> {
        self.command_line
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Time limit padded by the grace margin, or `None` when unlimited.
    pub fn padded_time_limit(&self) -> Option<Duration> {
        if self.time_limit_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.time_limit_ms) + self.tuning.grace)
        }
    }

    /// Memory ceiling in KB, or `None` when unlimited.
    pub fn memory_limit(&self) -> Option<u64> {
        if self.memory_limit_kb == 0 {
            None
        } else {
            Some(self.memory_limit_kb)
        }
    }
}

/// Errors surfaced to the caller of the judging core.
///
/// Only setup-stage failures travel this channel. Everything after a
/// successful fork is expressed through the verdict's exit-code space.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<nix::errno::Errno> for JudgeError {
    fn from(err: nix::errno::Errno) -> Self {
        JudgeError::Process(err.to_string())
    }
}

/// Result type alias for judgebox operations
pub type Result<T> = std::result::Result<T, JudgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_splits_on_whitespace() {
        let config = RunConfig::new("/usr/bin/python3  -u   main.py");
        assert_eq!(config.argv(), vec!["/usr/bin/python3", "-u", "main.py"]);
    }

    #[test]
    fn argv_does_not_honor_quoting() {
        // Documented limitation: quotes are ordinary characters.
        let config = RunConfig::new("echo \"a b\"");
        assert_eq!(config.argv(), vec!["echo", "\"a", "b\""]);
    }

    #[test]
    fn argv_of_empty_command_line_is_empty() {
        assert!(RunConfig::new("   ").argv().is_empty());
    }

    #[test]
    fn zero_limits_mean_unlimited() {
        let config = RunConfig::new("/bin/true");
        assert!(config.padded_time_limit().is_none());
        assert!(config.memory_limit().is_none());
    }

    #[test]
    fn padded_time_limit_includes_grace() {
        let mut config = RunConfig::new("/bin/sleep 5");
        config.time_limit_ms = 1000;
        let padded = config.padded_time_limit().unwrap();
        assert_eq!(padded, Duration::from_millis(1000) + config.tuning.grace);
    }
}
