/// Terminal verdict record and the sentinel exit-code space
use serde::{Deserialize, Serialize};

/// Sentinel exit code: the child exceeded the memory ceiling.
pub const MEMORY_EXCEEDED: i32 = 1001;

/// Sentinel exit code: the child exceeded the time ceiling.
pub const TIME_EXCEEDED: i32 = 1010;

/// The child could not be created or observed. Also what an exec failure
/// in the child reports, conventionally.
pub const LAUNCH_FAILED: i32 = 127;

/// The terminal record of one judging run.
///
/// Created once when the monitor loop ends, immutable thereafter. The
/// exit code is either the child's real exit status (signal deaths as
/// `128 + signo`) or one of the sentinels above; there is no separate
/// error-reporting channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunVerdict {
    /// Wall time elapsed from process creation, in milliseconds
    #[serde(rename = "usedTime")]
    pub used_time_ms: u64,
    /// Peak observed resident memory, in kilobytes
    #[serde(rename = "usedMemory")]
    pub used_memory_kb: u64,
    /// Exit code or sentinel
    #[serde(rename = "exitCode")]
    pub exit_code: i32,
}

impl RunVerdict {
    /// The verdict rendered when the child could not even be created.
    pub fn launch_failure() -> Self {
        RunVerdict {
            used_time_ms: 0,
            used_memory_kb: 0,
            exit_code: LAUNCH_FAILED,
        }
    }

    pub fn is_time_exceeded(&self) -> bool {
        self.exit_code == TIME_EXCEEDED
    }

    pub fn is_memory_exceeded(&self) -> bool {
        self.exit_code == MEMORY_EXCEEDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_the_compact_judge_record() {
        let verdict = RunVerdict {
            used_time_ms: 42,
            used_memory_kb: 1024,
            exit_code: 0,
        };
        let json = serde_json::to_string(&verdict).unwrap();
        assert_eq!(json, r#"{"usedTime":42,"usedMemory":1024,"exitCode":0}"#);
    }

    #[test]
    fn launch_failure_is_zeroed_with_127() {
        let verdict = RunVerdict::launch_failure();
        assert_eq!(verdict.used_time_ms, 0);
        assert_eq!(verdict.used_memory_kb, 0);
        assert_eq!(verdict.exit_code, LAUNCH_FAILED);
    }

    #[test]
    fn sentinels_are_out_of_band() {
        // Real exit codes are 0..=255 plus 128+signo; sentinels must not
        // collide with that space.
        assert!(TIME_EXCEEDED > 255 + 128);
        assert!(MEMORY_EXCEEDED > 255 + 128);
        assert_ne!(TIME_EXCEEDED, MEMORY_EXCEEDED);
    }
}
