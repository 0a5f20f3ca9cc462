//! Resident-memory sampling from the `/proc/<pid>/statm` pseudo-file.
//!
//! Readings are transient: recomputed on every poll, never cached. A
//! sample of 0 means "unavailable" (process reaped, permission denied,
//! transient read failure) and is never an error to the caller.

use crate::config::types::ArtifactFilter;
use nix::unistd::Pid;
use std::fs;

/// Largest representable sample: 2^31 - 1 bytes scaled to KB. Readings
/// that would overflow the verdict's 31-bit space clamp here instead of
/// propagating garbage.
const MAX_SAMPLE_KB: u64 = (i32::MAX as u64) >> 10;

/// Samples resident set size for arbitrary pids, alive or zombie.
pub struct MemorySampler {
    page_size: u64,
    filter: ArtifactFilter,
}

impl MemorySampler {
    pub fn new(filter: ArtifactFilter) -> Self {
        // SAFETY: sysconf is a read-only query with no side effects.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let page_size = if page_size > 0 { page_size as u64 } else { 4096 };
        MemorySampler { page_size, filter }
    }

    /// Resident set size of `pid` in KB, 0 when unavailable.
    ///
    /// The second whitespace-delimited field of statm is the resident
    /// page count; pages times the system page size gives bytes.
    pub fn sample(&self, pid: Pid) -> u64 {
        let raw = match fs::read_to_string(format!("/proc/{}/statm", pid)) {
            Ok(contents) => contents,
            Err(_) => return 0,
        };
        let pages: u64 = match raw.split_whitespace().nth(1).and_then(|f| f.parse().ok()) {
            Some(pages) => pages,
            None => return 0,
        };
        pages_to_kb(pages, self.page_size)
    }

    /// Whether `reading_kb` is an ignorable artifact: a value close enough
    /// to the controller's own current footprint that it likely measures
    /// the judging process rather than the child. Artifact readings must
    /// not update the peak or trigger a memory violation.
    pub fn is_artifact(&self, reading_kb: u64) -> bool {
        if !self.filter.enabled {
            return false;
        }
        let own_kb = self.sample(Pid::this());
        is_artifact_of(reading_kb, own_kb, &self.filter)
    }
}

fn pages_to_kb(pages: u64, page_size: u64) -> u64 {
    (pages.saturating_mul(page_size) / 1024).min(MAX_SAMPLE_KB)
}

fn is_artifact_of(reading_kb: u64, own_kb: u64, filter: &ArtifactFilter) -> bool {
    if own_kb == 0 {
        return false;
    }
    let reading = reading_kb as f64;
    let own = own_kb as f64;
    reading >= own * filter.lower_ratio && reading <= own * filter.upper_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> MemorySampler {
        MemorySampler::new(ArtifactFilter::default())
    }

    #[test]
    fn samples_own_process() {
        let reading = sampler().sample(Pid::this());
        assert!(reading > 0, "own resident memory should be nonzero");
        assert!(reading <= MAX_SAMPLE_KB);
    }

    #[test]
    fn unavailable_pid_reads_as_zero() {
        // Pid::from_raw with a raw value no process can have.
        let reading = sampler().sample(Pid::from_raw(i32::MAX - 1));
        assert_eq!(reading, 0);
    }

    #[test]
    fn overflowing_readings_clamp_to_31_bits() {
        assert_eq!(pages_to_kb(u64::MAX, 4096), MAX_SAMPLE_KB);
        assert_eq!(pages_to_kb(1024, 4096), 4096);
    }

    #[test]
    fn artifact_window_is_inclusive() {
        let filter = ArtifactFilter::default();
        assert!(is_artifact_of(500, 1000, &filter));
        assert!(is_artifact_of(2000, 1000, &filter));
        assert!(is_artifact_of(1000, 1000, &filter));
        assert!(!is_artifact_of(499, 1000, &filter));
        assert!(!is_artifact_of(2001, 1000, &filter));
    }

    #[test]
    fn zero_own_footprint_never_marks_artifacts() {
        let filter = ArtifactFilter::default();
        assert!(!is_artifact_of(1000, 0, &filter));
    }

    #[test]
    fn disabled_filter_takes_readings_at_face_value() {
        let sampler = MemorySampler::new(ArtifactFilter {
            enabled: false,
            ..ArtifactFilter::default()
        });
        let own = sampler.sample(Pid::this());
        assert!(!sampler.is_artifact(own));
    }
}
