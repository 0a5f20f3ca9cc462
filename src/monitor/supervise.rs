//! The limit-enforcement loop.
//!
//! Polling rather than signal-driven accounting: enforcing time and
//! memory ceilings on an adversarial child with only POSIX primitives
//! requires a bounded worst-case detection latency, and a blocking wait
//! would make enforcement impossible. The controller never pauses the
//! child; the only action available is the kill in [`super::terminate`].

use crate::config::types::RunConfig;
use crate::monitor::sampler::MemorySampler;
use crate::monitor::terminate::terminate;
use crate::verdict::{RunVerdict, LAUNCH_FAILED, MEMORY_EXCEEDED, TIME_EXCEEDED};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::thread;
use std::time::Instant;

/// Observe `child` until it exits or violates a configured ceiling.
///
/// `started` must be taken immediately after successful process creation;
/// elapsed time is measured from there, not from configuration parse time.
/// Runs in the controller only, single-threaded, and always leaves with
/// the child either reaped or signaled-then-reaped. Telemetry failures
/// read as zero and never end the loop; a wait failure other than EINTR
/// does (child presumed gone), so a zombie never spins us forever.
pub fn supervise(child: Pid, config: &RunConfig, started: Instant) -> RunVerdict {
    let sampler = MemorySampler::new(config.artifact_filter);
    let padded_time_limit = config.padded_time_limit();
    let memory_limit = config.memory_limit();

    let mut used_time_ms: u64 = 0;
    let mut peak_kb: u64 = 0;
    let mut exit_code: i32 = LAUNCH_FAILED;

    loop {
        match waitpid(child, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                thread::sleep(config.tuning.poll_quantum);

                let elapsed = started.elapsed();
                used_time_ms = elapsed.as_millis() as u64;
                if let Some(limit) = padded_time_limit {
                    if elapsed > limit {
                        log::debug!(
                            "time limit violated: {}ms elapsed, killing pid {}",
                            used_time_ms,
                            child
                        );
                        let report = terminate(child);
                        log::debug!("kill report for pid {}: {:?}", child, report);
                        reap(child);
                        exit_code = TIME_EXCEEDED;
                        break;
                    }
                }

                let sample_kb = sampler.sample(child);
                let ignorable = sample_kb > 0 && sampler.is_artifact(sample_kb);
                if !ignorable && sample_kb > peak_kb {
                    peak_kb = sample_kb;
                }
                if let Some(limit) = memory_limit {
                    if !ignorable && sample_kb > limit {
                        log::debug!(
                            "memory limit violated: {}KB > {}KB, killing pid {}",
                            sample_kb,
                            limit,
                            child
                        );
                        let report = terminate(child);
                        log::debug!("kill report for pid {}: {:?}", child, report);
                        reap(child);
                        exit_code = MEMORY_EXCEEDED;
                        break;
                    }
                }
            }
            Ok(WaitStatus::Exited(_, code)) => {
                used_time_ms = started.elapsed().as_millis() as u64;
                exit_code = code;
                break;
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                used_time_ms = started.elapsed().as_millis() as u64;
                exit_code = 128 + signal as i32;
                break;
            }
            // Stopped/continued children are still alive; keep observing.
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                // ECHILD or similar: nothing left to observe or reap.
                log::warn!("waitpid on pid {} failed: {}", child, e);
                used_time_ms = started.elapsed().as_millis() as u64;
                break;
            }
        }
    }

    RunVerdict {
        used_time_ms,
        used_memory_kb: peak_kb,
        exit_code,
    }
}

/// Blocking reap after a forced kill. SIGKILL delivery is not reaping;
/// the process table entry stays until collected here.
fn reap(child: Pid) {
    loop {
        match waitpid(child, None) {
            Err(Errno::EINTR) => continue,
            // Exited, signaled, or ECHILD if something else collected it.
            _ => break,
        }
    }
}
