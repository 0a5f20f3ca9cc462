//! Forced termination of a limit-violating or runaway child.

use nix::errno::Errno;
use nix::sys::ptrace;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// What the terminator actually delivered.
#[derive(Clone, Copy, Debug, Default)]
pub struct KillReport {
    pub trace_kill_sent: bool,
    pub kill_sent: bool,
}

/// Two-step forced stop: a best-effort PTRACE_KILL for children that were
/// placed under trace, then an unconditional SIGKILL.
///
/// Idempotent: ESRCH is tolerated at every step, so calling this twice,
/// or on a pid that already exited, never fails the controller. This is
/// the only removal path; there is no graceful-shutdown or retry.
pub fn terminate(pid: Pid) -> KillReport {
    let mut report = KillReport::default();

    // Ignored when the child was never traced.
    report.trace_kill_sent = ptrace::kill(pid).is_ok();

    match kill(pid, Signal::SIGKILL) {
        Ok(()) => report.kill_sent = true,
        Err(Errno::ESRCH) => {
            log::debug!("terminate: pid {} already gone", pid);
        }
        Err(e) => {
            log::warn!("terminate: SIGKILL to pid {} failed: {}", pid, e);
        }
    }

    report
}
