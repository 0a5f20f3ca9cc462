//! Process creation: signal-mask setup, fork, child-side stdio
//! redirection, privilege drop, and image replacement.
//!
//! The child branch never returns to the caller. After fork it either
//! replaces its image with the judged program or `_exit`s with
//! [`LAUNCH_FAILED`], so the monitor always observes an abnormal exit
//! within one polling quantum instead of a hang.

use crate::config::types::{JudgeError, Result, RunAsUser, RunConfig};
use crate::verdict::LAUNCH_FAILED;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::signal::{sigprocmask, SigSet, SigmaskHow, Signal};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2, execvp, fork, ForkResult, Pid};
use std::ffi::{CStr, CString};
use std::os::fd::RawFd;
use std::path::Path;

/// Fork the judged process and return its pid to the controller.
///
/// SIGCHLD is blocked in the controller's mask before forking so child
/// status is collected deterministically by the monitor's waitpid rather
/// than raced by a signal handler. Fork failure is reported without side
/// effects beyond that mask.
pub fn spawn(config: &RunConfig) -> Result<Pid> {
    let argv = config.argv();
    if argv.is_empty() {
        return Err(JudgeError::Config("empty command line".to_string()));
    }

    // Build the C argv up front; the child branch must not be the place
    // where a NUL byte surfaces as an error.
    let mut cargv = Vec::with_capacity(argv.len());
    for arg in &argv {
        cargv.push(CString::new(arg.as_str()).map_err(|_| {
            JudgeError::Config("command line contains NUL byte".to_string())
        })?);
    }

    let mut mask = SigSet::empty();
    mask.add(Signal::SIGCHLD);
    sigprocmask(SigmaskHow::SIG_BLOCK, Some(&mask), None)
        .map_err(|e| JudgeError::Process(format!("sigprocmask: {}", e)))?;

    // SAFETY: the child branch calls only exec-safe operations (open,
    // dup2, setresgid/setresuid, execvp, _exit) and never unwinds back
    // into the caller.
    match unsafe { fork() }.map_err(|e| JudgeError::Process(format!("fork: {}", e)))? {
        ForkResult::Parent { child } => {
            log::debug!("forked child pid {}", child);
            Ok(child)
        }
        ForkResult::Child => child_main(config, &cargv),
    }
}

/// Child branch: stdio redirection, privilege drop, exec.
fn child_main(config: &RunConfig, cargv: &[CString]) -> ! {
    if setup_stdio(config).is_err() {
        // SAFETY: _exit skips atexit handlers and stdio flushing, which
        // must not run in the forked child.
        unsafe { libc::_exit(LAUNCH_FAILED) }
    }

    // When a run-as user is configured the drop is unconditional; a child
    // that cannot shed the controller's credentials must not run at all.
    if let Some(user) = config.run_as {
        if drop_privileges(user).is_err() {
            unsafe { libc::_exit(LAUNCH_FAILED) }
        }
    }

    let argv_ref: Vec<&CStr> = cargv.iter().map(|a| a.as_c_str()).collect();
    let _ = execvp(argv_ref[0], &argv_ref);

    // execvp only returns on failure (bad executable, ENOENT).
    unsafe { libc::_exit(LAUNCH_FAILED) }
}

/// Rewire the three standard streams to the configured files.
fn setup_stdio(config: &RunConfig) -> nix::Result<()> {
    if let Some(path) = &config.stdin_file {
        let fd = open(path.as_path(), OFlag::O_RDONLY, Mode::empty())?;
        dup2(fd, libc::STDIN_FILENO)?;
        close(fd)?;
    }
    if let Some(path) = &config.stdout_file {
        redirect_output(path, libc::STDOUT_FILENO)?;
    }
    if let Some(path) = &config.stderr_file {
        redirect_output(path, libc::STDERR_FILENO)?;
    }
    Ok(())
}

/// Create or truncate an output file with mode 0644: owner read-write,
/// group and world read, never world-writable.
fn redirect_output(path: &Path, target_fd: RawFd) -> nix::Result<()> {
    let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
    let fd = open(
        path,
        OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_TRUNC,
        mode,
    )?;
    dup2(fd, target_fd)?;
    close(fd)?;
    Ok(())
}

/// Transition to the unprivileged run-as credentials. GID before UID:
/// once the uid transition lands the process can no longer change its
/// gids.
fn drop_privileges(user: RunAsUser) -> std::result::Result<(), Errno> {
    // SAFETY: setresgid/setresuid atomically set real, effective and
    // saved ids.
    let rc = unsafe { libc::setresgid(user.gid, user.gid, user.gid) };
    if rc != 0 {
        return Err(Errno::last());
    }
    let rc = unsafe { libc::setresuid(user.uid, user.uid, user.uid) };
    if rc != 0 {
        return Err(Errno::last());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::RunConfig;

    #[test]
    fn spawn_rejects_an_empty_command_line() {
        let config = RunConfig::new("   ");
        match spawn(&config) {
            Err(JudgeError::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other.map(|p| p.as_raw())),
        }
    }

    #[test]
    fn spawn_rejects_nul_bytes() {
        let config = RunConfig::new("/bin/true\0oops");
        match spawn(&config) {
            Err(JudgeError::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other.map(|p| p.as_raw())),
        }
    }
}
