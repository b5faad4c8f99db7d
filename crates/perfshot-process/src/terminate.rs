//! Process termination primitives.

use perfshot_common::{ProcessError, ProcessResult};

/// Terminate a process gracefully (SIGTERM).
pub fn terminate_gracefully(pid: u32) -> ProcessResult<()> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let nix_pid = Pid::from_raw(pid as i32);
        kill(nix_pid, Signal::SIGTERM).map_err(|e| ProcessError::stop_failed(pid, e.to_string()))
    }

    #[cfg(not(unix))]
    {
        Err(ProcessError::stop_failed(
            pid,
            "signal-based termination is only supported on Unix",
        ))
    }
}

/// Force kill a process (SIGKILL).
pub fn force_kill(pid: u32) -> ProcessResult<()> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let nix_pid = Pid::from_raw(pid as i32);
        kill(nix_pid, Signal::SIGKILL).map_err(|e| ProcessError::stop_failed(pid, e.to_string()))
    }

    #[cfg(not(unix))]
    {
        Err(ProcessError::stop_failed(
            pid,
            "signal-based termination is only supported on Unix",
        ))
    }
}
