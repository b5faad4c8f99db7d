//! Process existence checking.

use perfshot_common::ProcessResult;

/// Check if a process with the given PID exists and is running.
///
/// Performs a non-destructive probe: `kill(pid, 0)` sends no signal but
/// reports whether the process exists.
///
/// # Returns
///
/// * `Ok(true)` - Process exists and is running
/// * `Ok(false)` - Process does not exist
/// * `Err(_)` - Error occurred while checking
pub fn process_exists(pid: u32) -> ProcessResult<bool> {
    #[cfg(unix)]
    {
        process_exists_unix(pid)
    }

    #[cfg(not(unix))]
    {
        Err(perfshot_common::ProcessError::check_failed(
            pid,
            "process probing is only supported on Unix",
        ))
    }
}

#[cfg(unix)]
fn process_exists_unix(pid: u32) -> ProcessResult<bool> {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let nix_pid = Pid::from_raw(pid as i32);

    match kill(nix_pid, None) {
        Ok(_) => Ok(true),
        Err(nix::errno::Errno::ESRCH) => Ok(false),
        // Process exists but we don't have permission to signal it
        Err(nix::errno::Errno::EPERM) => Ok(true),
        Err(e) => Err(perfshot_common::ProcessError::check_failed(
            pid,
            e.to_string(),
        )),
    }
}
