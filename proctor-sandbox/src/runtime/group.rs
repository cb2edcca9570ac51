//! Process-group helpers
//!
//! Children are started as leaders of their own process group so a timeout
//! can take down anything they forked, not just the direct child. Reaping of
//! processes that escape the group (`setsid`, double fork) is not attempted.

use std::io;

/// Make the calling process the leader of a new process group.
///
/// Runs inside `pre_exec`, between fork and exec.
#[cfg(unix)]
pub(crate) fn set_process_group() -> io::Result<()> {
    if unsafe { libc::setpgid(0, 0) } == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// SIGKILL every process in group `pgid` (best-effort).
#[cfg(unix)]
pub(crate) fn kill_process_group(pgid: u32) -> io::Result<()> {
    let result = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
    if result == -1 {
        let err = io::Error::last_os_error();
        // ESRCH: the group is already gone.
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn kill_process_group(_pgid: u32) -> io::Result<()> {
    Ok(())
}

/// Block until `pid` has exited, leaving it unreaped.
///
/// While the zombie exists its pid cannot be handed out again, so `pid` still
/// names only our process group. The caller must reap it afterwards.
#[cfg(unix)]
pub(crate) async fn wait_exited_unreaped(pid: u32) -> io::Result<()> {
    tokio::task::spawn_blocking(move || loop {
        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        let flags = libc::WEXITED | libc::WNOWAIT;
        if unsafe { libc::waitid(libc::P_PID, pid as libc::id_t, &mut info, flags) } == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    })
    .await
    .map_err(io::Error::other)?
}
