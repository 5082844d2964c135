/// Signal delivery to sandbox processes
use log::info;
use nix::errno::Errno;

/// Delivers a raw signal number to an OS process
pub trait SignalSender {
    fn send(&self, pid: i32, signal: i32) -> nix::Result<()>;
}

/// Sends signals with kill(2). The raw number goes to the kernel unchanged,
/// so real-time signals are delivered too.
#[derive(Clone, Copy, Debug, Default)]
pub struct KillSender;

impl SignalSender for KillSender {
    fn send(&self, pid: i32, signal: i32) -> nix::Result<()> {
        if pid <= 0 {
            // kill(2) treats these as process groups, never a single sandbox
            return Err(Errno::ESRCH);
        }
        info!("Sending signal {} to process: {}", signal, pid);
        let rc = unsafe { libc::kill(pid, signal) };
        Errno::result(rc).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Command;

    #[test]
    fn test_unknown_signal_number_rejected_by_kernel() {
        let pid = std::process::id() as i32;
        assert_eq!(KillSender.send(pid, 4096), Err(Errno::EINVAL));
    }

    #[test]
    fn test_group_pids_rejected() {
        assert_eq!(KillSender.send(0, libc::SIGUSR1), Err(Errno::ESRCH));
        assert_eq!(KillSender.send(-1, libc::SIGUSR1), Err(Errno::ESRCH));
    }

    #[test]
    fn test_sigcont_to_self() {
        let pid = std::process::id() as i32;
        assert!(KillSender.send(pid, libc::SIGCONT).is_ok());
    }

    #[test]
    fn test_realtime_signal_is_delivered() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let rt_signal = libc::SIGRTMIN() + 5;

        let sent = KillSender.send(child.id() as i32, rt_signal);
        if sent.is_err() {
            let _ = child.kill();
        }
        let status = child.wait().unwrap();

        assert_eq!(sent, Ok(()));
        // Default action for real-time signals terminates the process
        assert_eq!(status.signal(), Some(rt_signal));
    }
}
