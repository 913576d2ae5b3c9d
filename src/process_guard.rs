//! Installer process lifetime tied to the wizard
//!
//! The installer partitions and formats disks, so it must never outlive a
//! wizard that crashed or was killed. Three layers make sure of that:
//!
//! - the child runs in its own process group with `PR_SET_PDEATHSIG`, so the
//!   kernel signals it when the spawning thread goes away
//! - its PID sits in a global registry; SIGINT/SIGTERM/SIGHUP handlers
//!   terminate every registered group before exiting
//! - `ProcessGuard`, held by the front end, does the same when dropped
//!
//! Termination sends SIGTERM to the group, waits a grace period, then sends
//! SIGKILL to whatever is left. None of this is reachable by the operator
//! while the wizard is healthy.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

/// Grace period used when the guard is dropped
pub const DROP_GRACE: Duration = Duration::from_secs(5);
/// Grace period used from the signal handler thread
pub const SIGNAL_GRACE: Duration = Duration::from_secs(3);

static REGISTRY: OnceLock<Mutex<ChildRegistry>> = OnceLock::new();

/// PIDs of running installer process groups
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    terminating: bool,
}

impl ChildRegistry {
    /// Lock the process-wide registry. A poisoned lock is recovered since the
    /// PID set stays consistent across a panic.
    pub fn global() -> MutexGuard<'static, ChildRegistry> {
        REGISTRY
            .get_or_init(|| Mutex::new(ChildRegistry::default()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        debug!("Tracking installer process group {}", pid);
    }

    pub fn unregister(&mut self, pid: u32) {
        if self.pids.remove(&pid) {
            debug!("Installer process group {} released", pid);
        }
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    /// Terminate every tracked group. Only the first call does anything.
    pub fn terminate_all(&mut self, grace: Duration) {
        if self.terminating {
            return;
        }
        self.terminating = true;

        if self.pids.is_empty() {
            return;
        }
        let pids: Vec<u32> = self.pids.drain().collect();
        info!("Terminating {} installer process group(s)", pids.len());

        for &pid in &pids {
            signal_group(pid, Signal::SIGTERM);
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if !pids.iter().any(|&pid| is_alive(pid)) {
                info!("Installer processes exited after SIGTERM");
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }

        for &pid in pids.iter().filter(|&&pid| is_alive(pid)) {
            warn!("Process group {} ignored SIGTERM, sending SIGKILL", pid);
            signal_group(pid, Signal::SIGKILL);
        }
    }
}

/// Signal the whole group, falling back to the leader alone
fn signal_group(pid: u32, sig: Signal) {
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = signal::kill(Pid::from_raw(-raw), sig) {
        debug!("Group signal {} to {} failed ({}), signalling leader", sig, pid, e);
        if let Err(e) = signal::kill(Pid::from_raw(raw), sig) {
            debug!("Signal {} to {} failed: {}", sig, pid, e);
        }
    }
}

/// Running and not a zombie
fn is_alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if signal::kill(Pid::from_raw(raw), None).is_err() {
        return false;
    }
    // Third field of /proc/<pid>/stat is the state letter
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => {
            let state = stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next());
            !matches!(state, Some("Z" | "X"))
        }
        Err(_) => true,
    }
}

/// Terminates registered installer processes when dropped
#[derive(Debug)]
pub struct ProcessGuard {
    grace: Duration,
    armed: bool,
}

impl ProcessGuard {
    pub fn new() -> Self {
        Self::with_grace(DROP_GRACE)
    }

    /// Guard with a custom grace period
    pub fn with_grace(grace: Duration) -> Self {
        Self { grace, armed: true }
    }

    /// Stop the guard from terminating anything, e.g. once the install ended
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut registry = ChildRegistry::global();
        if !registry.is_empty() {
            debug!("ProcessGuard dropped with live installer, cleaning up");
            registry.terminate_all(self.grace);
        }
    }
}

/// Install SIGINT/SIGTERM/SIGHUP handlers that kill the installer before
/// the wizard exits with `128 + signal`.
pub fn init_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    thread::Builder::new()
        .name("signal-guard".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!("Received signal {}, stopping installer", sig);
                ChildRegistry::global().terminate_all(SIGNAL_GRACE);
                std::process::exit(128 + sig);
            }
        })?;
    Ok(())
}

/// Spawn-time setup for installer commands
pub trait GuardedCommand {
    /// Own process group, killed by the kernel if the spawning thread dies
    fn guarded(&mut self) -> &mut Self;
}

impl GuardedCommand for std::process::Command {
    fn guarded(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;

        self.process_group(0);
        // SAFETY: the closure only issues the prctl syscall, which is
        // async-signal-safe, between fork and exec.
        unsafe {
            self.pre_exec(|| {
                nix::sys::prctl::set_pdeathsig(Signal::SIGTERM).map_err(std::io::Error::from)
            });
        }
        self
    }
}
