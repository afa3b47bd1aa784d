use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// PID file making this the only running instance.
///
/// Acquiring terminates any other live instance first. The file is removed
/// on drop.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(pid) = read_pid(path) {
            if pid != std::process::id() as i32 && is_alive(pid) {
                tracing::info!(pid, "terminating running instance");
                terminate(pid);
            }
        }

        fs::write(path, std::process::id().to_string())
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // A newer instance may own the file by now
        if read_pid(&self.path) == Some(std::process::id() as i32) {
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn read_pid(path: &Path) -> Option<i32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Signal `None` only checks that the process exists.
fn is_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

fn terminate(pid: i32) {
    if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
        tracing::warn!(pid, error = %e, "failed to terminate running instance");
        return;
    }

    let started = Instant::now();
    while is_alive(pid) && started.elapsed() < SHUTDOWN_TIMEOUT {
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_writes_and_removes_pid() {
        let path = std::env::temp_dir().join(format!("musebar-lock-{}.pid", std::process::id()));

        {
            let _lock = InstanceLock::acquire(&path).unwrap();
            assert_eq!(read_pid(&path), Some(std::process::id() as i32));
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_stale_pid_is_replaced() {
        let path = std::env::temp_dir().join(format!("musebar-stale-{}.pid", std::process::id()));
        // Far above any real pid_max
        fs::write(&path, "999999999").unwrap();

        let lock = InstanceLock::acquire(&path).unwrap();
        assert_eq!(read_pid(&path), Some(std::process::id() as i32));
        drop(lock);
    }
}
