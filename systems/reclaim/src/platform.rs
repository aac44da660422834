//! Memory capabilities of the host operating system.

use neuropulse_core::bytes_to_mb;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::debug;

use crate::{MemoryPlatform, ReclaimError, TrimOutcome};

/// [`MemoryPlatform`] for the target the binary was compiled for.
///
/// Resident memory is read through `sysinfo`. Allocator release uses
/// `malloc_trim` on glibc targets and is a no-op elsewhere. The working-set
/// trim is only available on Windows.
#[derive(Debug)]
pub struct NativePlatform {
    system: System,
    pid: Option<Pid>,
}

impl Default for NativePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl NativePlatform {
    /// Creates a platform handle for the current process.
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }
}

impl MemoryPlatform for NativePlatform {
    fn resident_mb(&mut self) -> Result<f64, ReclaimError> {
        let pid = self.pid.ok_or(ReclaimError::ResidentMemoryUnavailable)?;
        let _ = self
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let process = self
            .system
            .process(pid)
            .ok_or(ReclaimError::ResidentMemoryUnavailable)?;
        Ok(bytes_to_mb(process.memory()))
    }

    fn request_collection(&mut self) {
        release_free_heap();
    }

    fn trim_working_set(&mut self) -> TrimOutcome {
        trim_current_process()
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[allow(unsafe_code)]
fn release_free_heap() {
    // SAFETY: malloc_trim only walks glibc's own arenas and releases pages
    // that hold no live allocation; it takes no pointers from the caller.
    let released = unsafe { libc::malloc_trim(0) };
    debug!(released = released != 0, "asked the allocator to release free heap");
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn release_free_heap() {
    debug!("allocator release not available on this target");
}

#[cfg(windows)]
#[allow(unsafe_code)]
fn trim_current_process() -> TrimOutcome {
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, SetProcessWorkingSetSize};

    // SAFETY: GetCurrentProcess returns a pseudo handle that is always valid
    // for the calling process. Passing `usize::MAX` for both bounds asks the
    // system to remove as many pages as possible from the working set.
    let trimmed = unsafe { SetProcessWorkingSetSize(GetCurrentProcess(), usize::MAX, usize::MAX) };
    if trimmed != 0 {
        debug!("working set trimmed");
        TrimOutcome::Trimmed
    } else {
        TrimOutcome::Failed(ReclaimError::Trim(std::io::Error::last_os_error()))
    }
}

#[cfg(not(windows))]
fn trim_current_process() -> TrimOutcome {
    TrimOutcome::Unsupported
}
