//! Scoped change of the process working directory.
//!
//! [`WorkdirGuard`] enters a directory and restores the previous one when
//! dropped, whether the scope ends normally, via early `?` return, or by
//! unwinding from a panic.
//!
//! The working directory is process-global. Running two guards on
//! different threads at the same time is not supported.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Guard that restores the previous working directory when dropped.
#[derive(Debug)]
pub struct WorkdirGuard {
    previous: Option<PathBuf>,
}

impl WorkdirGuard {
    /// Change into `dir`, remembering where we came from.
    ///
    /// If the current directory cannot be determined (it may have been
    /// deleted) there is nothing to restore and the guard only enters `dir`.
    ///
    /// # Errors
    /// Returns error if `dir` cannot be entered.
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir().ok();
        env::set_current_dir(dir)?;
        debug!(dir = %dir.display(), "entered working directory");
        Ok(Self { previous })
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Some(previous) = &self.previous {
            if let Err(e) = env::set_current_dir(previous) {
                warn!(error = %e, "failed to restore working directory");
            }
        }
    }
}

/// Run `f` with `dir` as the current directory.
///
/// The previous directory is restored on every exit path, including a
/// panic inside `f`.
///
/// # Errors
/// Returns error if `dir` cannot be entered; `f`'s own result is passed
/// through untouched.
pub fn with_workdir<T>(dir: &Path, f: impl FnOnce() -> T) -> io::Result<T> {
    let _guard = WorkdirGuard::enter(dir)?;
    Ok(f())
}
