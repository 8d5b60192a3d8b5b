//! Configuration types for a watch session.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WatcherError};

/// Environment variable consulted for the base dir when none is given.
pub const APP_DIR: &str = "APP_DIR";

/// Default number of sub dirs registered per watch root.
pub const DEFAULT_LIMIT: usize = 100;

/// Default quiet period before a burst of changes is reported.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Immutable configuration for a watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Absolute dir that relative watch roots are resolved against.
    pub base_dir: PathBuf,

    /// Watch roots, absolute or relative to `base_dir`.
    pub watch_dirs: Vec<PathBuf>,

    /// Whether sub dirs of each watch root are registered too.
    pub recursive: bool,

    /// Maximum number of sub dirs registered per watch root.
    pub limit: usize,

    /// Quiet period before the last change of a burst is reported.
    pub delay: Duration,

    /// Only files matching at least one of these are reported.
    /// An empty list includes everything.
    pub include_files: Vec<String>,

    /// Files matching any of these are never reported.
    pub exclude_files: Vec<String>,

    /// Dirs matching any of these are not registered, nor their sub dirs.
    pub exclude_dirs: Vec<String>,
}

impl WatchConfig {
    /// Create a new config rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            watch_dirs: Vec::new(),
            recursive: false,
            limit: DEFAULT_LIMIT,
            delay: DEFAULT_DELAY,
            include_files: Vec::new(),
            exclude_files: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }

    /// Add a watch root.
    pub fn watch(mut self, dir: impl Into<PathBuf>) -> Self {
        self.watch_dirs.push(dir.into());
        self
    }

    /// Register sub dirs of each watch root.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the sub dir limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the debounce delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Add an include-file pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_files.push(pattern.into());
        self
    }

    /// Add an exclude-file pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_files.push(pattern.into());
        self
    }

    /// Add an exclude-dir pattern.
    pub fn exclude_dir(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_dirs.push(pattern.into());
        self
    }

    /// Resolve every watch root to an absolute path.
    ///
    /// Absolute roots are kept as given; relative ones are joined onto the
    /// base dir. Both are cleaned lexically.
    pub fn resolved_watch_dirs(&self) -> Vec<PathBuf> {
        self.watch_dirs
            .iter()
            .map(|dir| clean(&self.base_dir.join(dir)))
            .collect()
    }
}

/// Resolve the base dir, in order: flag, `APP_DIR` value, working dir.
///
/// `cwd` is only called when needed. A relative base is joined onto the
/// working dir. The result must be an existing directory.
pub fn resolve_base_dir<F>(flag: Option<PathBuf>, env: Option<OsString>, cwd: F) -> Result<PathBuf>
where
    F: FnOnce() -> io::Result<PathBuf>,
{
    let given = flag
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from));

    let base = match given {
        Some(p) if p.is_absolute() => p,
        Some(p) => cwd()?.join(p),
        None => cwd().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => WatcherError::InvalidBaseDir(PathBuf::new()),
            _ => WatcherError::Io(e),
        })?,
    };
    let base = clean(&base);

    if !base.is_dir() {
        return Err(WatcherError::InvalidBaseDir(base));
    }
    Ok(base)
}

/// Lexically remove `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
