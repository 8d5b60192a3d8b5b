//! Include/exclude pattern evaluation for files and dirs.
//!
//! Patterns are regular expressions matched anywhere in the path (not
//! anchored). Each pattern is compiled on first use and cached, so a
//! malformed pattern only surfaces once evaluation reaches it.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::WatchConfig;
use crate::error::{Result, WatcherError};

/// A single lazily compiled pattern.
#[derive(Debug)]
struct Pattern {
    source: String,
    compiled: OnceLock<std::result::Result<Regex, regex::Error>>,
}

impl Pattern {
    fn new(source: String) -> Self {
        Self {
            source,
            compiled: OnceLock::new(),
        }
    }

    fn is_match(&self, haystack: &str) -> Result<bool> {
        match self.compiled.get_or_init(|| Regex::new(&self.source)) {
            Ok(re) => Ok(re.is_match(haystack)),
            Err(e) => Err(WatcherError::Pattern {
                pattern: self.source.clone(),
                source: e.clone(),
            }),
        }
    }
}

/// An ordered list of patterns.
#[derive(Debug, Default)]
struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    fn new(sources: &[String]) -> Self {
        Self {
            patterns: sources.iter().cloned().map(Pattern::new).collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True as soon as one pattern matches, in order.
    fn any_match(&self, haystack: &str) -> Result<bool> {
        for pattern in &self.patterns {
            if pattern.is_match(haystack)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Decides which files are reported and which dirs are registered.
#[derive(Debug, Default)]
pub struct PatternFilter {
    include_files: PatternSet,
    exclude_files: PatternSet,
    exclude_dirs: PatternSet,
}

impl PatternFilter {
    /// Create a filter from raw pattern lists.
    pub fn new(include_files: &[String], exclude_files: &[String], exclude_dirs: &[String]) -> Self {
        Self {
            include_files: PatternSet::new(include_files),
            exclude_files: PatternSet::new(exclude_files),
            exclude_dirs: PatternSet::new(exclude_dirs),
        }
    }

    /// Create a filter from a watch config.
    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(
            &config.include_files,
            &config.exclude_files,
            &config.exclude_dirs,
        )
    }

    /// Check if a changed file must be reported.
    ///
    /// Exclude patterns win over include patterns. With no include
    /// patterns every file that is not excluded is included.
    pub fn file_included(&self, path: &Path) -> Result<bool> {
        let path = path.to_string_lossy();

        if self.exclude_files.any_match(&path)? {
            return Ok(false);
        }
        if self.include_files.is_empty() {
            return Ok(true);
        }
        self.include_files.any_match(&path)
    }

    /// Check if a dir must be skipped, together with its sub dirs.
    pub fn dir_excluded(&self, path: &Path) -> Result<bool> {
        if self.exclude_dirs.is_empty() {
            return Ok(false);
        }
        self.exclude_dirs.any_match(&path.to_string_lossy())
    }
}
