//! Directory enumeration for watch roots.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::filter::PatternFilter;

/// Registers a single directory with the notification primitive.
///
/// Registration is never recursive: sub dirs are registered one by one by
/// [`enumerate`].
pub trait Subscriber {
    /// Start receiving change events for the entries of `dir`.
    fn subscribe(&mut self, dir: &Path) -> Result<()>;
}

impl<F> Subscriber for F
where
    F: FnMut(&Path) -> Result<()>,
{
    fn subscribe(&mut self, dir: &Path) -> Result<()> {
        self(dir)
    }
}

/// Register `root` and, if `recursive`, up to `limit` of its sub dirs.
///
/// Hidden dirs and dirs matching an exclude-dir pattern are skipped along
/// with everything below them. An excluded root registers nothing. Returns
/// the registered dirs in registration order.
pub fn enumerate<S>(
    root: &Path,
    recursive: bool,
    limit: usize,
    filter: &PatternFilter,
    subscriber: &mut S,
) -> Result<Vec<PathBuf>>
where
    S: Subscriber + ?Sized,
{
    let mut registered = Vec::new();

    if filter.dir_excluded(root)? {
        debug!("Skip excluded root: {}", root.display());
        return Ok(registered);
    }

    debug!("Add path: {}", root.display());
    subscriber.subscribe(root)?;
    registered.push(root.to_path_buf());

    if !recursive {
        return Ok(registered);
    }

    let mut subdirs = 0;
    let mut entries = WalkDir::new(root).min_depth(1).into_iter();
    while let Some(entry) = entries.next() {
        if subdirs >= limit {
            debug!("Sub dir limit {limit} reached for {}", root.display());
            break;
        }

        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }

        if is_hidden(entry.file_name()) {
            entries.skip_current_dir();
            continue;
        }

        let path = entry.path();
        if filter.dir_excluded(path)? {
            debug!("Skip excluded dir: {}", path.display());
            entries.skip_current_dir();
            continue;
        }

        debug!("Add sub path: {}", path.display());
        subscriber.subscribe(path)?;
        registered.push(path.to_path_buf());
        subdirs += 1;
    }

    Ok(registered)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatcherError;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn tree(dirs: &[&str]) -> TempDir {
        let root = TempDir::new().unwrap();
        for dir in dirs {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        root
    }

    fn run(root: &Path, recursive: bool, limit: usize, filter: &PatternFilter) -> Vec<PathBuf> {
        let mut seen = Vec::new();
        let mut record = |dir: &Path| -> Result<()> {
            seen.push(dir.to_path_buf());
            Ok(())
        };
        let registered = enumerate(root, recursive, limit, filter, &mut record).unwrap();
        assert_eq!(registered, seen);
        registered
    }

    fn exclude_dirs(list: &[&str]) -> PatternFilter {
        let list: Vec<String> = list.iter().map(|s| (*s).to_string()).collect();
        PatternFilter::new(&[], &[], &list)
    }

    #[test]
    fn test_non_recursive_registers_root_only() {
        let root = tree(&["src", "docs"]);

        let registered = run(root.path(), false, 100, &PatternFilter::default());
        assert_eq!(registered, vec![root.path().to_path_buf()]);
    }

    #[test]
    fn test_hidden_and_excluded_dirs_are_pruned() {
        let root = tree(&[
            "src/nested",
            ".hidden/inner",
            "node_modules/pkg",
            ".git/objects",
        ]);
        fs::write(root.path().join("src/main.rs"), "fn main() {}").unwrap();

        let registered: BTreeSet<_> = run(root.path(), true, 100, &exclude_dirs(&["node_modules"]))
            .into_iter()
            .collect();

        let expected: BTreeSet<_> = [
            root.path().to_path_buf(),
            root.path().join("src"),
            root.path().join("src/nested"),
        ]
        .into_iter()
        .collect();
        assert_eq!(registered, expected);
    }

    #[test]
    fn test_scenario_src_hidden_node_modules() {
        let root = tree(&["src", ".hidden", "node_modules"]);

        let mut registered = run(root.path(), true, 100, &exclude_dirs(&["node_modules"]));
        registered.sort();
        assert_eq!(
            registered,
            vec![root.path().to_path_buf(), root.path().join("src")]
        );
    }

    #[test]
    fn test_limit_caps_sub_dirs() {
        let root = tree(&["a", "b", "c", "d", "e", "f/g", "f/h"]);

        let registered = run(root.path(), true, 3, &PatternFilter::default());
        assert_eq!(registered.len(), 4);
        assert_eq!(registered[0], root.path());
    }

    #[test]
    fn test_zero_limit_registers_root_only() {
        let root = tree(&["a", "b"]);

        let registered = run(root.path(), true, 0, &PatternFilter::default());
        assert_eq!(registered, vec![root.path().to_path_buf()]);
    }

    #[test]
    fn test_excluded_root_registers_nothing() {
        let root = tree(&["src"]);

        let registered = run(root.path(), true, 100, &exclude_dirs(&[".*"]));
        assert!(registered.is_empty());
    }

    #[test]
    fn test_subscribe_error_aborts() {
        let root = tree(&["a", "b", "c"]);
        let mut calls = 0;
        let mut failing = |dir: &Path| -> Result<()> {
            calls += 1;
            if calls == 2 {
                return Err(WatcherError::InvalidBaseDir(dir.to_path_buf()));
            }
            Ok(())
        };

        let result = enumerate(root.path(), true, 100, &PatternFilter::default(), &mut failing);
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_pattern_error_aborts() {
        let root = tree(&["a"]);
        let mut record = |_: &Path| -> Result<()> { Ok(()) };

        let result = enumerate(root.path(), true, 100, &exclude_dirs(&["(bad"]), &mut record);
        assert!(matches!(result, Err(WatcherError::Pattern { .. })));
    }

    #[test]
    fn test_missing_root_walk_error() {
        let root = tree(&[]);
        let missing = root.path().join("missing");
        let mut record = |_: &Path| -> Result<()> { Ok(()) };

        let result = enumerate(&missing, true, 100, &PatternFilter::default(), &mut record);
        assert!(matches!(result, Err(WatcherError::Walk(_))));
    }
}
