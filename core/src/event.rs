//! Change events delivered by the notification primitive.

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind};

/// A single file system change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path to the affected file or directory.
    pub path: PathBuf,

    /// The kind of change. Filtering never looks at it.
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// File or directory was created.
    Create,

    /// File contents were written.
    Write,

    /// File or directory was removed.
    Remove,

    /// File or directory was renamed.
    Rename,

    /// Permissions or other metadata changed.
    Chmod,
}

impl ChangeKind {
    /// Map a notify event kind onto a change kind.
    ///
    /// Access events (open, read, close) do not change anything and map to
    /// `None`.
    pub fn from_notify(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Access(_) => None,
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(Self::Chmod),
            EventKind::Modify(_) => Some(Self::Write),
            EventKind::Remove(_) => Some(Self::Remove),
            _ => Some(Self::Write),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn test_from_notify_kinds() {
        assert_eq!(
            ChangeKind::from_notify(EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Create)
        );
        assert_eq!(
            ChangeKind::from_notify(EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeKind::Write)
        );
        assert_eq!(
            ChangeKind::from_notify(EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(ChangeKind::Rename)
        );
        assert_eq!(
            ChangeKind::from_notify(EventKind::Modify(ModifyKind::Metadata(
                MetadataKind::Permissions
            ))),
            Some(ChangeKind::Chmod)
        );
        assert_eq!(
            ChangeKind::from_notify(EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Remove)
        );
    }

    #[test]
    fn test_access_is_not_a_change() {
        assert_eq!(ChangeKind::from_notify(EventKind::Access(AccessKind::Read)), None);
    }
}
