//! # Directory Watch Engine
//!
//! Watches a set of directories, filters change events by name patterns and
//! reports the last changed path once a burst of changes has settled.
//!
//! ## Features
//!
//! - **Pattern Filtering**: Regex include/exclude rules for files and dirs
//! - **Directory Enumeration**: Recursive registration with skip rules and a limit
//! - **Debouncing**: One report per burst, carrying the latest path
//! - **Fatal Error Stream**: Runtime failures surface to the owner of the session
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Watch Session                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  WatchConfig ──► enumerate ──► Subscriber ──► ChangeEvent       │
//! │       │              │                            │             │
//! │       ▼              ▼                            ▼             │
//! │  PatternFilter ◄─────┘                       Debouncer ──► Reporter
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod debounce;
pub mod enumerate;
pub mod error;
pub mod event;
pub mod filter;
pub mod session;

pub use config::{APP_DIR, DEFAULT_DELAY, DEFAULT_LIMIT, WatchConfig, resolve_base_dir};
pub use debounce::{Debouncer, Reporter};
pub use enumerate::{Subscriber, enumerate};
pub use error::{Result, WatcherError};
pub use event::{ChangeEvent, ChangeKind};
pub use filter::PatternFilter;
pub use session::{NotifySubscriber, RawStreams, WatchSession};
