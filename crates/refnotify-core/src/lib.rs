//! # refnotify-core
//!
//! Push notification logic: classify each ref update and render the
//! notification that describes it.
//!
//! ## Overview
//!
//! For every `(old, new, ref)` triple the notifier:
//! 1. Classifies the update (branch created / deleted / fast-forwarded /
//!    rewound / rebased, tag created / changed / deleted)
//! 2. Derives a subject line
//! 3. Renders a body with commit logs and diffs, falling back to a plain
//!    commit list when the body grows past the configured size
//!
//! ## Key Types
//!
//! - [`RefUpdateNotifier`] - Entry point, one message per update
//! - [`RefUpdate`] - Parsed hook input
//! - [`NotifierConfig`] - Rendering settings
//! - [`NotificationMessage`] - Subject, custom headers and body

pub mod classify;
mod config;
mod error;
mod message;
mod notifier;
pub mod render;
pub mod subject;
mod update;

#[cfg(test)]
mod fake;

pub use classify::{classify, BranchChange, Classification, TagAction, TagChange};
pub use config::{
    NotifierConfig, DEFAULT_MAX_DIFF_SIZE, DEFAULT_RECENT_COMMITS, DEFAULT_SUBJECT_PREFIX,
};
pub use error::NotifyError;
pub use message::{
    NotificationMessage, HEADER_NEWREV, HEADER_OLDREV, HEADER_REFNAME, HEADER_REFTYPE,
    HEADER_REPOSITORY,
};
pub use notifier::RefUpdateNotifier;
pub use update::{parse_updates, RefKind, RefUpdate};
