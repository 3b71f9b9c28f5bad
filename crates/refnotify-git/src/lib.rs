//! # refnotify-git
//!
//! Repository access for the refnotify push hook.
//!
//! The notifier never scrapes `git` command output. It asks typed questions
//! through [`RepoQuery`] (recent commits, merge base, commits between two
//! tips, diffstat, patch) and gets typed answers back.
//!
//! ## Key Types
//!
//! - [`RepoQuery`] - The query interface the notifier is written against
//! - [`GitRepo`] - libgit2 implementation of [`RepoQuery`]
//! - [`ObjectId`] - Hex object name, including the all-zero sentinel
//! - [`Commit`] / [`CommitDetail`] - Short and full commit views
//!
//! ## Usage
//!
//! ```rust,ignore
//! use refnotify_git::{GitRepo, ObjectId, RepoQuery};
//! use std::path::Path;
//!
//! let repo = GitRepo::discover(Path::new("."))?;
//! let tip: ObjectId = "…".parse()?;
//! for commit in repo.recent_commits(&tip, 20)? {
//!     println!("{}", commit.short_line());
//! }
//! ```

mod query;
mod repo;
mod types;

pub use query::RepoQuery;
pub use repo::{repo_name_from_path, GitError, GitRepo};
pub use types::{BranchHead, Commit, CommitDetail, ObjectId, Person, TagInfo};
