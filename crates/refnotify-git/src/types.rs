use chrono::{DateTime, FixedOffset};
use std::fmt;

use crate::GitError;

/// Hex object name as printed by git
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse a 40 (sha1) or 64 (sha256) digit hex object name
    pub fn parse(s: &str) -> Result<Self, GitError> {
        let valid_len = s.len() == 40 || s.len() == 64;
        if !valid_len || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GitError::InvalidObjectId(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The "does not exist" sentinel
    pub fn zero() -> Self {
        Self("0".repeat(40))
    }

    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used in short logs and subjects
    pub fn short(&self) -> &str {
        &self.0[..7]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<git2::Oid> for ObjectId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

/// A commit as seen by the notifier: identity, ancestry and subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: ObjectId,
    pub parents: Vec<ObjectId>,
    pub subject: String,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// One-line form: `abc1234 subject`
    pub fn short_line(&self) -> String {
        format!("{} {}", self.id.short(), self.subject)
    }
}

/// Name, email and time of an author or tagger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub time: DateTime<FixedOffset>,
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Everything needed to print a full log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetail {
    pub commit: Commit,
    pub author: Person,
    pub message: String,
}

/// Annotated tag object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub tagger: Option<Person>,
    pub message: String,
    pub target: ObjectId,
}

/// Tip of a local branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchHead {
    pub name: String,
    pub id: ObjectId,
}
