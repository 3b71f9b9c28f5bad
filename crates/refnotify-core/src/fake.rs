//! In-memory [`RepoQuery`] for unit tests.
//!
//! Commits are numbered; a higher number is newer. Diffs are synthetic text
//! that names the endpoints, so tests can see which ranges were rendered.

use chrono::{FixedOffset, TimeZone};
use refnotify_git::{
    BranchHead, Commit, CommitDetail, GitError, ObjectId, Person, RepoQuery, TagInfo,
};
use std::collections::{BTreeMap, HashSet};

/// Ids carry the number in their leading digits so short forms stay distinct
pub fn oid(n: u32) -> ObjectId {
    ObjectId::parse(&format!("{:07x}{}", n, "0".repeat(33))).unwrap()
}

struct FakeCommit {
    commit: Commit,
    patch: String,
}

#[derive(Default)]
pub struct FakeRepo {
    commits: BTreeMap<u32, FakeCommit>,
    branches: Vec<BranchHead>,
    tags: Vec<(ObjectId, TagInfo)>,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_commit(&mut self, n: u32, parents: &[u32], subject: &str) -> ObjectId {
        self.add_commit_with_patch(n, parents, subject, &format!("+change {n}\n"))
    }

    pub fn add_commit_with_patch(
        &mut self,
        n: u32,
        parents: &[u32],
        subject: &str,
        patch: &str,
    ) -> ObjectId {
        let commit = Commit {
            id: oid(n),
            parents: parents.iter().map(|p| oid(*p)).collect(),
            subject: subject.to_string(),
        };
        self.commits.insert(
            n,
            FakeCommit {
                commit,
                patch: patch.to_string(),
            },
        );
        oid(n)
    }

    pub fn branch(&mut self, name: &str, n: u32) {
        self.branches.push(BranchHead {
            name: name.to_string(),
            id: oid(n),
        });
    }

    pub fn annotated_tag(&mut self, n: u32, name: &str, target: u32, message: &str) -> ObjectId {
        self.tags.push((
            oid(n),
            TagInfo {
                name: name.to_string(),
                tagger: Some(person(n)),
                message: message.to_string(),
                target: oid(target),
            },
        ));
        oid(n)
    }

    fn number(&self, id: &ObjectId) -> Result<u32, GitError> {
        self.commits
            .iter()
            .find(|(_, c)| &c.commit.id == id)
            .map(|(n, _)| *n)
            .ok_or_else(|| GitError::InvalidObjectId(id.to_string()))
    }

    fn ancestors(&self, tip: &ObjectId) -> Result<HashSet<u32>, GitError> {
        let mut seen = HashSet::new();
        let mut stack = vec![self.number(tip)?];
        while let Some(n) = stack.pop() {
            if seen.insert(n) {
                for parent in &self.commits[&n].commit.parents {
                    stack.push(self.number(parent)?);
                }
            }
        }
        Ok(seen)
    }

    fn newest_first(&self, numbers: HashSet<u32>) -> Vec<Commit> {
        let mut numbers: Vec<u32> = numbers.into_iter().collect();
        numbers.sort_unstable_by(|a, b| b.cmp(a));
        numbers
            .into_iter()
            .map(|n| self.commits[&n].commit.clone())
            .collect()
    }
}

fn person(n: u32) -> Person {
    let time = FixedOffset::east_opt(3600)
        .unwrap()
        .timestamp_opt(1_700_000_000 + i64::from(n) * 60, 0)
        .unwrap();
    Person {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        time,
    }
}

impl RepoQuery for FakeRepo {
    fn branch_heads(&self) -> Result<Vec<BranchHead>, GitError> {
        Ok(self.branches.clone())
    }

    fn recent_commits(&self, tip: &ObjectId, limit: usize) -> Result<Vec<Commit>, GitError> {
        let mut commits = self.newest_first(self.ancestors(tip)?);
        commits.truncate(limit);
        Ok(commits)
    }

    fn commits_between(
        &self,
        exclude: &ObjectId,
        include: &ObjectId,
    ) -> Result<Vec<Commit>, GitError> {
        let mut set = self.ancestors(include)?;
        if !exclude.is_zero() {
            for n in self.ancestors(exclude)? {
                set.remove(&n);
            }
        }
        Ok(self.newest_first(set))
    }

    fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> Result<Option<ObjectId>, GitError> {
        let left = self.ancestors(a)?;
        let right = self.ancestors(b)?;
        Ok(left.intersection(&right).max().map(|n| oid(*n)))
    }

    fn commit(&self, id: &ObjectId) -> Result<Commit, GitError> {
        Ok(self.commits[&self.number(id)?].commit.clone())
    }

    fn commit_detail(&self, id: &ObjectId) -> Result<CommitDetail, GitError> {
        let n = self.number(id)?;
        let commit = self.commits[&n].commit.clone();
        let message = format!("{}\n\nDetails for change {n}.\n", commit.subject);
        Ok(CommitDetail {
            commit,
            author: person(n),
            message,
        })
    }

    fn diff_stat(&self, from: Option<&ObjectId>, to: &ObjectId) -> Result<String, GitError> {
        let from = from.map(|f| f.short().to_string()).unwrap_or_else(|| "root".into());
        Ok(format!(" stat {}..{}\n", from, to.short()))
    }

    fn diff_patch(&self, from: Option<&ObjectId>, to: &ObjectId) -> Result<String, GitError> {
        let from = from.map(|f| f.short().to_string()).unwrap_or_else(|| "root".into());
        let patch = &self.commits[&self.number(to)?].patch;
        Ok(format!("patch {}..{}\n{}", from, to.short(), patch))
    }

    fn peel_to_commit(&self, id: &ObjectId) -> Result<Option<ObjectId>, GitError> {
        if self.number(id).is_ok() {
            return Ok(Some(id.clone()));
        }
        Ok(self
            .tags
            .iter()
            .find(|(tag, _)| tag == id)
            .map(|(_, info)| info.target.clone()))
    }

    fn tag_info(&self, id: &ObjectId) -> Result<Option<TagInfo>, GitError> {
        Ok(self
            .tags
            .iter()
            .find(|(tag, _)| tag == id)
            .map(|(_, info)| info.clone()))
    }
}
