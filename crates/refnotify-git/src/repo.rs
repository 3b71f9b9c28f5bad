use chrono::{FixedOffset, Offset, TimeZone, Utc};
use git2::{
    BranchType, DiffFormat, DiffOptions, DiffStatsFormat, ErrorCode, ObjectType, Oid, Repository,
    Signature, Sort, Tree,
};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::{BranchHead, Commit, CommitDetail, ObjectId, Person, RepoQuery, TagInfo};

const DIFFSTAT_WIDTH: usize = 72;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Git operation failed: {0}")]
    GitOperationFailed(#[from] git2::Error),

    #[error("Invalid object id: {0:?}")]
    InvalidObjectId(String),
}

/// [`RepoQuery`] backed by libgit2
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open the repository containing `path` (a git dir or a work tree)
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                GitError::NotARepo(path.display().to_string())
            } else {
                GitError::GitOperationFailed(e)
            }
        })?;
        debug!(git_dir = %repo.path().display(), "Opened repository");
        Ok(Self { repo })
    }

    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Repository name derived from the git dir path
    pub fn default_name(&self) -> String {
        repo_name_from_path(self.repo.path())
    }

    fn oid(id: &ObjectId) -> Result<Oid, GitError> {
        Ok(Oid::from_str(id.as_str())?)
    }

    fn to_commit(commit: &git2::Commit<'_>) -> Commit {
        Commit {
            id: commit.id().into(),
            parents: commit.parent_ids().map(ObjectId::from).collect(),
            subject: commit.summary().unwrap_or("").to_string(),
        }
    }

    fn tree_of(&self, id: Option<&ObjectId>) -> Result<Option<Tree<'_>>, GitError> {
        match id {
            Some(id) => Ok(Some(self.repo.find_commit(Self::oid(id)?)?.tree()?)),
            None => Ok(None),
        }
    }

    fn diff(&self, from: Option<&ObjectId>, to: &ObjectId) -> Result<git2::Diff<'_>, GitError> {
        let old_tree = self.tree_of(from)?;
        let new_tree = self.tree_of(Some(to))?;

        let mut opts = DiffOptions::new();
        let mut diff =
            self.repo
                .diff_tree_to_tree(old_tree.as_ref(), new_tree.as_ref(), Some(&mut opts))?;
        diff.find_similar(None)?;
        Ok(diff)
    }

    fn walk(&self, exclude: Option<&ObjectId>, include: &ObjectId) -> Result<git2::Revwalk<'_>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(Self::oid(include)?)?;
        if let Some(exclude) = exclude.filter(|id| !id.is_zero()) {
            revwalk.hide(Self::oid(exclude)?)?;
        }
        Ok(revwalk)
    }
}

impl RepoQuery for GitRepo {
    fn branch_heads(&self) -> Result<Vec<BranchHead>, GitError> {
        let mut heads = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let (Some(name), Some(target)) = (branch.name()?, branch.get().target()) else {
                continue;
            };
            heads.push(BranchHead {
                name: name.to_string(),
                id: target.into(),
            });
        }
        Ok(heads)
    }

    fn recent_commits(&self, tip: &ObjectId, limit: usize) -> Result<Vec<Commit>, GitError> {
        let mut commits = Vec::new();
        for oid in self.walk(None, tip)?.take(limit) {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(Self::to_commit(&commit));
        }
        Ok(commits)
    }

    fn commits_between(
        &self,
        exclude: &ObjectId,
        include: &ObjectId,
    ) -> Result<Vec<Commit>, GitError> {
        let mut commits = Vec::new();
        for oid in self.walk(Some(exclude), include)? {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(Self::to_commit(&commit));
        }
        debug!(
            exclude = %exclude,
            include = %include,
            count = commits.len(),
            "Listed commits"
        );
        Ok(commits)
    }

    fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> Result<Option<ObjectId>, GitError> {
        match self.repo.merge_base(Self::oid(a)?, Self::oid(b)?) {
            Ok(base) => Ok(Some(base.into())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::GitOperationFailed(e)),
        }
    }

    fn commit(&self, id: &ObjectId) -> Result<Commit, GitError> {
        let commit = self.repo.find_commit(Self::oid(id)?)?;
        Ok(Self::to_commit(&commit))
    }

    fn commit_detail(&self, id: &ObjectId) -> Result<CommitDetail, GitError> {
        let commit = self.repo.find_commit(Self::oid(id)?)?;
        let author = commit.author();
        Ok(CommitDetail {
            commit: Self::to_commit(&commit),
            author: to_person(&author),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        })
    }

    fn diff_stat(&self, from: Option<&ObjectId>, to: &ObjectId) -> Result<String, GitError> {
        let diff = self.diff(from, to)?;
        let format = DiffStatsFormat::FULL | DiffStatsFormat::INCLUDE_SUMMARY;
        let buf = diff.stats()?.to_buf(format, DIFFSTAT_WIDTH)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn diff_patch(&self, from: Option<&ObjectId>, to: &ObjectId) -> Result<String, GitError> {
        let diff = self.diff(from, to)?;
        let mut patch = String::new();

        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            // File and hunk headers carry their own text; body lines need the origin marker
            if let origin @ ('+' | '-' | ' ') = line.origin() {
                patch.push(origin);
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        debug!(patch_len = patch.len(), "Rendered patch");

        Ok(patch)
    }

    fn peel_to_commit(&self, id: &ObjectId) -> Result<Option<ObjectId>, GitError> {
        let mut object = self.repo.find_object(Self::oid(id)?, None)?;
        loop {
            match object.kind() {
                Some(ObjectType::Commit) => return Ok(Some(object.id().into())),
                Some(ObjectType::Tag) => {
                    let target = match object.as_tag() {
                        Some(tag) => tag.target()?,
                        None => return Ok(None),
                    };
                    object = target;
                }
                _ => return Ok(None),
            }
        }
    }

    fn tag_info(&self, id: &ObjectId) -> Result<Option<TagInfo>, GitError> {
        let object = self.repo.find_object(Self::oid(id)?, None)?;
        let Ok(tag) = object.into_tag() else {
            return Ok(None);
        };
        let tagger = tag.tagger();
        Ok(Some(TagInfo {
            name: tag.name().unwrap_or("").to_string(),
            tagger: tagger.as_ref().map(to_person),
            message: tag.message().unwrap_or("").to_string(),
            target: tag.target_id().into(),
        }))
    }
}

fn to_person(signature: &Signature<'_>) -> Person {
    let when = signature.when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    let time = offset
        .timestamp_opt(when.seconds(), 0)
        .single()
        .unwrap_or_else(|| Utc::now().with_timezone(&offset));

    Person {
        name: signature.name().unwrap_or("Unknown").to_string(),
        email: signature.email().unwrap_or("").to_string(),
        time,
    }
}

/// `/srv/git/project.git` and `/home/me/project/.git` both name `project`
pub fn repo_name_from_path(git_dir: &Path) -> String {
    let dir = match git_dir.file_name() {
        Some(name) if name == ".git" => git_dir.parent().and_then(Path::file_name),
        other => other,
    };

    let name = dir.map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let name = name.strip_suffix(".git").unwrap_or(&name);
    if name.is_empty() {
        "repository".to_string()
    } else {
        name.to_string()
    }
}
