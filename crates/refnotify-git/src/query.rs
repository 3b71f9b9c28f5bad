use crate::{BranchHead, Commit, CommitDetail, GitError, ObjectId, TagInfo};

/// Read-only queries the notifier needs from a repository.
///
/// Commit lists are returned newest first. The zero id passed as `exclude`
/// excludes nothing.
pub trait RepoQuery {
    /// Tips of all local branches
    fn branch_heads(&self) -> Result<Vec<BranchHead>, GitError>;

    /// Up to `limit` commits reachable from `tip`
    fn recent_commits(&self, tip: &ObjectId, limit: usize) -> Result<Vec<Commit>, GitError>;

    /// Commits reachable from `include` but not from `exclude`
    fn commits_between(
        &self,
        exclude: &ObjectId,
        include: &ObjectId,
    ) -> Result<Vec<Commit>, GitError>;

    /// Nearest common ancestor, `None` for unrelated histories
    fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> Result<Option<ObjectId>, GitError>;

    fn commit(&self, id: &ObjectId) -> Result<Commit, GitError>;

    fn commit_detail(&self, id: &ObjectId) -> Result<CommitDetail, GitError>;

    /// Diffstat between the trees of `from` (empty tree when `None`) and `to`
    fn diff_stat(&self, from: Option<&ObjectId>, to: &ObjectId) -> Result<String, GitError>;

    /// Unified patch between the trees of `from` (empty tree when `None`) and `to`
    fn diff_patch(&self, from: Option<&ObjectId>, to: &ObjectId) -> Result<String, GitError>;

    /// Commit an object peels to, `None` when it is not a commit-ish
    fn peel_to_commit(&self, id: &ObjectId) -> Result<Option<ObjectId>, GitError>;

    /// Annotated tag details, `None` for anything that is not a tag object
    fn tag_info(&self, id: &ObjectId) -> Result<Option<TagInfo>, GitError>;
}
