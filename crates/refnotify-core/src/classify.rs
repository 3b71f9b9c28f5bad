use refnotify_git::{Commit, GitError, ObjectId, RepoQuery, TagInfo};
use tracing::debug;

use crate::{RefKind, RefUpdate};

/// What happened to a branch
#[derive(Debug, Clone, PartialEq)]
pub enum BranchChange {
    /// New branch; either a copy of an existing branch or a fresh line of history
    Created {
        copy_of: Option<String>,
        /// Newest first, empty for copies
        recent: Vec<Commit>,
    },
    /// Branch removed; `tip` is where it pointed
    Deleted { tip: Commit },
    /// New tip descends from the old one
    FastForward {
        /// Commits in (old, new], oldest first
        commits: Vec<Commit>,
    },
    /// New tip is an ancestor of the old one
    Rewound {
        target: Commit,
        /// Commits no longer on the branch, newest first
        discarded: Vec<Commit>,
        /// Newest first
        recent: Vec<Commit>,
    },
    /// Histories diverged
    Rebased {
        base: Option<Commit>,
        /// Commits in new but not old, newest first
        commits: Vec<Commit>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    Created,
    Changed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagChange {
    pub action: TagAction,
    /// Commit the tag points to (the old target for deletions), if it peels to one
    pub target: Option<Commit>,
    /// Commit the tag pointed to before a change
    pub previous: Option<Commit>,
    /// Branch whose head is the tagged commit
    pub branch: Option<String>,
    /// Tag object details for annotated tags
    pub annotation: Option<TagInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Branch(BranchChange),
    Tag(TagChange),
}

impl Classification {
    /// Commits a commit-list-only summary shows, in display order
    pub fn listed_commits(&self) -> Vec<&Commit> {
        match self {
            Classification::Branch(change) => match change {
                BranchChange::Created { recent, .. } => recent.iter().collect(),
                BranchChange::Deleted { tip } => vec![tip],
                BranchChange::FastForward { commits } => commits.iter().collect(),
                BranchChange::Rewound { recent, .. } => recent.iter().collect(),
                BranchChange::Rebased { commits, .. } => commits.iter().collect(),
            },
            Classification::Tag(change) => change.target.iter().collect(),
        }
    }
}

/// Classify a non-trivial ref update by querying the repository
pub fn classify(
    repo: &dyn RepoQuery,
    update: &RefUpdate,
    recent_limit: usize,
) -> Result<Classification, GitError> {
    let classification = match update.kind {
        RefKind::Branch => Classification::Branch(classify_branch(repo, update, recent_limit)?),
        RefKind::Tag => Classification::Tag(classify_tag(repo, update)?),
    };
    Ok(classification)
}

fn classify_branch(
    repo: &dyn RepoQuery,
    update: &RefUpdate,
    recent_limit: usize,
) -> Result<BranchChange, GitError> {
    let (old, new) = (&update.old, &update.new);

    if update.is_create() {
        let copy_of = branch_at(repo, new, Some(update.short_name()))?;
        let recent = match copy_of {
            Some(_) => Vec::new(),
            None => repo.recent_commits(new, recent_limit)?,
        };
        debug!(branch = update.short_name(), copy_of = ?copy_of, "Branch created");
        return Ok(BranchChange::Created { copy_of, recent });
    }

    if update.is_delete() {
        debug!(branch = update.short_name(), "Branch deleted");
        return Ok(BranchChange::Deleted {
            tip: repo.commit(old)?,
        });
    }

    let base = repo.merge_base(old, new)?;
    debug!(
        branch = update.short_name(),
        base = ?base.as_ref().map(ObjectId::short),
        "Computed merge base"
    );

    let change = match base {
        Some(base) if &base == old => {
            let mut commits = repo.commits_between(old, new)?;
            commits.reverse();
            BranchChange::FastForward { commits }
        }
        Some(base) if &base == new => BranchChange::Rewound {
            target: repo.commit(new)?,
            discarded: repo.commits_between(new, old)?,
            recent: repo.recent_commits(new, recent_limit)?,
        },
        base => BranchChange::Rebased {
            base: base.map(|b| repo.commit(&b)).transpose()?,
            commits: repo.commits_between(old, new)?,
        },
    };
    Ok(change)
}

fn classify_tag(repo: &dyn RepoQuery, update: &RefUpdate) -> Result<TagChange, GitError> {
    let (action, tip) = if update.is_create() {
        (TagAction::Created, &update.new)
    } else if update.is_delete() {
        (TagAction::Deleted, &update.old)
    } else {
        (TagAction::Changed, &update.new)
    };

    let target = peeled_commit(repo, tip)?;
    let branch = match &target {
        Some(commit) => branch_at(repo, &commit.id, None)?,
        None => None,
    };
    let previous = match action {
        TagAction::Changed => peeled_commit(repo, &update.old)?,
        _ => None,
    };

    Ok(TagChange {
        action,
        target,
        previous,
        branch,
        annotation: repo.tag_info(tip)?,
    })
}

fn peeled_commit(repo: &dyn RepoQuery, id: &ObjectId) -> Result<Option<Commit>, GitError> {
    repo.peel_to_commit(id)?
        .map(|commit| repo.commit(&commit))
        .transpose()
}

/// First branch (by name) whose head is `id`, ignoring `skip`
fn branch_at(
    repo: &dyn RepoQuery,
    id: &ObjectId,
    skip: Option<&str>,
) -> Result<Option<String>, GitError> {
    let mut names: Vec<String> = repo
        .branch_heads()?
        .into_iter()
        .filter(|head| &head.id == id && Some(head.name.as_str()) != skip)
        .map(|head| head.name)
        .collect();
    names.sort();
    Ok(names.into_iter().next())
}
