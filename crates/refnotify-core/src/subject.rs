use refnotify_git::{Commit, ObjectId};

use crate::classify::{BranchChange, Classification, TagAction, TagChange};

/// Matches `Merge [remote-tracking ]branch '<name>'[ of <url>][ into <target>]`.
///
/// Returns the `into` target (`None` when git left it out), or `None` when
/// the subject has any other shape.
fn merge_target(subject: &str) -> Option<Option<&str>> {
    let rest = subject
        .strip_prefix("Merge branch '")
        .or_else(|| subject.strip_prefix("Merge remote-tracking branch '"))?;
    let (branch, mut rest) = rest.split_once('\'')?;
    if branch.is_empty() {
        return None;
    }

    if let Some(remote) = rest.strip_prefix(" of ") {
        let end = remote.find(' ').unwrap_or(remote.len());
        if end == 0 {
            return None;
        }
        rest = &remote[end..];
    }

    let mut into = None;
    if let Some(target) = rest.strip_prefix(" into ") {
        if target.is_empty() || target.contains(char::is_whitespace) {
            return None;
        }
        into = Some(target);
        rest = "";
    }

    rest.is_empty().then_some(into)
}

/// Whether `subject` is git's default message for a merge into `branch`
pub fn is_merge_into(subject: &str, branch: &str) -> bool {
    merge_target(subject).is_some_and(|into| into.map_or(true, |target| target == branch))
}

/// Subject text for a fast-forward of `branch` from `old` over `commits` (oldest first).
///
/// A plain merge on top of the old tip keeps its own subject; otherwise the
/// first non-merge commit names the push, falling back to the first merge.
pub fn fast_forward_summary(commits: &[Commit], old: &ObjectId, branch: &str) -> String {
    if let Some(newest) = commits.last() {
        if newest.is_merge()
            && newest.first_parent() == Some(old)
            && is_merge_into(&newest.subject, branch)
        {
            return newest.subject.clone();
        }
    }

    commits
        .iter()
        .find(|c| !c.is_merge())
        .or(commits.first())
        .map(|c| c.subject.clone())
        .unwrap_or_default()
}

/// The part of the subject after `<repo> <ref>: `
pub fn summary_text(classification: &Classification, old: &ObjectId, short_name: &str) -> String {
    match classification {
        Classification::Branch(change) => match change {
            BranchChange::Created {
                copy_of: Some(source),
                ..
            } => format!("branch created (copy of {source})"),
            BranchChange::Created { copy_of: None, .. } => "branch created".to_string(),
            BranchChange::Deleted { .. } => "branch deleted".to_string(),
            BranchChange::FastForward { commits } => {
                fast_forward_summary(commits, old, short_name)
            }
            BranchChange::Rewound { target, .. } => {
                format!("branch rewound to {}", target.id.short())
            }
            BranchChange::Rebased { .. } => "branch rebased".to_string(),
        },
        Classification::Tag(change) => tag_text(change),
    }
}

fn tag_text(change: &TagChange) -> String {
    let action = match change.action {
        TagAction::Created => "tag created",
        TagAction::Changed => "tag changed",
        TagAction::Deleted => "tag deleted",
    };
    match &change.branch {
        Some(branch) => format!("{action} on branch {branch}"),
        None => action.to_string(),
    }
}

/// `[GIT] repo main: text`, or `repo main: text` with an empty prefix
pub fn format_subject(prefix: &str, repo: &str, short_name: &str, text: &str) -> String {
    if prefix.is_empty() {
        format!("{repo} {short_name}: {text}")
    } else {
        format!("[{prefix}] {repo} {short_name}: {text}")
    }
}
