use std::fmt::Write;

use refnotify_git::{Commit, RepoQuery, TagInfo};
use tracing::{debug, info};

use crate::classify::{BranchChange, Classification, TagAction, TagChange};
use crate::{NotifierConfig, NotifyError, RefKind, RefUpdate};

const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y %z";

/// Body text plus whether the size limit forced the short form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub text: String,
    pub truncated: bool,
}

/// Render the notification body for a classified update.
///
/// The full body goes to a scratch buffer first. When it exceeds the
/// configured maximum, everything after the header section is replaced by a
/// notice and the commit list.
pub fn render_body(
    repo: &dyn RepoQuery,
    config: &NotifierConfig,
    update: &RefUpdate,
    classification: &Classification,
) -> Result<RenderedBody, NotifyError> {
    let header = header_section(config, update)?;

    let mut scratch = header.clone();
    render_content(repo, config, update, classification, &mut scratch)?;

    match config.max_diff_size {
        Some(limit) if scratch.len() > limit => {
            info!(
                refname = %update.refname,
                size = scratch.len(),
                limit,
                "Body too large, falling back to commit list"
            );
            let mut text = header;
            writeln!(
                text,
                "Diff is too large ({} bytes, limit {}); only the commit list is shown.",
                scratch.len(),
                limit
            )?;
            writeln!(text)?;
            render_commit_list(classification, &mut text)?;
            Ok(RenderedBody {
                text,
                truncated: true,
            })
        }
        _ => {
            debug!(refname = %update.refname, size = scratch.len(), "Rendered body");
            Ok(RenderedBody {
                text: scratch,
                truncated: false,
            })
        }
    }
}

fn header_section(config: &NotifierConfig, update: &RefUpdate) -> Result<String, NotifyError> {
    let mut out = String::new();
    let label = match update.kind {
        RefKind::Branch => "Branch:",
        RefKind::Tag => "Tag:",
    };
    writeln!(out, "{:<12}{}", "Repository:", config.repo_name)?;
    writeln!(out, "{:<12}{}", label, update.short_name())?;
    if !update.old.is_zero() {
        writeln!(out, "{:<12}{}", "Old:", update.old)?;
    }
    if !update.new.is_zero() {
        writeln!(out, "{:<12}{}", "New:", update.new)?;
    }
    writeln!(out)?;
    Ok(out)
}

fn render_content(
    repo: &dyn RepoQuery,
    config: &NotifierConfig,
    update: &RefUpdate,
    classification: &Classification,
    out: &mut String,
) -> Result<(), NotifyError> {
    match classification {
        Classification::Branch(change) => match change {
            BranchChange::Created {
                copy_of: Some(source),
                ..
            } => {
                writeln!(out, "Branch created as a copy of '{source}'.")?;
            }
            BranchChange::Created {
                copy_of: None,
                recent,
            } => {
                writeln!(out, "Branch created.")?;
                writeln!(out)?;
                short_log(out, "Most recent commits:", recent)?;
            }
            BranchChange::Deleted { tip } => {
                writeln!(out, "Branch deleted. Previous tip was:")?;
                writeln!(out, "  {}", tip.short_line())?;
            }
            BranchChange::FastForward { commits } => {
                render_fast_forward(repo, config, update, commits, out)?;
            }
            BranchChange::Rewound {
                target,
                discarded,
                recent,
            } => {
                writeln!(out, "Branch rewound to {}.", target.short_line())?;
                writeln!(out)?;
                if !discarded.is_empty() {
                    short_log(out, "Discarded commits:", discarded)?;
                    writeln!(out)?;
                }
                short_log(out, "Most recent commits:", recent)?;
            }
            BranchChange::Rebased { base, commits } => {
                writeln!(out, "Branch rebased.")?;
                match base {
                    Some(base) => writeln!(out, "Common ancestor: {}", base.short_line())?,
                    None => writeln!(out, "No common ancestor with the previous tip.")?,
                }
                writeln!(out)?;
                short_log(out, "New commits:", commits)?;
            }
        },
        Classification::Tag(change) => render_tag(update, change, out)?,
    }
    Ok(())
}

fn render_fast_forward(
    repo: &dyn RepoQuery,
    config: &NotifierConfig,
    update: &RefUpdate,
    commits: &[Commit],
    out: &mut String,
) -> Result<(), NotifyError> {
    short_log(out, &count_heading(commits.len()), commits)?;

    if commits.len() > 1 {
        writeln!(out)?;
        writeln!(out, "Overall diffstat:")?;
        writeln!(out)?;
        out.push_str(&repo.diff_stat(Some(&update.old), &update.new)?);
    }

    for commit in commits {
        writeln!(out)?;
        render_commit(repo, config, commit, out)?;
    }
    Ok(())
}

fn render_commit(
    repo: &dyn RepoQuery,
    config: &NotifierConfig,
    commit: &Commit,
    out: &mut String,
) -> Result<(), NotifyError> {
    let detail = repo.commit_detail(&commit.id)?;

    writeln!(out, "commit {}", commit.id)?;
    if commit.is_merge() {
        let parents: Vec<&str> = commit.parents.iter().map(|p| p.short()).collect();
        writeln!(out, "Merge:  {}", parents.join(" "))?;
    }
    writeln!(out, "Author: {}", detail.author)?;
    writeln!(out, "Date:   {}", detail.author.time.format(DATE_FORMAT))?;
    if let Some(url) = config.commit_url(commit.id.as_str()) {
        writeln!(out, "URL:    {url}")?;
    }
    writeln!(out)?;
    indented(out, &detail.message)?;

    // Merges are listed without a diff
    if !commit.is_merge() {
        let parent = commit.first_parent();
        writeln!(out)?;
        writeln!(out, "---")?;
        out.push_str(&repo.diff_stat(parent, &commit.id)?);
        writeln!(out)?;
        out.push_str(&repo.diff_patch(parent, &commit.id)?);
    }
    Ok(())
}

fn render_tag(update: &RefUpdate, change: &TagChange, out: &mut String) -> Result<(), NotifyError> {
    let action = match change.action {
        TagAction::Created => "Tag created.",
        TagAction::Changed => "Tag changed.",
        TagAction::Deleted => "Tag deleted.",
    };
    writeln!(out, "{action}")?;
    writeln!(out)?;

    match &change.target {
        Some(target) => writeln!(out, "Tagged commit:   {}", target.short_line())?,
        None => {
            let tip = match change.action {
                TagAction::Deleted => &update.old,
                _ => &update.new,
            };
            writeln!(out, "Tagged object:   {tip}")?;
        }
    }
    if let Some(previous) = &change.previous {
        writeln!(out, "Previous commit: {}", previous.short_line())?;
    }
    if let Some(branch) = &change.branch {
        writeln!(out, "On branch:       {branch}")?;
    }

    if let Some(annotation) = &change.annotation {
        writeln!(out)?;
        render_annotation(annotation, out)?;
    }
    Ok(())
}

fn render_annotation(tag: &TagInfo, out: &mut String) -> Result<(), NotifyError> {
    if let Some(tagger) = &tag.tagger {
        writeln!(out, "Tagger: {tagger}")?;
        writeln!(out, "Date:   {}", tagger.time.format(DATE_FORMAT))?;
        writeln!(out)?;
    }
    indented(out, &tag.message)
}

/// The short form used when the full body is too large
fn render_commit_list(classification: &Classification, out: &mut String) -> Result<(), NotifyError> {
    let commits: Vec<Commit> = classification.listed_commits().into_iter().cloned().collect();
    let heading = match classification {
        Classification::Branch(BranchChange::FastForward { commits }) => {
            count_heading(commits.len())
        }
        Classification::Branch(BranchChange::Rebased { .. }) => "New commits:".to_string(),
        Classification::Branch(BranchChange::Deleted { .. }) => "Previous tip:".to_string(),
        Classification::Tag(_) => "Tagged commit:".to_string(),
        _ => "Most recent commits:".to_string(),
    };
    short_log(out, &heading, &commits)
}

fn count_heading(count: usize) -> String {
    if count == 1 {
        "1 new commit:".to_string()
    } else {
        format!("{count} new commits:")
    }
}

fn short_log(out: &mut String, heading: &str, commits: &[Commit]) -> Result<(), NotifyError> {
    writeln!(out, "{heading}")?;
    for commit in commits {
        writeln!(out, "  {}", commit.short_line())?;
    }
    Ok(())
}

fn indented(out: &mut String, text: &str) -> Result<(), NotifyError> {
    for line in text.trim_end().lines() {
        if line.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "    {line}")?;
        }
    }
    Ok(())
}
