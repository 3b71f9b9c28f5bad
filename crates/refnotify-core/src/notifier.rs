use refnotify_git::RepoQuery;
use tracing::{debug, info};

use crate::classify::classify;
use crate::message::{
    HEADER_NEWREV, HEADER_OLDREV, HEADER_REFNAME, HEADER_REFTYPE, HEADER_REPOSITORY,
};
use crate::render::render_body;
use crate::subject::{format_subject, summary_text};
use crate::{NotificationMessage, NotifierConfig, NotifyError, RefKind, RefUpdate};

/// Turns ref updates into notification messages
pub struct RefUpdateNotifier<'a> {
    repo: &'a dyn RepoQuery,
    config: &'a NotifierConfig,
}

impl<'a> RefUpdateNotifier<'a> {
    pub fn new(repo: &'a dyn RepoQuery, config: &'a NotifierConfig) -> Self {
        Self { repo, config }
    }

    /// Build the notification for one update.
    ///
    /// Returns `Ok(None)` for no-op updates and excluded branches.
    pub fn notify(&self, update: &RefUpdate) -> Result<Option<NotificationMessage>, NotifyError> {
        if update.is_noop() {
            debug!(refname = %update.refname, "Ref unchanged, nothing to report");
            return Ok(None);
        }
        if update.kind == RefKind::Branch && self.config.is_excluded(update.short_name()) {
            info!(refname = %update.refname, "Branch excluded from notifications");
            return Ok(None);
        }

        let classification = classify(self.repo, update, self.config.recent_commits)?;
        let text = summary_text(&classification, &update.old, update.short_name());
        let subject = format_subject(
            &self.config.subject_prefix,
            &self.config.repo_name,
            update.short_name(),
            &text,
        );
        let body = render_body(self.repo, self.config, update, &classification)?;

        info!(
            refname = %update.refname,
            subject = %subject,
            truncated = body.truncated,
            "Prepared notification"
        );

        let mut message = NotificationMessage::new(subject, body.text)
            .with_header(HEADER_REPOSITORY, self.config.repo_name.as_str())
            .with_header(HEADER_REFNAME, update.short_name())
            .with_header(HEADER_REFTYPE, update.kind.to_string())
            .with_header(HEADER_OLDREV, update.old.to_string())
            .with_header(HEADER_NEWREV, update.new.to_string());
        message.truncated = body.truncated;

        Ok(Some(message))
    }

    /// Process updates in order, stopping at the first failure
    pub fn notify_all(&self, updates: &[RefUpdate]) -> Result<Vec<NotificationMessage>, NotifyError> {
        let mut messages = Vec::new();
        for update in updates {
            if let Some(message) = self.notify(update)? {
                messages.push(message);
            }
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{oid, FakeRepo};
    use refnotify_git::ObjectId;

    fn update(old: ObjectId, new: ObjectId, refname: &str) -> RefUpdate {
        RefUpdate::new(old.as_str(), new.as_str(), refname)
            .unwrap()
            .unwrap()
    }

    fn repo() -> FakeRepo {
        let mut repo = FakeRepo::new();
        repo.add_commit(1, &[], "Initial import");
        repo.add_commit(2, &[1], "Add parser");
        repo.add_commit(3, &[2], "Fix parser crash");
        repo.branch("main", 3);
        repo
    }

    #[test]
    fn test_fast_forward_message() {
        let repo = repo();
        let config = NotifierConfig::new("project");
        let notifier = RefUpdateNotifier::new(&repo, &config);

        let message = notifier
            .notify(&update(oid(1), oid(3), "refs/heads/main"))
            .unwrap()
            .unwrap();

        assert_eq!(message.subject, "[GIT] project main: Add parser");
        assert_eq!(message.header(HEADER_REPOSITORY), Some("project"));
        assert_eq!(message.header(HEADER_REFNAME), Some("main"));
        assert_eq!(message.header(HEADER_REFTYPE), Some("branch"));
        assert_eq!(message.header(HEADER_OLDREV), Some(oid(1).as_str()));
        assert_eq!(message.header(HEADER_NEWREV), Some(oid(3).as_str()));
        assert!(!message.truncated);
    }

    #[test]
    fn test_noop_update_produces_nothing() {
        let repo = repo();
        let config = NotifierConfig::new("project");
        let notifier = RefUpdateNotifier::new(&repo, &config);

        assert!(notifier
            .notify(&update(oid(3), oid(3), "refs/heads/main"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_excluded_branch_produces_nothing() {
        let repo = repo();
        let config = NotifierConfig::new("project").with_excluded_branch("main");
        let notifier = RefUpdateNotifier::new(&repo, &config);

        assert!(notifier
            .notify(&update(oid(1), oid(3), "refs/heads/main"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_tag_on_branch_head_names_branch_in_subject() {
        let mut repo = repo();
        let tag = repo.annotated_tag(50, "v1.0", 3, "Release\n");
        let config = NotifierConfig::new("project").with_subject_prefix("");
        let notifier = RefUpdateNotifier::new(&repo, &config);

        let message = notifier
            .notify(&update(ObjectId::zero(), tag, "refs/tags/v1.0"))
            .unwrap()
            .unwrap();
        assert_eq!(message.subject, "project v1.0: tag created on branch main");
        assert_eq!(message.header(HEADER_REFTYPE), Some("tag"));
    }

    #[test]
    fn test_notify_all_skips_noops_and_keeps_order() {
        let mut repo = repo();
        repo.branch("copy", 3);
        let config = NotifierConfig::new("project");
        let notifier = RefUpdateNotifier::new(&repo, &config);

        let updates = vec![
            update(oid(1), oid(3), "refs/heads/main"),
            update(oid(2), oid(2), "refs/heads/stale"),
            update(ObjectId::zero(), oid(3), "refs/heads/copy"),
        ];
        let messages = notifier.notify_all(&updates).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].header(HEADER_REFNAME), Some("main"));
        assert_eq!(
            messages[1].subject,
            "[GIT] project copy: branch created (copy of main)"
        );
    }

    #[test]
    fn test_unknown_commit_is_fatal() {
        let repo = repo();
        let config = NotifierConfig::new("project");
        let notifier = RefUpdateNotifier::new(&repo, &config);

        let result = notifier.notify(&update(oid(3), oid(99), "refs/heads/main"));
        assert!(matches!(result, Err(NotifyError::GitError(_))));
    }
}
