pub const DEFAULT_SUBJECT_PREFIX: &str = "GIT";
pub const DEFAULT_MAX_DIFF_SIZE: usize = 10_000;
pub const DEFAULT_RECENT_COMMITS: usize = 20;

/// Settings for rendering notifications
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Repository name shown in subjects and headers
    pub repo_name: String,
    /// Subject prefix, shown in brackets; empty disables it
    pub subject_prefix: String,
    /// Body size above which diffs are replaced by a commit list (None = unlimited)
    pub max_diff_size: Option<usize>,
    /// How many commits "most recent commits" listings show
    pub recent_commits: usize,
    /// Base URL of a gitweb instance, used for per-commit links
    pub gitweb_url: Option<String>,
    /// Branches that never produce notifications
    pub exclude_branches: Vec<String>,
}

impl NotifierConfig {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            max_diff_size: Some(DEFAULT_MAX_DIFF_SIZE),
            recent_commits: DEFAULT_RECENT_COMMITS,
            gitweb_url: None,
            exclude_branches: Vec::new(),
        }
    }

    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }

    /// 0 disables truncation
    pub fn with_max_diff_size(mut self, size: usize) -> Self {
        self.max_diff_size = (size > 0).then_some(size);
        self
    }

    pub fn with_recent_commits(mut self, count: usize) -> Self {
        self.recent_commits = count;
        self
    }

    pub fn with_gitweb_url(mut self, url: impl Into<String>) -> Self {
        self.gitweb_url = Some(url.into());
        self
    }

    pub fn with_excluded_branch(mut self, branch: impl Into<String>) -> Self {
        self.exclude_branches.push(branch.into());
        self
    }

    pub fn is_excluded(&self, branch: &str) -> bool {
        self.exclude_branches.iter().any(|b| b == branch)
    }

    /// Link to a single commit in gitweb
    pub fn commit_url(&self, id: &str) -> Option<String> {
        self.gitweb_url
            .as_deref()
            .map(|base| format!("{}/?a=commit;h={}", base.trim_end_matches('/'), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NotifierConfig::new("project");
        assert_eq!(config.subject_prefix, "GIT");
        assert_eq!(config.max_diff_size, Some(10_000));
        assert_eq!(config.recent_commits, 20);
        assert!(config.commit_url("abc").is_none());
    }

    #[test]
    fn test_zero_max_diff_size_is_unlimited() {
        let config = NotifierConfig::new("project").with_max_diff_size(0);
        assert_eq!(config.max_diff_size, None);
    }

    #[test]
    fn test_commit_url() {
        let config = NotifierConfig::new("project").with_gitweb_url("https://git.example.com/p/project.git/");
        assert_eq!(
            config.commit_url("abc123").as_deref(),
            Some("https://git.example.com/p/project.git/?a=commit;h=abc123")
        );
    }

    #[test]
    fn test_excluded_branches() {
        let config = NotifierConfig::new("project").with_excluded_branch("wip");
        assert!(config.is_excluded("wip"));
        assert!(!config.is_excluded("main"));
    }
}
