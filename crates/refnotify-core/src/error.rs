use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Git error: {0}")]
    GitError(#[from] refnotify_git::GitError),

    #[error("Malformed ref update: {0}")]
    ParseError(String),

    #[error("Failed to render notification: {0}")]
    RenderError(#[from] std::fmt::Error),
}
