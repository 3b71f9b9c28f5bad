use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to run {program}: {source}")]
    SpawnFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("sendmail exited with status {0}")]
    SendmailFailed(i32),

    #[error("No mail recipient configured")]
    NoRecipients,
}
