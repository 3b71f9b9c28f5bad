use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use refnotify_core::NotificationMessage;

use crate::{MailError, Sink};

pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

/// Longest payload per RFC 2047 encoded word, keeping each word under 75 characters
const ENCODED_WORD_BYTES: usize = 45;

/// Hands notifications to the local MTA
#[derive(Debug, Clone)]
pub struct SendmailSink {
    program: PathBuf,
    from: Option<String>,
    recipients: Vec<String>,
}

impl SendmailSink {
    pub fn new(recipients: Vec<String>) -> Result<Self, MailError> {
        if recipients.is_empty() {
            return Err(MailError::NoRecipients);
        }
        Ok(Self {
            program: PathBuf::from(DEFAULT_SENDMAIL),
            from: None,
            recipients,
        })
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full message text as written to sendmail
    pub fn format_email(&self, message: &NotificationMessage) -> String {
        let mut lines = Vec::new();
        if let Some(from) = &self.from {
            lines.push(format!("From: {from}"));
        }
        lines.push(format!("To: {}", self.recipients.join(", ")));
        lines.push(format!("Subject: {}", encode_header(&message.subject)));
        lines.push("MIME-Version: 1.0".to_string());
        lines.push("Content-Type: text/plain; charset=UTF-8".to_string());
        lines.push("Content-Transfer-Encoding: 8bit".to_string());
        for (name, value) in &message.headers {
            lines.push(format!("{name}: {}", encode_header(value)));
        }

        let mut email = lines.join("\n");
        email.push_str("\n\n");
        email.push_str(&message.body);
        email
    }
}

impl Sink for SendmailSink {
    fn deliver(&mut self, message: &NotificationMessage) -> Result<(), MailError> {
        let email = self.format_email(message);

        debug!(
            program = %self.program.display(),
            recipients = ?self.recipients,
            size = email.len(),
            "Spawning sendmail"
        );

        let mut child = Command::new(&self.program)
            .args(["-oi", "-t"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| MailError::SpawnFailed {
                program: self.program.display().to_string(),
                source,
            })?;

        let mut write_error = None;
        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                io::Error::new(io::ErrorKind::BrokenPipe, "sendmail stdin not captured")
            })?;
            if let Err(e) = stdin.write_all(email.as_bytes()) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
                // sendmail quit without reading; its exit status decides
                write_error = Some(e);
            }
        }

        let status = child.wait()?;
        debug!(exit_code = status.code().unwrap_or(-1), "sendmail completed");

        if !status.success() {
            return Err(MailError::SendmailFailed(status.code().unwrap_or(-1)));
        }
        match write_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// RFC 2047 encode a header value when it is not plain ASCII
pub fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in value.chars() {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_BYTES {
            words.push(format!("=?UTF-8?B?{}?=", STANDARD.encode(&chunk)));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(format!("=?UTF-8?B?{}?=", STANDARD.encode(&chunk)));
    }
    words.join("\n ")
}
