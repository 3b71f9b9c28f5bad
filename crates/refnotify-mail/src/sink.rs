use std::io::{self, Write};

use refnotify_core::NotificationMessage;

use crate::MailError;

/// Where rendered notifications go
pub trait Sink {
    fn deliver(&mut self, message: &NotificationMessage) -> Result<(), MailError>;
}

/// Prints each notification as `Subject:` plus custom headers, a blank line and the body
pub struct StdoutSink<W: Write> {
    writer: W,
    delivered: usize,
}

impl StdoutSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            delivered: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for StdoutSink<W> {
    fn deliver(&mut self, message: &NotificationMessage) -> Result<(), MailError> {
        if self.delivered > 0 {
            writeln!(self.writer)?;
        }
        writeln!(self.writer, "Subject: {}", message.subject)?;
        for (name, value) in &message.headers {
            writeln!(self.writer, "{name}: {value}")?;
        }
        writeln!(self.writer)?;
        self.writer.write_all(message.body.as_bytes())?;
        self.writer.flush()?;

        self.delivered += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: &str) -> NotificationMessage {
        NotificationMessage::new(subject.to_string(), "Repository: project\n".to_string())
            .with_header("X-Git-Refname", "main")
    }

    #[test]
    fn test_prints_headers_then_body() {
        let mut sink = StdoutSink::new(Vec::new());
        sink.deliver(&message("[GIT] project main: Fix crash")).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "Subject: [GIT] project main: Fix crash\nX-Git-Refname: main\n\nRepository: project\n"
        );
    }

    #[test]
    fn test_messages_separated_by_blank_line() {
        let mut sink = StdoutSink::new(Vec::new());
        sink.deliver(&message("first")).unwrap();
        sink.deliver(&message("second")).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("Repository: project\n\nSubject: second\n"));
    }
}
