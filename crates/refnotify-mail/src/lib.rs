//! # refnotify-mail
//!
//! Delivery sinks for rendered notifications.
//!
//! - [`StdoutSink`] - Print subject, custom headers and body
//! - [`SendmailSink`] - Pipe an RFC 5322 message into `sendmail -oi -t`

mod error;
mod sendmail;
mod sink;

pub use error::MailError;
pub use sendmail::{encode_header, SendmailSink, DEFAULT_SENDMAIL};
pub use sink::{Sink, StdoutSink};
