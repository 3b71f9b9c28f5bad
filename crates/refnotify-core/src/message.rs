pub const HEADER_REPOSITORY: &str = "X-Git-Repository";
pub const HEADER_REFNAME: &str = "X-Git-Refname";
pub const HEADER_REFTYPE: &str = "X-Git-Reftype";
pub const HEADER_OLDREV: &str = "X-Git-Oldrev";
pub const HEADER_NEWREV: &str = "X-Git-Newrev";

/// A rendered notification, ready for a delivery sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    /// Custom headers in insertion order
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Set when diffs were dropped because the body was too large
    pub truncated: bool,
}

impl NotificationMessage {
    pub fn new(subject: String, body: String) -> Self {
        Self {
            subject,
            headers: Vec::new(),
            body,
            truncated: false,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let message = NotificationMessage::new("subject".into(), "body".into())
            .with_header(HEADER_REPOSITORY, "project");
        assert_eq!(message.header("x-git-repository"), Some("project"));
        assert_eq!(message.header(HEADER_NEWREV), None);
    }
}
