//! Caller identity value object

use std::fmt;

/// Opaque identity of the user owning a topic set, as issued by the
/// authentication collaborator. The bearer token, when present, is only
/// handed to persistence adapters that need it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    subject: String,
    token: Option<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

// Keep tokens out of logs
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &self.subject)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_token() {
        let id = Identity::new("ada@example.com").with_token("secret-token");
        let debug = format!("{:?}", id);
        assert!(debug.contains("ada@example.com"));
        assert!(!debug.contains("secret-token"));
        assert_eq!(id.token(), Some("secret-token"));
    }

    #[test]
    fn display_is_subject() {
        assert_eq!(Identity::new("local").to_string(), "local");
    }
}
