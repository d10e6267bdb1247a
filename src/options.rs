//! Connection and session options.

use secrecy::{ExposeSecret, SecretString};

use crate::protocol::Session;

/// Client name sent when none is configured.
pub const DEFAULT_CLIENT_NAME: &str = "confd-client";

/// Per-connection session settings.
///
/// `sid` is managed by the connection: it is filled in by a successful
/// session-establishing request and survives closing the transport. Only
/// [`Options::clear_sid`] resets it.
#[derive(Debug)]
pub struct Options {
    /// Logical client identifier sent with each request.
    pub name: String,
    /// Auth principal. Empty means anonymous.
    pub username: String,
    /// Credential for `username`. Never logged.
    pub password: Option<SecretString>,
    /// Session identifier from the most recent `get_SID` exchange.
    pub sid: Option<String>,
}

impl Options {
    /// Create anonymous options with the default client name.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_CLIENT_NAME.to_string(),
            username: String::new(),
            password: None,
            sid: None,
        }
    }

    /// Check if no username is configured.
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty()
    }

    /// Check if a session identifier is cached.
    pub fn has_session(&self) -> bool {
        self.sid.is_some()
    }

    /// Set the credential.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(SecretString::from(password.into()));
    }

    /// Forget the cached session identifier.
    ///
    /// The next request authenticates with username and credential again.
    pub fn clear_sid(&mut self) {
        self.sid = None;
    }

    /// Session block for the next request.
    ///
    /// With a cached SID only the name and SID are sent.
    pub(crate) fn session(&self) -> Session<'_> {
        if let Some(sid) = self.sid.as_deref() {
            return Session {
                name: &self.name,
                username: None,
                password: None,
                sid: Some(sid),
            };
        }

        Session {
            name: &self.name,
            username: (!self.username.is_empty()).then_some(self.username.as_str()),
            password: self.password.as_ref().map(|p| p.expose_secret()),
            sid: None,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
