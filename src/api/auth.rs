//! Session persistence in the OS keychain.
//!
//! The CLI saves the token returned by login so later commands can send it
//! as bearer auth. A `SessionStore` owns one keychain entry per account and
//! doubles as the client's `TokenProvider`.

use keyring::Entry;
use thiserror::Error;

use super::token::TokenProvider;

/// Keychain service name for stored sessions.
const SERVICE_NAME: &str = "story-report-client";

/// Account used when the caller does not name one.
pub const DEFAULT_ACCOUNT: &str = "default";

#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("Keychain operation failed: {0}")]
    OperationFailed(String),

    #[error("Refusing to store an empty session token")]
    EmptyToken,
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        KeychainError::OperationFailed(err.to_string())
    }
}

/// Stored login session for one account.
pub struct SessionStore {
    account: String,
    entry: Entry,
}

impl SessionStore {
    pub fn open(account: impl Into<String>) -> Result<Self, KeychainError> {
        let account = account.into();
        let entry = Entry::new(SERVICE_NAME, &account)?;
        Ok(Self { account, entry })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Save the session token, replacing any previous one.
    pub fn save(&self, token: &str) -> Result<(), KeychainError> {
        if token.trim().is_empty() {
            return Err(KeychainError::EmptyToken);
        }
        self.entry.set_password(token)?;
        log::debug!("Saved session for account {}", self.account);
        Ok(())
    }

    /// The saved token, or `None` after logout or before the first login.
    /// A blank stored value counts as no session.
    pub fn load(&self) -> Result<Option<String>, KeychainError> {
        match self.entry.get_password() {
            Ok(token) if token.trim().is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Forget the session. Clearing an absent session succeeds.
    pub fn clear(&self) -> Result<(), KeychainError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keychain failures read as "not logged in"; the server then rejects the
/// empty bearer.
impl TokenProvider for SessionStore {
    fn access_token(&self) -> Option<String> {
        self.load().unwrap_or_else(|e| {
            log::warn!("Failed to read session for {}: {}", self.account, e);
            None
        })
    }
}
