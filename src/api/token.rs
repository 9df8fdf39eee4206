//! Access token accessor consumed by the client.
//!
//! The client only reads tokens. Where they come from (keychain, env,
//! a login flow) is up to the caller.

/// Supplies the current access token, or `None` when unauthenticated.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Fixed token, or no token at all.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn access_token(&self) -> Option<String> {
        self()
    }
}
