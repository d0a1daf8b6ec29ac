//! Access token holder

use parking_lot::RwLock;
use secrecy::{ExposeSecret, Secret};
use tmii_ports::TokenProvider;

/// Shared access token
///
/// Written by the refresher, read on every outbound request.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<Secret<String>>>,
}

impl TokenStore {
    pub fn new(initial: Option<Secret<String>>) -> Self {
        Self {
            token: RwLock::new(initial),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write() = Some(Secret::new(token.into()));
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }
}

impl TokenProvider for TokenStore {
    fn access_token(&self) -> Option<String> {
        self.token
            .read()
            .as_ref()
            .map(|token| token.expose_secret().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let store = TokenStore::default();
        assert_eq!(store.access_token(), None);

        store.set("abc");
        assert_eq!(store.access_token().as_deref(), Some("abc"));
        assert!(!format!("{:?}", store).contains("abc"));

        store.clear();
        assert!(!store.has_token());
    }
}
