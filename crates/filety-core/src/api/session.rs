//! In-memory access token storage

use tokio::sync::RwLock;

/// Holds the current bearer token
///
/// Never persisted: a new process starts logged out and relies on the
/// refresh cookie to obtain a token again.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Store a token; blank tokens clear the store
    pub async fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = self.token.write().await;
        *guard = if token.trim().is_empty() { None } else { Some(token) };
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}
