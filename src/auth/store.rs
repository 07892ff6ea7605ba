use std::{collections::HashMap, sync::RwLock};

use anyhow::anyhow;
use async_trait::async_trait;

/// Where `username -> password` pairs live.
///
/// Passwords are stored and compared as plain text.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, username: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, username: &str, password: &str) -> anyhow::Result<()>;

    async fn exists(&self, username: &str) -> anyhow::Result<bool> {
        Ok(self.get(username).await?.is_some())
    }

    /// Stores the pair unless `username` is taken. Returns whether it was stored.
    ///
    /// The default is a check followed by a write; stores that can do both in
    /// one step should override it.
    async fn create(&self, username: &str, password: &str) -> anyhow::Result<bool> {
        if self.exists(username).await? {
            return Ok(false);
        }
        self.set(username, password).await?;
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, username: &str) -> anyhow::Result<Option<String>> {
        let users = self.users.read().map_err(|_| anyhow!("user store lock poisoned"))?;
        Ok(users.get(username).cloned())
    }

    async fn set(&self, username: &str, password: &str) -> anyhow::Result<()> {
        let mut users = self.users.write().map_err(|_| anyhow!("user store lock poisoned"))?;
        users.insert(username.to_owned(), password.to_owned());
        Ok(())
    }

    async fn create(&self, username: &str, password: &str) -> anyhow::Result<bool> {
        let mut users = self.users.write().map_err(|_| anyhow!("user store lock poisoned"))?;
        if users.contains_key(username) {
            return Ok(false);
        }
        users.insert(username.to_owned(), password.to_owned());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryUserStore::new();
        assert!(!store.exists("alice").await.unwrap());

        store.set("alice", "pw").await.unwrap();

        assert!(store.exists("alice").await.unwrap());
        assert_eq!(store.get("alice").await.unwrap().as_deref(), Some("pw"));
        assert_eq!(store.get("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_refuses_taken_names() {
        let store = MemoryUserStore::new();

        assert!(store.create("alice", "first").await.unwrap());
        assert!(!store.create("alice", "second").await.unwrap());
        assert_eq!(store.get("alice").await.unwrap().as_deref(), Some("first"));
    }

    /// Store relying on the provided `exists` and `create`.
    #[derive(Default)]
    struct Minimal(MemoryUserStore);

    #[async_trait]
    impl UserStore for Minimal {
        async fn get(&self, username: &str) -> anyhow::Result<Option<String>> {
            self.0.get(username).await
        }

        async fn set(&self, username: &str, password: &str) -> anyhow::Result<()> {
            self.0.set(username, password).await
        }
    }

    #[tokio::test]
    async fn default_create_checks_before_writing() {
        let store = Minimal::default();

        assert!(store.create("bob", "one").await.unwrap());
        assert!(!store.create("bob", "two").await.unwrap());
        assert_eq!(store.get("bob").await.unwrap().as_deref(), Some("one"));
    }
}
