use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserProfile};
use crate::users::UserRepository;

/// In-memory repository keyed by `clerk_id`, used by the test suite.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
    fail_writes: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent mutation return an error.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("simulated write failure");
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_clerk_id(&self, clerk_id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(clerk_id).cloned())
    }

    async fn create_if_absent(&self, user: &NewUser) -> anyhow::Result<Option<Uuid>> {
        self.check_writable()?;
        let mut users = self.users.write().await;
        if users.contains_key(&user.clerk_id) {
            return Ok(None);
        }
        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            clerk_id: user.clerk_id.clone(),
            email: user.profile.email.clone(),
            name: user.profile.name.clone(),
            image: user.profile.image.clone(),
            created_at: now,
            updated_at: now,
        };
        let id = row.id;
        users.insert(user.clerk_id.clone(), row);
        Ok(Some(id))
    }

    async fn update_if_present(
        &self,
        clerk_id: &str,
        profile: &UserProfile,
    ) -> anyhow::Result<Option<Uuid>> {
        self.check_writable()?;
        let mut users = self.users.write().await;
        let Some(row) = users.get_mut(clerk_id) else {
            return Ok(None);
        };
        row.email = profile.email.clone();
        row.name = profile.name.clone();
        row.image = profile.image.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.id))
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(clerk_id: &str, email: &str) -> NewUser {
        NewUser {
            clerk_id: clerk_id.to_string(),
            profile: UserProfile {
                email: email.to_string(),
                name: "Ada Lovelace".to_string(),
                image: None,
            },
        }
    }

    #[tokio::test]
    async fn test_create_if_absent_skips_existing() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create_if_absent(&new_user("u_1", "a@x.com")).await.unwrap();
        let second = repo.create_if_absent(&new_user("u_1", "b@x.com")).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(repo.len().await, 1);
        let stored = repo.find_by_clerk_id("u_1").await.unwrap().unwrap();
        assert_eq!(stored.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_update_if_present_without_row_is_noop() {
        let repo = InMemoryUserRepository::new();
        let profile = new_user("u_1", "a@x.com").profile;
        assert!(repo.update_if_present("u_1", &profile).await.unwrap().is_none());
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn test_failing_repository_rejects_writes() {
        let repo = InMemoryUserRepository::new();
        repo.fail_writes();
        assert!(repo.create_if_absent(&new_user("u_1", "a@x.com")).await.is_err());
    }
}
