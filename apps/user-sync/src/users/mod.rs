//! User repository — the single table this service writes to.
//!
//! Both mutations are keyed by `clerk_id` and are idempotent: Clerk redelivers
//! webhooks, so applying the same event twice must leave the table unchanged
//! after the first application.
//!
//! `AppState` holds an `Arc<dyn UserRepository>`; production uses
//! [`PgUserRepository`], tests use `memory::InMemoryUserRepository`.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserProfile};

pub use postgres::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Single-row lookup on the unique `clerk_id` index.
    async fn find_by_clerk_id(&self, clerk_id: &str) -> anyhow::Result<Option<User>>;

    /// Inserts the user unless a row with the same `clerk_id` exists.
    /// Returns the new row id, or `None` when the insert was skipped.
    async fn create_if_absent(&self, user: &NewUser) -> anyhow::Result<Option<Uuid>>;

    /// Overwrites `email`, `name` and `image` of an existing row.
    /// Returns the row id, or `None` when no row matches `clerk_id`.
    async fn update_if_present(
        &self,
        clerk_id: &str,
        profile: &UserProfile,
    ) -> anyhow::Result<Option<Uuid>>;

    /// All users, oldest first.
    async fn list(&self) -> anyhow::Result<Vec<User>>;
}
