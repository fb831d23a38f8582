use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A locally stored user mirrored from Clerk.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub clerk_id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The mutable profile fields carried by every user event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

/// Insert payload for a user seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub clerk_id: String,
    pub profile: UserProfile,
}
