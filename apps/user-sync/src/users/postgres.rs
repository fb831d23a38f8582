use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserProfile};
use crate::users::UserRepository;

/// Columns decoded into [`User`], in struct order.
const USER_COLUMNS: &str = "id, clerk_id, email, name, image, created_at, updated_at";

/// Postgres-backed repository over the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_clerk_id(&self, clerk_id: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE clerk_id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(clerk_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_if_absent(&self, user: &NewUser) -> anyhow::Result<Option<Uuid>> {
        // Conditional insert: two concurrent deliveries for the same clerk_id
        // cannot both succeed, the unique constraint arbitrates.
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO users (id, clerk_id, email, name, image)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (clerk_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.clerk_id)
        .bind(&user.profile.email)
        .bind(&user.profile.name)
        .bind(&user.profile.image)
        .fetch_optional(&self.pool)
        .await?;

        if id.is_none() {
            debug!(clerk_id = %user.clerk_id, "users row already present, insert skipped");
        }
        Ok(id)
    }

    async fn update_if_present(
        &self,
        clerk_id: &str,
        profile: &UserProfile,
    ) -> anyhow::Result<Option<Uuid>> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET email = $2, name = $3, image = $4, updated_at = NOW()
            WHERE clerk_id = $1
            RETURNING id
            "#,
        )
        .bind(clerk_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.image)
        .fetch_optional(&self.pool)
        .await?;

        if id.is_none() {
            debug!(clerk_id, "no users row to update");
        }
        Ok(id)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        Ok(sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_selected_columns_match_user_fields() {
        let user = User {
            id: Uuid::new_v4(),
            clerk_id: "u_1".to_string(),
            email: "ada@x.com".to_string(),
            name: "Ada Lovelace".to_string(),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        let mut fields: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut columns: Vec<&str> = USER_COLUMNS.split(", ").collect();
        fields.sort_unstable();
        columns.sort_unstable();
        assert_eq!(fields, columns);
    }
}
