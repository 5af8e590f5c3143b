use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::AuthError;
use crate::models::user::{NewUser, UserRow};

/// Carried in `AppState` as `Arc<dyn UserStore>`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, AuthError>;

    /// Inserts the user. Returns `false` when the username is already taken.
    async fn create(&self, user: NewUser) -> Result<bool, AuthError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, AuthError> {
        Ok(
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create(&self, user: NewUser) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() == 1;
        if created {
            info!("Registered user {}", user.username);
        }
        Ok(created)
    }
}
