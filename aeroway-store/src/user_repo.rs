use async_trait::async_trait;
use sqlx::PgPool;

use aeroway_core::models::{NewUser, User};
use aeroway_core::repository::{RepoError, RepoResult, UserRepository};

use crate::map_sqlx_err;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    is_staff: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            is_staff: row.is_staff,
        }
    }
}

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
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash, is_staff) VALUES ($1, $2, $3) \
             RETURNING id, email, password_hash, is_staff",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match map_sqlx_err(err) {
            RepoError::Conflict(_) => {
                RepoError::Conflict(format!("a user with email {} already exists", user.email))
            }
            other => other,
        })?;
        Ok(row.into())
    }

    async fn get(&self, id: i64) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, is_staff FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("user", id))?;
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, is_staff FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(row.map(Into::into))
    }
}
