use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{User, UserRole};

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub role: UserRole,
}

pub async fn insert(pool: &PgPool, new_user: NewUser<'_>) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, full_name, phone, role)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.full_name)
    .bind(new_user.phone)
    .bind(new_user.role)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn username_or_email_taken(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> AppResult<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}
