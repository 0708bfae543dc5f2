use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Floor;

pub async fn next_floor_number(pool: &PgPool, renthouse_id: Uuid) -> AppResult<i32> {
    let next = sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(floor_number), 0) + 1 FROM floors WHERE renthouse_id = $1",
    )
    .bind(renthouse_id)
    .fetch_one(pool)
    .await?;
    Ok(next)
}

pub async fn insert(
    pool: &PgPool,
    renthouse_id: Uuid,
    floor_number: i32,
    description: Option<&str>,
) -> AppResult<Floor> {
    let floor = sqlx::query_as::<_, Floor>(
        "INSERT INTO floors (renthouse_id, floor_number, description)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(renthouse_id)
    .bind(floor_number)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(floor)
}

pub async fn list_for_renthouse(pool: &PgPool, renthouse_id: Uuid) -> AppResult<Vec<Floor>> {
    let floors = sqlx::query_as::<_, Floor>(
        "SELECT * FROM floors WHERE renthouse_id = $1 ORDER BY floor_number",
    )
    .bind(renthouse_id)
    .fetch_all(pool)
    .await?;
    Ok(floors)
}
