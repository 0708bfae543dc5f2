use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::RoomView;

pub async fn insert(pool: &PgPool, user_id: Uuid, room_id: Uuid) -> AppResult<()> {
    // The (user_id, room_id) unique constraint turns duplicates into 409s.
    sqlx::query("INSERT INTO favorites (user_id, room_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(room_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, user_id: Uuid, room_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND room_id = $2")
        .bind(user_id)
        .bind(room_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Removes the user's favorite links for every room of the renthouse, not
/// just the one the add path picked.
pub async fn delete_for_renthouse(
    pool: &PgPool,
    user_id: Uuid,
    renthouse_id: Uuid,
) -> AppResult<u64> {
    let result = sqlx::query(
        "DELETE FROM favorites fav
         USING rooms r, floors f
         WHERE fav.room_id = r.id
           AND r.floor_id = f.id
           AND f.renthouse_id = $2
           AND fav.user_id = $1",
    )
    .bind(user_id)
    .bind(renthouse_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list_rooms(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<RoomView>> {
    let rooms = sqlx::query_as::<_, RoomView>(
        "SELECT r.*, f.floor_number, h.id AS renthouse_id,
                h.name AS renthouse_name, u.username AS renter_username
         FROM favorites fav
         JOIN rooms r ON r.id = fav.room_id
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         LEFT JOIN users u ON u.id = r.renter_id
         WHERE fav.user_id = $1
         ORDER BY fav.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rooms)
}

pub async fn any_for_renthouse(
    pool: &PgPool,
    user_id: Uuid,
    renthouse_id: Uuid,
) -> AppResult<bool> {
    let favorited = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT 1
            FROM favorites fav
            JOIN rooms r ON r.id = fav.room_id
            JOIN floors f ON f.id = r.floor_id
            WHERE fav.user_id = $1 AND f.renthouse_id = $2
         )",
    )
    .bind(user_id)
    .bind(renthouse_id)
    .fetch_one(pool)
    .await?;
    Ok(favorited)
}

pub async fn room_ids_for_renthouse(
    pool: &PgPool,
    user_id: Uuid,
    renthouse_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT fav.room_id
         FROM favorites fav
         JOIN rooms r ON r.id = fav.room_id
         JOIN floors f ON f.id = r.floor_id
         WHERE fav.user_id = $1 AND f.renthouse_id = $2",
    )
    .bind(user_id)
    .bind(renthouse_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}
