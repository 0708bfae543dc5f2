//! Capability checks for the renthouse → floor → room → payment chain.
//!
//! Every mutating or owner-scoped operation re-reads the chain here; results
//! are never cached, so a transferred or deleted renthouse takes effect on
//! the next request.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Floor, Payment, Renthouse, Room};

#[derive(sqlx::FromRow)]
struct OwnedFloor {
    #[sqlx(flatten)]
    floor: Floor,
    owner_id: Uuid,
}

#[derive(sqlx::FromRow)]
struct OwnedRoom {
    #[sqlx(flatten)]
    room: Room,
    owner_id: Uuid,
}

#[derive(sqlx::FromRow)]
struct OwnedPayment {
    #[sqlx(flatten)]
    payment: Payment,
    owner_id: Uuid,
}

pub async fn assert_renthouse_owner(
    pool: &PgPool,
    renthouse_id: Uuid,
    owner_id: Uuid,
) -> AppResult<Renthouse> {
    let found = sqlx::query_as::<_, Renthouse>("SELECT * FROM renthouses WHERE id = $1")
        .bind(renthouse_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("renthouse not found".to_string()))?;
    if found.owner_id != owner_id {
        return Err(AppError::Forbidden(
            "renthouse belongs to another owner".to_string(),
        ));
    }
    Ok(found)
}

pub async fn assert_floor_owner(pool: &PgPool, floor_id: Uuid, owner_id: Uuid) -> AppResult<Floor> {
    let found = sqlx::query_as::<_, OwnedFloor>(
        "SELECT f.*, h.owner_id
         FROM floors f
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE f.id = $1",
    )
    .bind(floor_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("floor not found".to_string()))?;
    if found.owner_id != owner_id {
        return Err(AppError::Forbidden(
            "floor belongs to another owner".to_string(),
        ));
    }
    Ok(found.floor)
}

pub async fn assert_room_owner(pool: &PgPool, room_id: Uuid, owner_id: Uuid) -> AppResult<Room> {
    let found = sqlx::query_as::<_, OwnedRoom>(
        "SELECT r.*, h.owner_id
         FROM rooms r
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE r.id = $1",
    )
    .bind(room_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("room not found".to_string()))?;
    if found.owner_id != owner_id {
        return Err(AppError::Forbidden(
            "room belongs to another owner".to_string(),
        ));
    }
    Ok(found.room)
}

pub async fn assert_payment_owner(
    pool: &PgPool,
    payment_id: Uuid,
    owner_id: Uuid,
) -> AppResult<Payment> {
    let found = sqlx::query_as::<_, OwnedPayment>(
        "SELECT p.*, h.owner_id
         FROM payments p
         JOIN rooms r ON r.id = p.room_id
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE p.id = $1",
    )
    .bind(payment_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("payment not found".to_string()))?;
    if found.owner_id != owner_id {
        return Err(AppError::Forbidden(
            "payment belongs to another owner".to_string(),
        ));
    }
    Ok(found.payment)
}

/// A room scoped to its current renter.
pub async fn assert_room_renter(pool: &PgPool, room_id: Uuid, user_id: Uuid) -> AppResult<Room> {
    let found = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
        .bind(room_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("room not found".to_string()))?;
    if found.renter_id != Some(user_id) {
        return Err(AppError::Forbidden(
            "room is not rented by this user".to_string(),
        ));
    }
    Ok(found)
}

/// A payment scoped to the tenant it was issued to.
pub async fn assert_payment_user(
    pool: &PgPool,
    payment_id: Uuid,
    user_id: Uuid,
) -> AppResult<Payment> {
    let found = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(payment_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("payment not found".to_string()))?;
    if found.user_id != user_id {
        return Err(AppError::Forbidden(
            "payment belongs to another user".to_string(),
        ));
    }
    Ok(found)
}
