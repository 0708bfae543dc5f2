use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Room, RoomView};
use crate::schemas::{CreateRoomInput, UpdateRoomInput};

const ROOM_VIEW_SELECT: &str = "SELECT r.*, f.floor_number, h.id AS renthouse_id,
        h.name AS renthouse_name, u.username AS renter_username
     FROM rooms r
     JOIN floors f ON f.id = r.floor_id
     JOIN renthouses h ON h.id = f.renthouse_id
     LEFT JOIN users u ON u.id = r.renter_id";

/// The booking CAS statement. The status predicate is what guarantees that
/// of two concurrent bookers exactly one row comes back.
pub const BOOK_ROOM_SQL: &str = "UPDATE rooms
     SET status = 'BOOKED', renter_id = $2, booked_at = NOW(), updated_at = NOW()
     WHERE id = $1 AND status = 'AVAILABLE'
     RETURNING *";

/// Next numeric room number on the floor; non-numeric numbers (e.g. \"A-3\")
/// are ignored.
pub async fn next_room_number(pool: &PgPool, floor_id: Uuid) -> AppResult<i32> {
    let next = sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(room_number::int), 0) + 1
         FROM rooms
         WHERE floor_id = $1 AND room_number ~ '^[0-9]+$'",
    )
    .bind(floor_id)
    .fetch_one(pool)
    .await?;
    Ok(next)
}

pub async fn insert(
    pool: &PgPool,
    floor_id: Uuid,
    room_number: &str,
    input: &CreateRoomInput,
) -> AppResult<Room> {
    let room = sqlx::query_as::<_, Room>(
        "INSERT INTO rooms (floor_id, room_number, description, monthly_rent, deposit)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(floor_id)
    .bind(room_number)
    .bind(&input.description)
    .bind(input.monthly_rent)
    .bind(input.deposit)
    .fetch_one(pool)
    .await?;
    Ok(room)
}

pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateRoomInput) -> AppResult<Room> {
    let room = sqlx::query_as::<_, Room>(
        "UPDATE rooms SET
            room_number = COALESCE($2, room_number),
            description = COALESCE($3, description),
            monthly_rent = COALESCE($4, monthly_rent),
            deposit = COALESCE($5, deposit),
            updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&input.room_number)
    .bind(&input.description)
    .bind(input.monthly_rent)
    .bind(input.deposit)
    .fetch_one(pool)
    .await?;
    Ok(room)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<Room>> {
    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(room)
}

pub async fn list_for_floor(pool: &PgPool, floor_id: Uuid) -> AppResult<Vec<Room>> {
    let rooms =
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE floor_id = $1 ORDER BY created_at")
            .bind(floor_id)
            .fetch_all(pool)
            .await?;
    Ok(rooms)
}

pub async fn list_for_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<Vec<RoomView>> {
    let sql = format!("{ROOM_VIEW_SELECT} WHERE h.owner_id = $1 ORDER BY h.name, f.floor_number, r.room_number");
    let rooms = sqlx::query_as::<_, RoomView>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(rooms)
}

pub async fn search_for_owner(pool: &PgPool, owner_id: Uuid, term: &str) -> AppResult<Vec<RoomView>> {
    let sql = format!(
        "{ROOM_VIEW_SELECT}
         WHERE h.owner_id = $1 AND (r.room_number ILIKE $2 OR u.username ILIKE $2)
         ORDER BY h.name, f.floor_number, r.room_number"
    );
    let rooms = sqlx::query_as::<_, RoomView>(&sql)
        .bind(owner_id)
        .bind(format!("%{term}%"))
        .fetch_all(pool)
        .await?;
    Ok(rooms)
}

pub async fn view_by_id(pool: &PgPool, room_id: Uuid) -> AppResult<Option<RoomView>> {
    let sql = format!("{ROOM_VIEW_SELECT} WHERE r.id = $1");
    let room = sqlx::query_as::<_, RoomView>(&sql)
        .bind(room_id)
        .fetch_optional(pool)
        .await?;
    Ok(room)
}

pub async fn available_for_renthouse(pool: &PgPool, renthouse_id: Uuid) -> AppResult<Vec<RoomView>> {
    let sql = format!(
        "{ROOM_VIEW_SELECT}
         WHERE h.id = $1 AND r.status = 'AVAILABLE'
         ORDER BY f.floor_number, r.created_at"
    );
    let rooms = sqlx::query_as::<_, RoomView>(&sql)
        .bind(renthouse_id)
        .fetch_all(pool)
        .await?;
    Ok(rooms)
}

/// Storage order: floors by number, then rooms by creation time.
pub async fn first_available_for_renthouse(
    pool: &PgPool,
    renthouse_id: Uuid,
) -> AppResult<Option<Room>> {
    let room = sqlx::query_as::<_, Room>(
        "SELECT r.*
         FROM rooms r
         JOIN floors f ON f.id = r.floor_id
         WHERE f.renthouse_id = $1 AND r.status = 'AVAILABLE'
         ORDER BY f.floor_number, r.created_at
         LIMIT 1",
    )
    .bind(renthouse_id)
    .fetch_optional(pool)
    .await?;
    Ok(room)
}

/// Atomic conditional booking. `None` means the room either does not exist
/// or was not AVAILABLE at the moment of the update.
pub async fn try_book(pool: &PgPool, room_id: Uuid, renter_id: Uuid) -> AppResult<Option<Room>> {
    let room = sqlx::query_as::<_, Room>(BOOK_ROOM_SQL)
        .bind(room_id)
        .bind(renter_id)
        .fetch_optional(pool)
        .await?;
    Ok(room)
}

pub async fn current_booking_for(pool: &PgPool, user_id: Uuid) -> AppResult<Option<RoomView>> {
    let sql = format!(
        "{ROOM_VIEW_SELECT}
         WHERE r.renter_id = $1 AND r.status IN ('BOOKED', 'OCCUPIED')
         ORDER BY r.booked_at DESC NULLS LAST
         LIMIT 1"
    );
    let room = sqlx::query_as::<_, RoomView>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(room)
}

pub async fn bookings_for(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<RoomView>> {
    let sql = format!(
        "{ROOM_VIEW_SELECT}
         WHERE r.renter_id = $1
         ORDER BY r.booked_at DESC NULLS LAST"
    );
    let rooms = sqlx::query_as::<_, RoomView>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rooms)
}

/// Rooms in the owner's portfolio that are not sitting empty.
pub async fn active_count_for_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM rooms r
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE h.owner_id = $1 AND r.status <> 'AVAILABLE'",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn count_for_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM rooms r
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE h.owner_id = $1",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::BOOK_ROOM_SQL;

    // The at-most-one-winner booking property rests on this single statement
    // carrying the status predicate.
    #[test]
    fn booking_update_is_conditional_on_availability() {
        assert!(BOOK_ROOM_SQL.contains("status = 'AVAILABLE'"));
        assert!(BOOK_ROOM_SQL.contains("SET status = 'BOOKED'"));
        assert!(BOOK_ROOM_SQL.contains("RETURNING"));
    }
}
