use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::require_owner;
use crate::auth::require_user;
use crate::error::{AppError, AppResult};
use crate::models::{Payment, Room, RoomView, UserRole};
use crate::ownership::{assert_room_owner, assert_room_renter};
use crate::repository::{payments, rooms};
use crate::schemas::{validate_input, IdPath, RoomSearchQuery, UpdateRoomInput};
use crate::state::{db_pool, AppState};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/rooms", axum::routing::get(list_rooms))
        .route("/rooms/search", axum::routing::get(search_rooms))
        .route(
            "/rooms/{id}",
            axum::routing::get(get_room).put(update_room),
        )
        .route("/rooms/{id}/payments", axum::routing::get(room_payments))
}

async fn list_rooms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RoomView>>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let portfolio = rooms::list_for_owner(pool, claims.sub).await?;
    Ok(Json(portfolio))
}

/// Substring match on room number or renter username, owner-scoped.
async fn search_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomSearchQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RoomView>>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let matches = rooms::search_for_owner(pool, claims.sub, query.q.trim()).await?;
    Ok(Json(matches))
}

/// Owners see any room in their chain; tenants only the room they rent.
async fn get_room(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<RoomView>> {
    let claims = require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    match claims.role {
        UserRole::Owner => {
            assert_room_owner(pool, path.id, claims.sub).await?;
        }
        UserRole::User => {
            assert_room_renter(pool, path.id, claims.sub).await?;
        }
    }

    let view = rooms::view_by_id(pool, path.id)
        .await?
        .ok_or_else(|| AppError::NotFound("room not found".to_string()))?;
    Ok(Json(view))
}

async fn update_room(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateRoomInput>,
) -> AppResult<Json<Room>> {
    let claims = require_owner(&state.config, &headers)?;
    validate_input(&payload)?;
    let pool = db_pool(&state)?;
    assert_room_owner(pool, path.id, claims.sub).await?;
    let room = rooms::update(pool, path.id, &payload).await?;
    Ok(Json(room))
}

/// Payment history of one room, visible to its owner or its current renter.
async fn room_payments(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Payment>>> {
    let claims = require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    match claims.role {
        UserRole::Owner => {
            assert_room_owner(pool, path.id, claims.sub).await?;
        }
        UserRole::User => {
            assert_room_renter(pool, path.id, claims.sub).await?;
        }
    }

    let history = payments::list_for_room(pool, path.id).await?;
    Ok(Json(history))
}
