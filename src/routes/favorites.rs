use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_renter;
use crate::error::{AppError, AppResult};
use crate::models::RoomView;
use crate::repository::{favorites, renthouses, rooms};
use crate::schemas::{IdPath, RoomIdPath};
use crate::state::{db_pool, AppState};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/favorites", axum::routing::get(list_favorites))
        .route(
            "/favorites/{room_id}",
            axum::routing::post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/renthouses/{id}/favorites",
            axum::routing::post(favorite_renthouse).delete(unfavorite_renthouse),
        )
        .route(
            "/renthouses/{id}/favorites/check",
            axum::routing::get(check_renthouse_favorite),
        )
}

async fn list_favorites(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RoomView>>> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let favorite_rooms = favorites::list_rooms(pool, claims.sub).await?;
    Ok(Json(favorite_rooms))
}

async fn add_favorite(
    State(state): State<AppState>,
    Path(path): Path<RoomIdPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    if rooms::find_by_id(pool, path.room_id).await?.is_none() {
        return Err(AppError::NotFound("room not found".to_string()));
    }
    favorites::insert(pool, claims.sub, path.room_id).await?;
    Ok(axum::http::StatusCode::CREATED)
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(path): Path<RoomIdPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let removed = favorites::delete(pool, claims.sub, path.room_id).await?;
    if removed == 0 {
        return Err(AppError::NotFound("favorite not found".to_string()));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Favorites the renthouse's first AVAILABLE room in storage order. The
/// remove path below is deliberately wider; the pair is asymmetric.
async fn favorite_renthouse(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    if renthouses::find_by_id(pool, path.id).await?.is_none() {
        return Err(AppError::NotFound("renthouse not found".to_string()));
    }
    let room = rooms::first_available_for_renthouse(pool, path.id)
        .await?
        .ok_or_else(|| AppError::NotFound("renthouse has no available room".to_string()))?;
    favorites::insert(pool, claims.sub, room.id).await?;
    Ok((axum::http::StatusCode::CREATED, Json(json!({ "roomId": room.id }))))
}

/// Removes the user's favorite links for every room of the renthouse.
async fn unfavorite_renthouse(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    if renthouses::find_by_id(pool, path.id).await?.is_none() {
        return Err(AppError::NotFound("renthouse not found".to_string()));
    }
    favorites::delete_for_renthouse(pool, claims.sub, path.id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn check_renthouse_favorite(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let favorited = favorites::any_for_renthouse(pool, claims.sub, path.id).await?;
    Ok(Json(json!({ "isFavorite": favorited })))
}
