use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{require_owner, require_user};
use crate::error::{AppError, AppResult};
use crate::models::{Renthouse, UserRole};
use crate::ownership::{assert_floor_owner, assert_renthouse_owner};
use crate::repository::{favorites, floors, renthouses, rooms};
use crate::schemas::{
    validate_input, CreateFloorInput, CreateRenthouseInput, CreateRoomInput, IdPath,
    UpdateRenthouseInput,
};
use crate::state::{db_pool, AppState};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/renthouses",
            axum::routing::get(list_renthouses).post(create_renthouse),
        )
        .route(
            "/renthouses/{id}",
            axum::routing::get(get_renthouse)
                .put(update_renthouse)
                .delete(delete_renthouse),
        )
        .route("/renthouses/{id}/floors", axum::routing::post(create_floor))
        .route("/floors/{id}/rooms", axum::routing::post(create_room))
}

/// Owner's own portfolio.
async fn list_renthouses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Renthouse>>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let houses = renthouses::list_by_owner(pool, claims.sub).await?;
    Ok(Json(houses))
}

async fn create_renthouse(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateRenthouseInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_owner(&state.config, &headers)?;
    validate_input(&payload)?;
    let pool = db_pool(&state)?;
    let house = renthouses::insert(pool, claims.sub, &payload).await?;
    tracing::info!(renthouse_id = %house.id, owner_id = %claims.sub, "renthouse created");
    Ok((axum::http::StatusCode::CREATED, Json(house)))
}

/// Detail view for any authenticated principal. Tenants get `isFavorite`
/// flags on the rooms; the owner flag list is simply empty.
async fn get_renthouse(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    let house = renthouses::find_by_id(pool, path.id)
        .await?
        .ok_or_else(|| AppError::NotFound("renthouse not found".to_string()))?;

    let favorite_room_ids = if claims.role == UserRole::User {
        favorites::room_ids_for_renthouse(pool, claims.sub, house.id).await?
    } else {
        Vec::new()
    };

    let mut floor_views = Vec::new();
    for floor in floors::list_for_renthouse(pool, house.id).await? {
        let floor_rooms = rooms::list_for_floor(pool, floor.id).await?;
        let room_views: Vec<Value> = floor_rooms
            .into_iter()
            .map(|room| {
                let is_favorite = favorite_room_ids.contains(&room.id);
                let mut value = json!(room);
                if let Some(object) = value.as_object_mut() {
                    object.insert("isFavorite".to_string(), json!(is_favorite));
                }
                value
            })
            .collect();
        let mut floor_value = json!(floor);
        if let Some(object) = floor_value.as_object_mut() {
            object.insert("rooms".to_string(), json!(room_views));
        }
        floor_views.push(floor_value);
    }

    let mut house_value = json!(house);
    if let Some(object) = house_value.as_object_mut() {
        object.insert("floors".to_string(), json!(floor_views));
    }
    Ok(Json(house_value))
}

async fn update_renthouse(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateRenthouseInput>,
) -> AppResult<Json<Renthouse>> {
    let claims = require_owner(&state.config, &headers)?;
    validate_input(&payload)?;
    let pool = db_pool(&state)?;
    assert_renthouse_owner(pool, path.id, claims.sub).await?;
    let house = renthouses::update(pool, path.id, &payload).await?;
    Ok(Json(house))
}

async fn delete_renthouse(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    assert_renthouse_owner(pool, path.id, claims.sub).await?;
    renthouses::delete(pool, path.id).await?;
    tracing::info!(renthouse_id = %path.id, "renthouse deleted");
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn create_floor(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
    Json(payload): Json<CreateFloorInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_owner(&state.config, &headers)?;
    validate_input(&payload)?;
    let pool = db_pool(&state)?;
    assert_renthouse_owner(pool, path.id, claims.sub).await?;

    let floor_number = match payload.floor_number {
        Some(number) => number,
        None => floors::next_floor_number(pool, path.id).await?,
    };
    let floor = floors::insert(pool, path.id, floor_number, payload.description.as_deref()).await?;
    Ok((axum::http::StatusCode::CREATED, Json(floor)))
}

async fn create_room(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
    Json(payload): Json<CreateRoomInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_owner(&state.config, &headers)?;
    validate_input(&payload)?;
    let pool = db_pool(&state)?;
    assert_floor_owner(pool, path.id, claims.sub).await?;

    let room_number = match payload.room_number.as_deref().map(str::trim) {
        Some(number) if !number.is_empty() => number.to_string(),
        _ => rooms::next_room_number(pool, path.id).await?.to_string(),
    };
    let room = rooms::insert(pool, path.id, &room_number, &payload).await?;
    Ok((axum::http::StatusCode::CREATED, Json(room)))
}
