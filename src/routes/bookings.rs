use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_renter;
use crate::error::{AppError, AppResult};
use crate::models::{Room, RoomView};
use crate::repository::rooms;
use crate::schemas::IdPath;
use crate::state::{db_pool, AppState};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/rooms/{id}/book", axum::routing::post(book_room))
        .route("/booking/current", axum::routing::get(current_booking))
        .route("/bookings/all", axum::routing::get(all_bookings))
}

/// Books an AVAILABLE room for the caller. The conditional update in the
/// repository decides the winner under concurrency; a `None` result is then
/// disambiguated into 404 or 409 with a second read.
async fn book_room(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<Room>> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    match rooms::try_book(pool, path.id, claims.sub).await? {
        Some(room) => {
            tracing::info!(room_id = %room.id, renter_id = %claims.sub, "room booked");
            Ok(Json(room))
        }
        None => match rooms::find_by_id(pool, path.id).await? {
            Some(_) => Err(AppError::Conflict(
                "room is not available for booking".to_string(),
            )),
            None => Err(AppError::NotFound("room not found".to_string())),
        },
    }
}

async fn current_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let booking = rooms::current_booking_for(pool, claims.sub).await?;
    Ok(Json(json!(booking)))
}

/// Every room ever linked to the caller as renter, including ones whose
/// tenancy has since ended.
async fn all_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RoomView>>> {
    let claims = require_renter(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let bookings = rooms::bookings_for(pool, claims.sub).await?;
    Ok(Json(bookings))
}
