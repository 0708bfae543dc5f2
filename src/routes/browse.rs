use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::models::{NearbyRenthouse, Renthouse, RoomView};
use crate::repository::{renthouses, rooms};
use crate::schemas::{BrowseSearchQuery, IdPath, NearbyQuery};
use crate::state::{db_pool, AppState};

const FEATURED_LIMIT: i64 = 6;
const DEFAULT_RADIUS_KM: f64 = 5.0;
const FEATURED_CACHE_KEY: &str = "browse:featured";

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/renthouses/featured", axum::routing::get(featured))
        .route("/renthouses/nearby", axum::routing::get(nearby))
        .route("/renthouses/search", axum::routing::get(search))
        .route(
            "/renthouses/{id}/rooms/available",
            axum::routing::get(available_rooms),
        )
}

/// Six most recent listings. The response is the same for every caller, so
/// it sits in the short-TTL browse cache.
async fn featured(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    require_user(&state.config, &headers)?;

    if let Some(cached) = state.browse_cache.get(FEATURED_CACHE_KEY).await {
        return Ok(Json(cached));
    }

    let pool = db_pool(&state)?;
    let houses = renthouses::featured(pool, FEATURED_LIMIT).await?;
    let body = json!(houses);
    state
        .browse_cache
        .insert(FEATURED_CACHE_KEY.to_string(), body.clone())
        .await;
    Ok(Json(body))
}

async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<NearbyRenthouse>>> {
    require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let radius_km = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    let houses = renthouses::nearby(pool, query.latitude, query.longitude, radius_km).await?;
    Ok(Json(houses))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<BrowseSearchQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Renthouse>>> {
    require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let keyword = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());
    let houses = renthouses::search(pool, keyword, query.min_rent, query.max_rent).await?;
    Ok(Json(houses))
}

async fn available_rooms(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RoomView>>> {
    require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let open_rooms = rooms::available_for_renthouse(pool, path.id).await?;
    Ok(Json(open_rooms))
}
