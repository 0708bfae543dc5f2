use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::{AppError, AppResult};
use crate::services::storage;
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/upload/image", axum::routing::post(upload_image))
}

/// Accepts one multipart `file` part and returns the public URL it was
/// stored under.
async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    require_user(&state.config, &headers)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("malformed multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| AppError::BadRequest("file part is missing a filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(format!("failed to read upload: {err}")))?;

        let url = storage::upload_image(&state, &filename, bytes.to_vec()).await?;
        return Ok(Json(json!({ "url": url })));
    }

    Err(AppError::BadRequest(
        "multipart body must contain a 'file' part".to_string(),
    ))
}
