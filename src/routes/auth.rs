use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::auth::{issue_token, require_user};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserRole};
use crate::repository::users::{self, NewUser};
use crate::schemas::{validate_input, LoginInput, RegisterInput};
use crate::state::{db_pool, AppState};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/auth/register", axum::routing::post(register))
        .route("/auth/login", axum::routing::post(login))
        .route("/me", axum::routing::get(me))
}

fn token_response(state: &AppState, user: &User) -> AppResult<Json<serde_json::Value>> {
    let token = issue_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_seconds,
        user.id,
        user.role,
    )?;
    Ok(Json(json!({ "token": token, "user": user })))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let pool = db_pool(&state)?;

    // Friendly 409 up front; the unique constraints still win any race.
    if users::username_or_email_taken(pool, &payload.username, &payload.email).await? {
        return Err(AppError::Conflict(
            "username or email is already registered".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(&payload.password, state.config.bcrypt_cost)
        .map_err(|err| AppError::Internal(format!("failed to hash password: {err}")))?;

    let user = users::insert(
        pool,
        NewUser {
            username: &payload.username,
            email: &payload.email,
            password_hash: &password_hash,
            full_name: payload.full_name.as_deref(),
            phone: payload.phone.as_deref(),
            role: payload.role.unwrap_or(UserRole::User),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok((axum::http::StatusCode::CREATED, token_response(&state, &user)?))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let pool = db_pool(&state)?;

    let user = users::find_by_username(pool, &payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    let verified = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|err| AppError::Internal(format!("failed to verify password: {err}")))?;
    if !verified {
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    Ok(token_response(&state, &user)?)
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<User>> {
    let claims = require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let user = crate::repository::users::find_by_id(pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    Ok(Json(user))
}
