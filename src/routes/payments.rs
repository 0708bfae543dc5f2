use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{require_owner, require_user};
use crate::error::AppResult;
use crate::models::{Payment, UserRole};
use crate::ownership::assert_payment_user;
use crate::repository::payments as payments_repo;
use crate::schemas::{validate_input, CreatePaymentInput, IdPath, PaymentListQuery};
use crate::services::ledger;
use crate::state::{db_pool, AppState};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/payments",
            axum::routing::get(list_payments).post(create_payment),
        )
        .route("/payments/pending", axum::routing::get(pending_payments))
        .route(
            "/payments/{id}/status",
            axum::routing::put(settle_payment),
        )
        .route("/payments/{id}/qr-code", axum::routing::get(payment_qr_code))
}

async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePaymentInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_owner(&state.config, &headers)?;
    validate_input(&payload)?;
    let pool = db_pool(&state)?;
    let payment = ledger::create_payment(pool, claims.sub, &payload).await?;
    tracing::info!(payment_id = %payment.id, room_id = %payment.room_id, "payment created");
    Ok((axum::http::StatusCode::CREATED, Json(payment)))
}

/// Owners see their whole portfolio ledger; tenants their own payments,
/// optionally filtered by status.
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    match claims.role {
        UserRole::Owner => {
            let ledger_rows = payments_repo::list_for_owner(pool, claims.sub).await?;
            Ok(Json(json!(ledger_rows)))
        }
        UserRole::User => {
            let own = payments_repo::list_for_user(pool, claims.sub, query.status).await?;
            Ok(Json(json!(own)))
        }
    }
}

/// Tenant's unsettled payments (PENDING and OVERDUE), oldest month first.
async fn pending_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Payment>>> {
    let claims = require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let pending = payments_repo::pending_for_user(pool, claims.sub).await?;
    Ok(Json(pending))
}

async fn settle_payment(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<Payment>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let payment = ledger::settle_payment(pool, claims.sub, path.id).await?;
    tracing::info!(payment_id = %payment.id, "payment settled");
    Ok(Json(payment))
}

/// Opaque QR payload for a payment, scoped to the tenant it was issued to.
async fn payment_qr_code(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let payment = assert_payment_user(pool, path.id, claims.sub).await?;
    Ok(Json(json!({
        "paymentId": payment.id,
        "qrCodeData": payment.qr_code_data,
    })))
}
