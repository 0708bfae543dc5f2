use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::auth::require_owner;
use crate::error::{AppError, AppResult};
use crate::models::{IncomeReport, TenantSnapshot};
use crate::repository::{payments, renthouses, rooms};
use crate::schemas::{MonthlyIncomeQuery, YearlyIncomeQuery};
use crate::services::{ledger, tenants};
use crate::state::{db_pool, AppState};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/tenants", axum::routing::get(list_tenants))
        .route("/income/monthly", axum::routing::get(monthly_income))
        .route("/income/yearly", axum::routing::get(yearly_income))
        .route("/stats/active-rooms", axum::routing::get(active_rooms))
        .route(
            "/stats/pending-payments",
            axum::routing::get(pending_payments_count),
        )
        .route("/analytics", axum::routing::get(analytics))
}

async fn list_tenants(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<TenantSnapshot>>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let snapshots = tenants::tenants_for_owner(pool, claims.sub).await?;
    Ok(Json(snapshots))
}

async fn monthly_income(
    State(state): State<AppState>,
    Query(query): Query<MonthlyIncomeQuery>,
    headers: HeaderMap,
) -> AppResult<Json<IncomeReport>> {
    let claims = require_owner(&state.config, &headers)?;
    if !(1..=12).contains(&query.month) {
        return Err(AppError::BadRequest("month must be 1..=12".to_string()));
    }
    let pool = db_pool(&state)?;
    let report = ledger::monthly_income_report(pool, claims.sub, query.year, query.month).await?;
    Ok(Json(report))
}

async fn yearly_income(
    State(state): State<AppState>,
    Query(query): Query<YearlyIncomeQuery>,
    headers: HeaderMap,
) -> AppResult<Json<IncomeReport>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let report = ledger::yearly_income_report(pool, claims.sub, query.year).await?;
    Ok(Json(report))
}

/// Rooms currently not AVAILABLE across the owner's portfolio.
async fn active_rooms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let count = rooms::active_count_for_owner(pool, claims.sub).await?;
    Ok(Json(json!({ "activeRooms": count })))
}

async fn pending_payments_count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;
    let count = payments::pending_count_for_owner(pool, claims.sub).await?;
    Ok(Json(json!({ "pendingPayments": count })))
}

/// Dashboard rollup: current-year income series, tenant payment-status
/// distribution and portfolio summary.
async fn analytics(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let claims = require_owner(&state.config, &headers)?;
    let pool = db_pool(&state)?;

    let year = Utc::now().year();
    let series = payments::monthly_income_series(pool, claims.sub, year).await?;
    let monthly_income = zero_filled_series(&series);

    let snapshots = tenants::tenants_for_owner(pool, claims.sub).await?;
    let mut distribution: BTreeMap<String, u32> = BTreeMap::new();
    for snapshot in &snapshots {
        *distribution.entry(snapshot.payment_status.clone()).or_default() += 1;
    }

    let total_renthouses = renthouses::count_for_owner(pool, claims.sub).await?;
    let total_rooms = rooms::count_for_owner(pool, claims.sub).await?;
    let active_rooms = rooms::active_count_for_owner(pool, claims.sub).await?;

    Ok(Json(json!({
        "year": year,
        "monthlyIncome": monthly_income,
        "paymentStatusDistribution": distribution,
        "summary": {
            "totalRenthouses": total_renthouses,
            "totalRooms": total_rooms,
            "activeRooms": active_rooms,
            "totalTenants": snapshots.len(),
        }
    })))
}

/// All twelve months, zero where no PAID payment landed.
fn zero_filled_series(series: &[(i32, Decimal)]) -> Vec<Value> {
    (1..=12)
        .map(|month| {
            let income = series
                .iter()
                .find(|(m, _)| *m == month)
                .map(|(_, income)| *income)
                .unwrap_or(Decimal::ZERO);
            json!({ "month": month, "income": income })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::zero_filled_series;
    use rust_decimal::Decimal;

    #[test]
    fn fills_missing_months_with_zero() {
        let series = vec![(3, Decimal::from(2400)), (7, Decimal::from(800))];
        let filled = zero_filled_series(&series);
        assert_eq!(filled.len(), 12);
        assert_eq!(filled[2]["income"], serde_json::json!(Decimal::from(2400)));
        assert_eq!(filled[0]["income"], serde_json::json!(Decimal::ZERO));
        assert_eq!(filled[6]["month"], serde_json::json!(7));
    }
}
