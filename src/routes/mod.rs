use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod bookings;
pub mod browse;
pub mod favorites;
pub mod health;
pub mod payments;
pub mod renthouses;
pub mod reports;
pub mod rooms;
pub mod uploads;

pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .merge(auth::router())
        .merge(renthouses::router())
        .merge(rooms::router())
        .merge(bookings::router())
        .merge(payments::router())
        .merge(reports::router())
        .merge(favorites::router())
        .merge(browse::router())
        .merge(uploads::router())
}
