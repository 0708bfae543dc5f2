use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// Rejects requests whose Host header is not in the configured allow-list.
/// A `*` entry disables the check.
pub async fn enforce_trusted_hosts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let trusted = &state.config.trusted_hosts;
    if trusted.iter().any(|host| host == "*") {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(strip_port);

    match host {
        Some(host) if trusted.iter().any(|t| t.eq_ignore_ascii_case(host)) => {
            next.run(request).await
        }
        _ => AppError::BadRequest("invalid host header".to_string()).into_response(),
    }
}

fn strip_port(host: &str) -> &str {
    host.rsplit_once(':')
        .map(|(name, _)| name)
        .unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::strip_port;

    #[test]
    fn strips_port_suffix() {
        assert_eq!(strip_port("localhost:8080"), "localhost");
        assert_eq!(strip_port("example.com"), "example.com");
    }
}
