//! Admin authorization middleware
//!
//! Guards the `/admin/*` surface with a pre-shared secret presented in
//! the `X-Admin-Api-Key` header, checked against [`crate::config::AdminConfig`].
//! There is no per-admin identity: this is an operator-facing surface, not a
//! multi-tenant one, so a single shared secret is sufficient (see the admin
//! authentication Open Question in `DESIGN.md`).

use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::error::AppError;
use crate::state::AppState;

const ADMIN_API_KEY_HEADER: &str = "x-admin-api-key";

/// Rejects the request unless it carries the configured admin API key.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let configured_key = state
        .config()
        .admin
        .api_key
        .as_deref()
        .ok_or(AppError::MissingAdminAuth)?;

    let provided = request
        .headers()
        .get(ADMIN_API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::MissingAdminAuth)?;

    if !constant_time_eq(provided.as_bytes(), configured_key.as_bytes()) {
        return Err(AppError::InvalidAdminAuth);
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_rejects_mismatched_length() {
        assert!(!constant_time_eq(b"short", b"longer-key"));
    }

    #[test]
    fn constant_time_eq_accepts_identical_keys() {
        assert!(constant_time_eq(b"secret-key", b"secret-key"));
    }

    #[test]
    fn constant_time_eq_rejects_different_keys_of_equal_length() {
        assert!(!constant_time_eq(b"aaaaaaaa", b"bbbbbbbb"));
    }
}
