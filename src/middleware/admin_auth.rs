use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::{app_state::AppState, error::AppError};

/// Rejects requests whose `Authorization: Bearer` token does not match the
/// configured admin token.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.env.admin.api_token.as_ref() else {
        return Err(AppError::Authorization("Admin access is disabled".to_string()));
    };

    match bearer_token(request.headers()) {
        Some(token) if token_matches(token, expected.expose_secret()) => Ok(next.run(request).await),
        Some(_) => Err(AppError::Authentication("Invalid admin token".to_string())),
        None => Err(AppError::Authentication("Missing bearer token".to_string())),
    }
}

/// Byte comparison in constant time.
fn token_matches(candidate: &str, expected: &str) -> bool {
    candidate.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
