//! Authentication middleware.
//!
//! Two credential forms are accepted: an `X-API-KEY` header matching
//! the configured API key, or `Authorization: Bearer <token>` matching
//! the configured bearer token. When neither secret is configured the
//! middleware is a pass-through. Secrets are held as SHA-256 digests
//! and compared in constant time.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

/// Digest a plaintext secret for storage; the plaintext is never kept.
pub fn secret_digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

fn digest_matches(expected: &[u8; 32], provided: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    bool::from(expected.ct_eq(provided.as_slice()))
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.api_key_digest.is_none() && state.bearer_digest.is_none() {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();

    let api_key_ok = match (&state.api_key_digest, headers.get("x-api-key")) {
        (Some(expected), Some(value)) => value
            .to_str()
            .map(|key| digest_matches(expected, key))
            .unwrap_or(false),
        _ => false,
    };

    let bearer_ok = match (&state.bearer_digest, headers.get(header::AUTHORIZATION)) {
        (Some(expected), Some(value)) => value
            .to_str()
            .ok()
            .and_then(|header| header.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| digest_matches(expected, token))
            .unwrap_or(false),
        _ => false,
    };

    if api_key_ok || bearer_ok {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::Unauthorized)
    }
}
