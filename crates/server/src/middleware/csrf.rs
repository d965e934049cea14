//! Per-session CSRF tokens for form submissions.
//!
//! Every rendered form carries a hidden `csrf_token` field; mutating
//! handlers verify it against the session copy before touching the
//! database.

use axum::body::Body;
use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session::keys;

const TOKEN_BYTES: usize = 32;

/// Upper bound on buffered form bodies; newsletters carry inline HTML.
const FORM_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Fetch the session's CSRF token, generating one on first use.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn token(session: &Session) -> Result<String, AppError> {
    if let Some(existing) = session
        .get::<String>(keys::CSRF_TOKEN)
        .await
        .map_err(|e| AppError::Internal(format!("session load: {e}")))?
    {
        return Ok(existing);
    }

    let token = hex::encode(rand::random::<[u8; TOKEN_BYTES]>());
    session
        .insert(keys::CSRF_TOKEN, token.clone())
        .await
        .map_err(|e| AppError::Internal(format!("session store: {e}")))?;
    Ok(token)
}

/// Verify a submitted token against the session copy.
///
/// # Errors
///
/// Returns `AppError::InvalidCsrfToken` ("Token CSRF non valido") when the
/// session has no token or the submitted value does not match.
pub async fn verify(session: &Session, submitted: &str) -> Result<(), AppError> {
    let stored: Option<String> = session
        .get(keys::CSRF_TOKEN)
        .await
        .map_err(|e| AppError::Internal(format!("session load: {e}")))?;

    match stored {
        Some(stored) if constant_time_eq(stored.as_bytes(), submitted.as_bytes()) => Ok(()),
        _ => Err(AppError::InvalidCsrfToken),
    }
}

/// Middleware verifying the `csrf_token` form field on every state-changing
/// request.
///
/// Buffers the body, pulls `csrf_token` out of the urlencoded form, checks
/// it against the session copy and hands the untouched body on to the
/// handler. GET and HEAD pass through.
pub async fn verify_form(session: Session, request: Request, next: Next) -> Response {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, FORM_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::BadRequest(format!("body read: {e}")).into_response();
        }
    };

    let submitted = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == "csrf_token")
        .map(|(_, value)| value.into_owned());

    match verify(&session, submitted.as_deref().unwrap_or_default()).await {
        Ok(()) => {
            let request = Request::from_parts(parts, Body::from(bytes));
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_equal_slices() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn constant_time_eq_rejects_differences() {
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
