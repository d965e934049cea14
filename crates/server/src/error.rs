//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::print::PrintError;

/// Application-level error type.
///
/// User-facing messages are the static Italian strings the application has
/// always shown; internal detail is logged, never echoed to the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Print template loading or rendering failed.
    #[error("Print error: {0}")]
    Print(#[from] PrintError),

    /// An upstream service (INGV, Telegram) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// User lacks the required (module, action) permission.
    #[error("Accesso negato")]
    Forbidden,

    /// CSRF token missing or mismatched.
    #[error("Token CSRF non valido")]
    InvalidCsrfToken,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validation and conflict outcomes carry a user-facing Italian
        // message and are not server failures.
        if let Self::Database(repo_err) = &self {
            match repo_err {
                RepositoryError::Validation(message) => {
                    return (StatusCode::UNPROCESSABLE_ENTITY, message.clone()).into_response();
                }
                RepositoryError::Conflict(message) => {
                    return (StatusCode::CONFLICT, message.clone()).into_response();
                }
                RepositoryError::NotFound => {
                    return (StatusCode::NOT_FOUND, "Risorsa non trovata".to_string())
                        .into_response();
                }
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {}
            }
        }

        // Report server-side failures to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Print(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Print(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::InvalidCsrfToken => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Print(_) => {
                "Errore durante l'elaborazione della richiesta".to_string()
            }
            Self::Upstream(_) => "Servizio esterno non disponibile".to_string(),
            Self::Forbidden => "Accesso negato".to_string(),
            Self::InvalidCsrfToken => "Token CSRF non valido".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(
            status_of(AppError::NotFound("socio".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AppError::InvalidCsrfToken),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::BadRequest("campo mancante".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Upstream("INGV timeout".to_string())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn repository_outcomes_map_to_client_statuses() {
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Validation(
                "La finalità del trattamento è obbligatoria".to_string()
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Conflict(
                "matricola già esistente".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn forbidden_shows_static_italian_message() {
        assert_eq!(AppError::Forbidden.to_string(), "Accesso negato");
        assert_eq!(
            AppError::InvalidCsrfToken.to_string(),
            "Token CSRF non valido"
        );
    }
}
