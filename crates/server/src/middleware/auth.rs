//! Authentication extractor.
//!
//! Handlers that require a logged-in user take an [`AuthenticatedUser`]
//! argument. The extractor reads the identity from the session and reloads
//! the effective permission set from the database on every request, so a
//! grant change takes effect on the user's next click without re-login.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use easyvol_core::{Action, Module, PermissionSet};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::session::{CurrentUser, keys};
use crate::state::AppState;

/// The logged-in user plus their effective permissions.
///
/// Client address and user agent are captured for the activity log.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: CurrentUser,
    pub permissions: PermissionSet,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuthenticatedUser {
    /// Require one (module, action) capability.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` ("Accesso negato") when the capability
    /// is missing.
    pub fn require(&self, module: Module, action: Action) -> Result<(), AppError> {
        if self.permissions.allows(module, action) {
            Ok(())
        } else {
            tracing::warn!(
                user = %self.user.username,
                module = %module,
                action = %action,
                "Permission denied"
            );
            Err(AppError::Forbidden)
        }
    }

    /// True if the user holds the capability; used by templates to hide
    /// sidebar entries and action buttons.
    #[must_use]
    pub fn can(&self, module: Module, action: Action) -> bool {
        self.permissions.allows(module, action)
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user: Option<CurrentUser> = session
            .get(keys::CURRENT_USER)
            .await
            .map_err(|e| AppError::Internal(format!("session load: {e}")).into_response())?;

        let path = parts.uri.path();
        let Some(user) = user else {
            return Err(unauthenticated(path));
        };

        // Users seeded with the default password are locked to the change
        // form until they pick their own.
        if user.must_change_password
            && !path.starts_with("/password/change")
            && path != "/logout"
            && !path.starts_with("/api/")
        {
            return Err(Redirect::to("/password/change").into_response());
        }

        let permissions = UserRepository::new(state.pool())
            .effective_permissions(user.id, user.role_id)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let ip_address = client_ip(&parts.headers, peer);
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        Ok(Self {
            user,
            permissions,
            ip_address,
            user_agent,
        })
    }
}

/// Client address for the activity log: the first `X-Forwarded-For` entry
/// when a proxy sits in front, the peer address otherwise.
fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .or_else(|| peer.map(|ip| ip.to_string()))
}

/// Browsers get bounced to the login form; API polling clients get a 401.
fn unauthenticated(path: &str) -> Response {
    if path.starts_with("/api/") {
        AppError::Unauthorized.into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easyvol_core::{PermissionGrant, PermissionKey, Source, UserId};

    fn test_user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "mrossi".to_string(),
            full_name: "Mario Rossi".to_string(),
            role_id: None,
            role_name: None,
            must_change_password: false,
        }
    }

    #[test]
    fn require_rejects_missing_grant() {
        let auth = AuthenticatedUser {
            user: test_user(),
            permissions: PermissionSet::merge([PermissionGrant {
                key: PermissionKey::new(Module::Members, Action::View),
                source: Source::Role,
            }]),
            ip_address: None,
            user_agent: None,
        };

        assert!(auth.require(Module::Members, Action::View).is_ok());
        assert!(matches!(
            auth.require(Module::Members, Action::Delete),
            Err(AppError::Forbidden)
        ));
        assert!(!auth.can(Module::Gdpr, Action::View));
    }

    #[test]
    fn client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.1".parse().unwrap(),
        );
        let peer = Some("127.0.0.1".parse().unwrap());

        assert_eq!(
            client_ip(&headers, peer),
            Some("203.0.113.7".to_string())
        );
        assert_eq!(
            client_ip(&HeaderMap::new(), peer),
            Some("127.0.0.1".to_string())
        );
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
