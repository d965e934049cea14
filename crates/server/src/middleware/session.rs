//! `PostgreSQL`-backed session layer.

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ServerConfig;

/// Idle timeout after which a session expires.
const SESSION_IDLE_HOURS: i64 = 2;

/// Build the session layer on top of the shared database pool.
///
/// Sessions live in the `tower_sessions` table, which is created by the
/// migrations rather than at startup. The cookie is `HttpOnly` and
/// `SameSite=Strict`; the `Secure` flag follows the scheme of the public
/// base URL so local plain-HTTP development keeps working.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ServerConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name("easyvol_session")
        .with_http_only(true)
        .with_same_site(SameSite::Strict)
        .with_secure(config.base_url.starts_with("https://"))
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_IDLE_HOURS)))
}
