//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::association::AssociationRepository;
use crate::models::association::AssociationInfo;
use crate::print::TemplateEngine;
use crate::services::earthquakes::EarthquakeClient;
use crate::services::email::Mailer;
use crate::services::telegram::TelegramNotifier;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources like the database pool and configuration. It replaces the
/// ambient application singleton of older designs with explicit injection
/// through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    association: AssociationInfo,
    print_engine: TemplateEngine,
    telegram: Option<TelegramNotifier>,
    mailer: Option<Mailer>,
    earthquakes: EarthquakeClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads the association header row (name, address, tax code) used by
    /// page headers and print templates; if the table is empty or the query
    /// fails the placeholder record is used and the error is logged, so the
    /// server still comes up against a freshly migrated database.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailer transport cannot be constructed from
    /// the SMTP configuration.
    pub async fn new(config: ServerConfig, pool: PgPool) -> Result<Self, crate::error::AppError> {
        let association = match AssociationRepository::new(&pool).get().await {
            Ok(Some(info)) => info,
            Ok(None) => {
                tracing::warn!("No association record found, using placeholder data");
                AssociationInfo::placeholder()
            }
            Err(e) => {
                tracing::error!("Failed to load association data: {e}");
                AssociationInfo::placeholder()
            }
        };

        let print_engine =
            TemplateEngine::new(config.templates_dir.clone(), association.clone());
        let telegram = config.telegram().map(TelegramNotifier::new);
        let mailer = config
            .email()
            .map(Mailer::new)
            .transpose()
            .map_err(|e| crate::error::AppError::Internal(format!("SMTP transport: {e}")))?;
        let earthquakes = EarthquakeClient::new();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                association,
                print_engine,
                telegram,
                mailer,
                earthquakes,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the association header data (name, address, tax code).
    #[must_use]
    pub fn association(&self) -> &AssociationInfo {
        &self.inner.association
    }

    /// Get a reference to the print template engine.
    #[must_use]
    pub fn print_engine(&self) -> &TemplateEngine {
        &self.inner.print_engine
    }

    /// Get the Telegram notifier, if configured.
    #[must_use]
    pub fn telegram(&self) -> Option<&TelegramNotifier> {
        self.inner.telegram.as_ref()
    }

    /// Get the SMTP mailer, if configured.
    #[must_use]
    pub fn mailer(&self) -> Option<&Mailer> {
        self.inner.mailer.as_ref()
    }

    /// Get the INGV earthquake feed client.
    #[must_use]
    pub fn earthquakes(&self) -> &EarthquakeClient {
        &self.inner.earthquakes
    }
}
