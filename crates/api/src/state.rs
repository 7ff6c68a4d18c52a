use std::sync::Arc;

use forge_core::storage::UploadStore;
use forge_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    pub pool: forge_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Image files under the public directory.
    pub uploads: UploadStore,
    /// `None` when SMTP is not configured; emails are then skipped.
    pub mailer: Option<Arc<Mailer>>,
}

impl AppState {
    /// Build state from a pool and loaded configuration.
    pub fn new(pool: forge_db::DbPool, config: ServerConfig) -> Self {
        let uploads = UploadStore::new(config.public_dir.clone());
        let mailer = config.mail.clone().map(|mail| Arc::new(Mailer::new(mail)));
        Self {
            pool,
            config: Arc::new(config),
            uploads,
            mailer,
        }
    }
}
