use tokio::net::TcpListener;

use lkv_db::Database;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// LevelKV HTTP server.
pub struct LevelKvServer {
    config: ServerConfig,
    state: AppState,
}

impl LevelKvServer {
    /// Open the database at the configured location. Failing to open any
    /// existing bucket is fatal.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let db = Database::open(&config.database_location)?;
        Ok(Self {
            config,
            state: AppState::new(db),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.state.db
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            database = %self.config.database_location.display(),
            "LevelKV server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
