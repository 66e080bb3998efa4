//! HTTP server for LevelKV.
//!
//! Serves a Riak-compatible REST API: bucket and key listings, object
//! fetch/store/delete with metadata carried in headers, secondary-index
//! queries, and link walks. Map-reduce is answered with `501`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{LoggingMode, ServerConfig, DEFAULT_CONFIG_FILE};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use router::{build_router, SERVER_STRING};
pub use server::LevelKvServer;
