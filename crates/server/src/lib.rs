//! HTTP API for the resume analyzer.
//!
//! Accepts a PDF upload, runs it through the retrieval pipeline in [`analyzer`] and returns the
//! generated analysis.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Endpoints
//!
//! - `GET /` - plain-text liveness message
//! - `GET /health` - liveness probe
//! - `GET /ready` - readiness probe, including the embedding model status
//! - `POST /analyze` - multipart upload, file in the `resume` field
//!
//! # Configuration
//!
//! Read from an optional `server.{toml,yaml,json}` file and `RESUME_ANALYZER__*` environment
//! variables (`RESUME_ANALYZER__PORT`, `RESUME_ANALYZER__SEMANTIC__MODE`, ...). The Gemini API
//! key is taken from `VERTEX_API_KEY`; a `.env` file is honoured.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{Envelope, ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
