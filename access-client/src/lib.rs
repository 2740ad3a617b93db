//! Access Client - HTTP transport for the access-control backend
//!
//! Implements [`access_engine::AccessBackend`] on top of `reqwest`, so the
//! engine's sessions and repositories can run against the real service:
//!
//! ```no_run
//! use access_client::ClientConfig;
//! use access_engine::{EngineConfig, HierarchyRepository};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ClientConfig::from_env().build_http_client()?);
//! let repo = HierarchyRepository::new(client, EngineConfig::from_env());
//! let tree = repo.refresh(None).await?;
//! println!("{} modules", tree.len());
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
