//! DockDockGo: find GitHub repositories that ship a `docker-compose.yml`.
//!
//! This crate is the HTTP front end over [`dockdock_search`]:
//! - **config**: TOML file plus environment overrides
//! - **server**: axum router, JSON error bodies, CORS
//! - **mock**: canned fixtures for front-end work without GitHub

pub mod config;
pub mod error;
pub mod mock;
pub mod server;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use server::{ApiError, AppState, Server, router};

pub use dockdock_search::{EnrichedResult, SearchConfig, SearchCriteria, SearchError, SearchOutcome};
