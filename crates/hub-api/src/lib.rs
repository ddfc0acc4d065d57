//! # hub-api
//!
//! HTTP API server for Project-HUB.
//!
//! This crate provides:
//! - [`HubConfig`]: TOML configuration with environment overrides
//! - [`AppState`]: repositories, auth and media host shared by handlers
//! - [`ApiError`]: the JSON error contract for every route
//! - [`router`] and [`serve`]: the REST API and its server lifecycle

#![forbid(unsafe_code)]

pub mod api_error;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;

pub use api_error::ApiError;
pub use config::HubConfig;
pub use error::{Error, Result};
pub use routes::router;
pub use server::{app, serve};
pub use session::AccountValidator;
pub use state::AppState;
