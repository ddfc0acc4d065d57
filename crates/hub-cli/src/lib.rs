//! # hub-cli
//!
//! The `hub` command: runs the Project-HUB server and administers its
//! configuration and accounts.
//!
//! - [`cli`]: clap argument definitions
//! - [`config_handlers`]: `hub config path|get|set|init|export`
//! - [`admin`]: `hub admin create|promote`
//! - [`logging`]: tracing subscriber setup

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod admin;
pub mod cli;
pub mod config_handlers;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
