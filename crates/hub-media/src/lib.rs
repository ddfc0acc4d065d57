//! # hub-media
//!
//! Relays uploaded files to a hosted media service and turns the host's
//! answer into [`hub_core::Attachment`] values.
//!
//! - [`UploadPolicy`] checks a batch before anything leaves the process.
//! - [`MediaHost`] is the seam to the external host; [`HttpMediaHost`]
//!   talks to a Cloudinary-style unsigned upload endpoint and
//!   [`MemoryMediaHost`] keeps everything in memory for tests.
//! - [`upload_all`] uploads a batch concurrently, failing as a whole.

#![forbid(unsafe_code)]

pub mod error;
pub mod host;
pub mod http;
pub mod memory;
pub mod policy;

pub use error::{MediaError, Result};
pub use host::{MediaHost, UploadFile, upload_all};
pub use http::{HttpMediaConfig, HttpMediaHost};
pub use memory::MemoryMediaHost;
pub use policy::{UploadPolicy, guess_content_type};
