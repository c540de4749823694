//! Orders HTTP API Service.
//!
//! This crate exposes the order store over HTTP:
//!
//! - Order placement, lookup, update and deletion
//! - Cursor-paginated order listing
//!
//! Handlers decode requests, hand the order store a deadline derived from the
//! request timeout, and map store errors onto HTTP statuses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handlers need async for routing

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{open_store, AppState};
