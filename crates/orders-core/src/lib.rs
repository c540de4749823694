//! Core types for the orders service.
//!
//! This crate provides the foundational types shared by the store and the HTTP API:
//!
//! - **Identifiers**: `OrderId`, `CustomerId`, `ItemId`
//! - **Orders**: `Order`, `LineItem`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod order;

pub use ids::{CustomerId, IdError, ItemId, OrderId};
pub use order::{LineItem, Order};
