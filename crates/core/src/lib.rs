//! Atelier Core - Shared domain types.
//!
//! This crate provides the types every Atelier component agrees on:
//! - `shop` - Order-management service (catalog, carts, orders, HTTP API)
//! - `cli` - Command-line tools for migrations and catalog management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Storage concerns live behind the repository traits in the
//! `shop` crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities and order status
//! - [`pricing`] - Exact decimal line and aggregate totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{LineItem, PricingError, aggregate_total, line_total};
pub use types::*;
