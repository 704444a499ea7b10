//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types used across all Shopfront components:
//! - `storefront` - Public-facing shop (pages, cart, checkout hand-off)
//! - `cli` - Command-line tools for catalog seeding and cart inspection
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no persistence. The cart collection lives here; the storefront
//! wraps it with storage.
//!
//! # Modules
//!
//! - [`cart`] - Cart lines and the in-memory cart collection
//! - [`types`] - Newtype IDs, prices, emails, catalog and order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartLine, NewCartLine};
pub use types::*;
