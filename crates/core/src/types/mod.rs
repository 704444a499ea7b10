//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{NewOrder, NewOrderItem, Order};
pub use price::{CurrencyCode, Price};
pub use product::{ALL_CATEGORIES, Category, Product, Specification};
pub use status::OrderStatus;
