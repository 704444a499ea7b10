//! Shopfront Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! - [`cart`] - Cart store and its persistence backends
//! - [`catalog`] - Read-only product catalog (hosted or built-in)
//! - [`routes`] - HTTP handlers and the application router
//! - [`services`] - Checkout, order write and newsletter integrations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
