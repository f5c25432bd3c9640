//! Shared types, the store adapter trait, and error types for Gatehouse.
//!
//! The core crate and every store adapter depend on this crate, so adapters
//! can be compiled without pulling in the authentication logic.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod error;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
