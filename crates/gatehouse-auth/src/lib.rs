//! Authentication bootstrap and credential verification core.
//!
//! Seeds baseline roles, permissions, settings and the system actor exactly
//! once, creates the first administrator, verifies sign-in credentials and
//! builds session claims. Persistence goes through a `StoreAdapter`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod authenticator;
pub mod bootstrap;
pub mod crypto;
pub mod defaults;
pub mod mutation_log;
pub mod password;
pub mod policy;
pub mod session;
pub mod settings;
pub mod setup_admin;

pub mod prelude;

// vim: ts=4
