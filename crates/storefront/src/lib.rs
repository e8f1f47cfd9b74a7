//! Homegrid storefront library.
//!
//! The storefront API as a library, so the CLI and the integration tests
//! can drive the same code paths as the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gateway;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup_pack;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
