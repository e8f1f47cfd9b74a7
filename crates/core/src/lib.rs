//! Homegrid Core - Shared types library.
//!
//! This crate provides common types used across all Homegrid components:
//! - `storefront` - Public-facing storefront API (port 3000)
//! - `cli` - Command-line tools for migrations, seeding and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, currencies, and statuses
//! - [`pricing`] - Bill-of-materials price-range calculator for proposals
//! - [`catalog`] - Normalized catalog filter/sort/pagination model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod pricing;
pub mod types;

pub use types::*;
