//! Shopdesk Core - Shared domain types.
//!
//! This crate provides the types used across all Shopdesk components:
//! - `server` - JSON API for receipts, stock, staff and analytics
//! - `cli` - Command-line tools for migrations and shop administration
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails, money/quantity helpers and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
