//! # xp-core
//!
//! Configuration and error handling shared by the exchange portal token crates.
//!
//! The token engine itself lives in `xp-protocol-saml`; this crate only holds
//! the settings that drive it (signing identity, certificate store scopes,
//! trusted thumbprints, reader options) and the error type used while loading
//! them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;

pub use config::{Config, StoreLocation, StoreName};
pub use error::{Error, Result};
