//! # xp-cli
//!
//! Command line tools for the exchange portal token engine.
//!
//! This crate provides utilities for:
//! - Writing signed SAML responses from attribute mappings
//! - Reading responses and printing the extracted claims
//! - Computing certificate thumbprints for trust configuration

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
