//! Command implementations.

pub mod read;
pub mod thumbprint;
pub mod write;

pub use read::run_read;
pub use thumbprint::run_thumbprint;
pub use write::run_write;

use crate::error::{CliError, CliResult};

/// Splits a `Name=Value` argument at the first `=`.
///
/// Names may contain spaces; values may contain further `=` signs.
pub fn split_pair(arg: &str) -> CliResult<(String, String)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::InvalidArgument(format!(
            "expected NAME=VALUE, got '{arg}'"
        ))),
    }
}
