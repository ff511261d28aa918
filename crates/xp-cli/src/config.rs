//! CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xp_core::Config;

use crate::error::{CliError, CliResult};

/// Gets the default configuration file path.
pub fn config_path() -> CliResult<PathBuf> {
    let home = dirs_next::home_dir()
        .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
    Ok(home.join(".exchange-portal").join("xp.toml"))
}

/// Loads the engine configuration.
///
/// An explicit path must exist. The default path is optional; without it the
/// defaults apply. `XP_*` environment variables override either.
pub fn load(explicit: Option<&Path>) -> CliResult<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => config_path()?,
    };
    Ok(Config::load_layered(Some(&path))?)
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[signing]\nissuer = \"Exchange\"\nalgorithm = \"rsa-sha1\"\n"
        )
        .unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.signing.issuer, "Exchange");
        assert_eq!(config.signing.algorithm, "rsa-sha1");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/xp.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
