//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use xp_core::{StoreLocation, StoreName};

use crate::config::OutputFormat;

/// Exchange portal token tool.
#[derive(Debug, Parser)]
#[command(name = "xp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.exchange-portal/xp.toml).
    #[arg(short, long, env = "XP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a signed SAML response.
    Write(WriteArgs),

    /// Verify a SAML response and print its claims.
    Read(ReadArgs),

    /// Print the thumbprint of a certificate.
    Thumbprint {
        /// PEM or DER certificate file.
        cert: PathBuf,
    },
}

/// Write arguments.
#[derive(Debug, clap::Args)]
pub struct WriteArgs {
    /// Attribute as `Name=Value`; repeatable.
    #[arg(short, long = "attr", value_name = "NAME=VALUE")]
    pub attributes: Vec<String>,

    /// Issuer name (overrides config).
    #[arg(long)]
    pub issuer: Option<String>,

    /// Subject name (overrides config).
    #[arg(long)]
    pub subject: Option<String>,

    /// Thumbprint of the signing certificate (overrides config).
    #[arg(long)]
    pub certificate_id: Option<String>,

    /// Store location to search (overrides config).
    #[arg(long)]
    pub store_location: Option<StoreLocation>,

    /// Store name to search (overrides config).
    #[arg(long)]
    pub store_name: Option<StoreName>,

    /// Sign with RSA-SHA1 for partners that cannot verify SHA-256.
    #[arg(long)]
    pub legacy_sha1: bool,

    /// Print the `SAMLResponse` form value instead of XML.
    #[arg(long)]
    pub base64: bool,
}

/// Read arguments.
#[derive(Debug, clap::Args)]
pub struct ReadArgs {
    /// Input file (stdin if not specified).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input is a base64 `SAMLResponse` form value.
    #[arg(long)]
    pub base64: bool,

    /// Built-in claim profile: `payment` or `enrollment`.
    #[arg(long)]
    pub profile: Option<String>,

    /// Additional claim as `Attribute Name=key`; repeatable.
    #[arg(long = "claim", value_name = "ATTRIBUTE=KEY")]
    pub claims: Vec<String>,

    /// Reject assertions outside their validity window.
    #[arg(long)]
    pub enforce_validity: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_write_command() {
        let cli = Cli::try_parse_from([
            "xp",
            "write",
            "--attr",
            "Payment Status=Success",
            "-a",
            "Total Amount Paid=10",
            "--store-location",
            "current-user",
            "--legacy-sha1",
        ])
        .unwrap();

        let Command::Write(args) = cli.command else {
            panic!("expected write");
        };
        assert_eq!(args.attributes.len(), 2);
        assert_eq!(args.store_location, Some(StoreLocation::CurrentUser));
        assert!(args.legacy_sha1);
        assert!(!args.base64);
    }

    #[test]
    fn parses_read_command() {
        let cli = Cli::try_parse_from([
            "xp",
            "-o",
            "json",
            "read",
            "--profile",
            "enrollment",
            "--claim",
            "Plan Name=plan",
            "--enforce-validity",
        ])
        .unwrap();

        assert!(matches!(cli.output, OutputFormat::Json));
        let Command::Read(args) = cli.command else {
            panic!("expected read");
        };
        assert_eq!(args.profile.as_deref(), Some("enrollment"));
        assert_eq!(args.claims, ["Plan Name=plan"]);
        assert!(args.enforce_validity);
        assert!(args.input.is_none());
    }

    #[test]
    fn rejects_unknown_store_name() {
        assert!(Cli::try_parse_from(["xp", "write", "--store-name", "nowhere"]).is_err());
    }
}
