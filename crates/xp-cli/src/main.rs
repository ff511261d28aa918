//! # xp
//!
//! Writes and reads the signed SAML responses exchanged between the portals.

#![forbid(unsafe_code)]

use clap::Parser;
use xp_cli::{
    cli::{Cli, Command},
    commands::{run_read, run_thumbprint, run_write},
    config, logging,
    output::error,
};

fn main() {
    let cli = Cli::parse();

    let log_handle = logging::init(cli.verbose);

    let config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(e.exit_code());
        }
    };
    log_handle.apply_config(&config.logging.level);

    let result = match cli.command {
        Command::Write(args) => run_write(args, &config),
        Command::Read(args) => run_read(args, &config, cli.output),
        Command::Thumbprint { cert } => run_thumbprint(&cert, cli.output),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
