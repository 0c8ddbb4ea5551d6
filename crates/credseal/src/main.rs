// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! credseal - operator CLI for stored third-party credentials.
//!
//! Blobs and plaintext are read from stdin so they never appear in shell
//! history or process listings.

mod commands;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use credseal_config::{CredsealConfig, render_errors};
use credseal_core::CredentialError;

/// credseal - operator CLI for stored third-party credentials.
#[derive(Parser, Debug)]
#[command(name = "credseal", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file (plus CREDSEAL_* overrides) instead
    /// of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a fresh random 256-bit key as 64 hex characters.
    Keygen,
    /// Seal plaintext from stdin and print the stored-blob JSON.
    Seal,
    /// Open a stored blob from stdin.
    Open {
        /// Print the plaintext instead of a masked preview.
        #[arg(long)]
        reveal: bool,
    },
    /// Print the storage shape of a blob from stdin.
    Inspect,
    /// Re-seal every legacy blob in a SQLite credential store.
    Migrate {
        /// Database path; defaults to `storage.database_path`.
        #[arg(long)]
        database: Option<PathBuf>,
        /// Record the configured key as the store's key if none is recorded.
        #[arg(long)]
        record_key_check: bool,
    },
    /// Verify configuration and key material.
    Check,
    /// Print the effective configuration with the key redacted.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // keygen and inspect need neither config nor key.
    match cli.command {
        Commands::Keygen => return finish(commands::keygen().map(|hex| println!("{hex}"))),
        Commands::Inspect => {
            return finish(read_stdin_string().map(|input| println!("{}", commands::inspect(&input))));
        }
        _ => {}
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Seal => run_seal(&config),
        Commands::Open { reveal } => run_open(&config, reveal),
        Commands::Migrate {
            database,
            record_key_check,
        } => commands::migrate(&config, database, record_key_check)
            .await
            .map(|report| {
                println!("{report}");
                for (tenant, account) in &report.skipped {
                    println!("  skipped: {tenant}/{account} (changed during migration)");
                }
                for failure in &report.failed {
                    println!(
                        "  failed: {}/{} ({})",
                        failure.tenant, failure.account, failure.error_kind
                    );
                }
            }),
        Commands::Check => credseal_vault::codec_startup_check(&config).map(|_| {
            println!("credseal: codec ready (reseal_legacy={})", config.codec.reseal_legacy);
        }),
        Commands::Config => commands::show_config(&config).map(|rendered| print!("{rendered}")),
        Commands::Keygen | Commands::Inspect => Ok(()),
    };
    finish(result)
}

fn load_config(path: Option<&std::path::Path>) -> Result<CredsealConfig, ExitCode> {
    let loaded = match path {
        Some(path) => credseal_config::load_and_validate_path(path),
        None => credseal_config::load_and_validate(),
    };
    loaded.map_err(|errors| {
        render_errors(&errors);
        ExitCode::FAILURE
    })
}

fn run_seal(config: &CredsealConfig) -> Result<(), CredentialError> {
    let codec = credseal_vault::codec_startup_check(config)?;
    let input = read_stdin_bytes()?;
    println!("{}", commands::seal(&codec, &input)?);
    Ok(())
}

fn run_open(config: &CredsealConfig, reveal: bool) -> Result<(), CredentialError> {
    let codec = credseal_vault::codec_startup_check(config)?;
    let input = read_stdin_string()?;
    let output = commands::open(&codec, &input, reveal)?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&output)
        .and_then(|()| stdout.write_all(b"\n"))
        .map_err(|e| CredentialError::Internal(format!("failed to write stdout: {e}")))
}

fn read_stdin_bytes() -> Result<Vec<u8>, CredentialError> {
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .map_err(|e| CredentialError::Internal(format!("failed to read stdin: {e}")))?;
    Ok(buf)
}

fn read_stdin_string() -> Result<String, CredentialError> {
    String::from_utf8(read_stdin_bytes()?)
        .map_err(|_| CredentialError::Internal("stdin is not valid UTF-8".to_string()))
}

fn finish(result: Result<(), CredentialError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("credseal: {err}");
            if err.requires_relink() {
                eprintln!("credseal: {}", err.user_message());
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing subscriber on stderr, keeping stdout for output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credseal={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}
