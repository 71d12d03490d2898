//! # CLI Interface
//!
//! Defines the command-line argument structure for `meridian-keytool` using
//! `clap` derive. Supports four subcommands: `keygen`, `keylist`, `inspect`,
//! and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meridian operator key tooling.
///
/// Generates and inspects the Ed25519 key material that authorizes ledger
/// operations: single operator keys, threshold key lists for shared
/// custody, and the hex key files the orchestrator loads at startup.
#[derive(Parser, Debug)]
#[command(
    name = "meridian-keytool",
    about = "Meridian operator key tooling",
    version,
    propagate_version = true
)]
pub struct KeytoolCli {
    /// Log output format: "pretty" or "json".
    #[arg(long, env = "MERIDIAN_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the keytool binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh Ed25519 keypair and write the secret to a key file.
    Keygen(KeygenArgs),
    /// Compose a threshold key list, writing one key file per member.
    Keylist(KeylistArgs),
    /// Derive and print the public key of an existing secret.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Path the hex-encoded secret key is written to.
    ///
    /// Created with mode 0600 on Unix. An existing file is never replaced
    /// without `--force`.
    #[arg(long, short = 'o', default_value = "operator.key")]
    pub out: PathBuf,

    /// Replace the key file if it already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `keylist` subcommand.
#[derive(Parser, Debug)]
pub struct KeylistArgs {
    /// Number of member keys to generate.
    #[arg(long, short = 'n', default_value_t = 3)]
    pub count: usize,

    /// Signatures required to authorize; omit for all-of-n.
    #[arg(long, short = 't')]
    pub threshold: Option<usize>,

    /// Directory the member key files are written into.
    #[arg(long, short = 'd', default_value = ".")]
    pub out_dir: PathBuf,

    /// Filename prefix for the member key files.
    #[arg(long, default_value = "cosigner")]
    pub prefix: String,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to a hex key file written by `keygen` or `keylist`.
    #[arg(long, short = 'f', conflicts_with = "key")]
    pub key_file: Option<PathBuf>,

    /// Hex-encoded Ed25519 secret key.
    ///
    /// **Never pass this flag in production** — shell history keeps it.
    /// Prefer `--key-file`, or let the environment variable supply it.
    #[arg(long, env = "MERIDIAN_OPERATOR_KEY", hide_env_values = true)]
    pub key: Option<String>,
}
