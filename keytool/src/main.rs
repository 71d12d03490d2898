// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Meridian Keytool
//!
//! Entry point for the `meridian-keytool` binary. Generates and inspects the
//! Ed25519 key material the orchestrator runs on. Key files are hex-encoded
//! secrets, written with owner-only permissions; public material goes to
//! stdout, logs to stderr.
//!
//! The binary supports four subcommands:
//!
//! - `keygen`  — generate a keypair and write the secret to a key file
//! - `keylist` — compose a threshold key list with one key file per member
//! - `inspect` — derive the public key from an existing secret
//! - `version` — print build version information

mod cli;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use meridian_orchestrator::keys::{KeyComposer, KeySource, SigningKeypair};

use cli::{Commands, KeytoolCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = KeytoolCli::parse();
    logging::init_logging(
        "meridian_keytool=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Keygen(args) => generate_key(&args),
        Commands::Keylist(args) => {
            let listing = compose_key_list(&args)?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Commands::Inspect(args) => inspect_key(&args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Generates a fresh keypair and writes the secret to the key file.
fn generate_key(args: &cli::KeygenArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!(
            "refusing to replace existing key file {} (pass --force to overwrite)",
            args.out.display()
        );
    }

    let keypair = SigningKeypair::generate();
    write_secret(&args.out, &keypair)
        .with_context(|| format!("failed to write key file {}", args.out.display()))?;

    tracing::info!(
        public_key = %keypair.public_key().to_hex(),
        path = %args.out.display(),
        "keypair generated"
    );

    println!("Keypair generated.");
    println!("  Secret key file : {}", args.out.display());
    println!("  Public key      : {}", keypair.public_key().to_hex());
    Ok(())
}

/// Composes a threshold key list, persists each member's secret to its own
/// key file, and returns the public listing.
fn compose_key_list(args: &cli::KeylistArgs) -> Result<serde_json::Value> {
    let set = KeyComposer::compose(KeySource::Generate(args.count), args.threshold)?;

    std::fs::create_dir_all(&args.out_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            args.out_dir.display()
        )
    })?;

    // Refuse before writing anything; a half-replaced quorum is worse than
    // no quorum.
    let paths: Vec<PathBuf> = (1..=set.private_keys.len())
        .map(|i| args.out_dir.join(format!("{}-{i}.key", args.prefix)))
        .collect();
    if let Some(existing) = paths.iter().find(|path| path.exists()) {
        anyhow::bail!(
            "refusing to replace existing key file {} (choose another --prefix or --out-dir)",
            existing.display()
        );
    }
    for (path, keypair) in paths.iter().zip(&set.private_keys) {
        write_secret(path, keypair)
            .with_context(|| format!("failed to write key file {}", path.display()))?;
    }

    tracing::info!(
        members = set.key_list.len(),
        required = set.key_list.required_signatures(),
        out_dir = %args.out_dir.display(),
        "key list composed"
    );

    Ok(serde_json::json!({
        "members": set.key_list.len(),
        "required_signatures": set.key_list.required_signatures(),
        "public_keys": set
            .key_list
            .keys()
            .iter()
            .map(|key| key.to_hex())
            .collect::<Vec<_>>(),
        "secret_key_files": paths
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>(),
    }))
}

/// Derives and prints the public key for an existing secret.
fn inspect_key(args: &cli::InspectArgs) -> Result<()> {
    let secret = resolve_secret(args.key_file.as_deref(), args.key.as_deref())?;
    let keypair = SigningKeypair::from_hex(secret.trim())
        .context("secret is not a valid hex-encoded Ed25519 key")?;
    println!("{}", keypair.public_key().to_hex());
    Ok(())
}

/// Picks the secret source: an explicit key file wins over inline material
/// (flag or environment variable).
fn resolve_secret(key_file: Option<&Path>, inline: Option<&str>) -> Result<String> {
    match (key_file, inline) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display())),
        (None, Some(hex_key)) => Ok(hex_key.to_string()),
        (None, None) => {
            anyhow::bail!("no key material: pass --key-file, --key, or set MERIDIAN_OPERATOR_KEY")
        }
    }
}

/// Writes the hex-encoded secret and restricts permissions on Unix.
fn write_secret(path: &Path, keypair: &SigningKeypair) -> Result<()> {
    std::fs::write(path, keypair.secret_hex())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("meridian-keytool {}", env!("CARGO_PKG_VERSION"));
    println!("rustc            {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
