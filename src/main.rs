use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use veil::commands::{self, DecryptArgs, EncryptArgs};
use veil::config::KEY_ENV;
use veil::Result;

#[derive(Parser)]
#[command(name = "veil")]
#[command(version)]
#[command(about = "Encrypt the secrets in environment files, keep the rest readable", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt an environment file
    Encrypt(EncryptCommand),

    /// Decrypt an encrypted environment file
    Decrypt(DecryptCommand),
}

#[derive(Args)]
struct EncryptCommand {
    /// The encryption key (raw or base64:-prefixed); generated when absent
    #[arg(long, env = KEY_ENV, hide_env_values = true)]
    key: Option<String>,

    /// The encryption cipher [default: AES-256-CBC]
    #[arg(long)]
    cipher: Option<String>,

    /// The environment to be encrypted
    #[arg(long)]
    env: Option<String>,

    /// Overwrite the existing encrypted environment file
    #[arg(long)]
    force: bool,

    /// Encrypt only the values to keep the file readable
    #[arg(long, overrides_with = "no_only_values")]
    only_values: bool,

    /// Treat the file as one payload even if .veil.toml enables --only-values
    #[arg(long, overrides_with = "only_values")]
    no_only_values: bool,

    /// Encrypt only variables matching these comma-separated patterns
    /// [default: **_KEY,*_KEYS,*_SECRET,*_PASSWORD,*_TOKEN]
    #[arg(long, value_name = "PATTERNS")]
    only: Option<String>,

    /// Ignore --only and the default patterns, encrypt all variables
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct DecryptCommand {
    /// The encryption key (raw or base64:-prefixed)
    #[arg(long, env = KEY_ENV, hide_env_values = true)]
    key: Option<String>,

    /// The encryption cipher [default: AES-256-CBC]
    #[arg(long)]
    cipher: Option<String>,

    /// The environment to be decrypted
    #[arg(long)]
    env: Option<String>,

    /// Overwrite the existing environment file
    #[arg(long)]
    force: bool,

    /// Directory to write the decrypted file to
    #[arg(long)]
    path: Option<PathBuf>,

    /// Filename of the decrypted file
    #[arg(long)]
    filename: Option<String>,

    /// Enable if the file was encrypted with --only-values
    #[arg(long, overrides_with = "no_only_values")]
    only_values: bool,

    /// Treat the file as one payload even if .veil.toml enables --only-values
    #[arg(long, overrides_with = "only_values")]
    no_only_values: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("VEIL_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("veil=debug")
        } else {
            EnvFilter::new("veil=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    let base_dir = std::env::current_dir()?;

    match command {
        Commands::Encrypt(cmd) => commands::encrypt(
            &base_dir,
            &EncryptArgs {
                key: cmd.key,
                cipher: cmd.cipher,
                env: cmd.env,
                force: cmd.force,
                only_values: flag(cmd.only_values, cmd.no_only_values),
                only: cmd.only,
                all: cmd.all,
            },
        ),
        Commands::Decrypt(cmd) => commands::decrypt(
            &base_dir,
            &DecryptArgs {
                key: cmd.key,
                cipher: cmd.cipher,
                env: cmd.env,
                force: cmd.force,
                path: cmd.path,
                filename: cmd.filename,
                only_values: flag(cmd.only_values, cmd.no_only_values),
            },
        ),
    }
}

/// Resolve a `--flag` / `--no-flag` pair; `None` when neither was given.
fn flag(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
