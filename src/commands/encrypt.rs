use super::{encrypted_path, environment_file_name, resolve_cipher};
use crate::config::load_config;
use crate::crypto::{format_key, parse_key, Encrypter};
use crate::error::{Result, VeilError};
use crate::policy::SelectionPolicy;
use crate::transform::encrypt_contents;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Options of the `encrypt` command.
#[derive(Debug, Clone, Default)]
pub struct EncryptArgs {
    pub key: Option<String>,
    pub cipher: Option<String>,
    pub env: Option<String>,
    pub force: bool,
    /// `None` defers to the configuration.
    pub only_values: Option<bool>,
    pub only: Option<String>,
    pub all: bool,
}

/// Encrypt `.env[.<env>]` under `base_dir` into its `.encrypted` counterpart
pub fn encrypt(base_dir: &Path, args: &EncryptArgs) -> Result<()> {
    let config = load_config(base_dir)?;
    let cipher = resolve_cipher(args.cipher.as_deref(), &config)?;
    let only_values = args.only_values.unwrap_or(config.only_values);

    let (key, generated) = match args.key.as_deref().filter(|key| !key.is_empty()) {
        Some(key) => (parse_key(key)?, false),
        None => (cipher.generate_key(), true),
    };

    let environment_file = base_dir.join(environment_file_name(args.env.as_deref()));
    let encrypted_file = encrypted_path(&environment_file);

    if !environment_file.exists() {
        return Err(VeilError::InputFileNotFound(environment_file));
    }
    if encrypted_file.exists() && !args.force {
        return Err(VeilError::OutputExists(encrypted_file));
    }

    let encrypter = Encrypter::new(&key, cipher)?;
    let contents = fs::read_to_string(&environment_file)?;

    let previous = if only_values && encrypted_file.exists() {
        debug!(path = %encrypted_file.display(), "reusing payloads from previous encrypted file");
        Some(fs::read_to_string(&encrypted_file)?)
    } else {
        None
    };

    let policy = match &args.only {
        Some(csv) => SelectionPolicy::from_csv(csv, args.all),
        None => SelectionPolicy::new(config.only.iter().cloned(), args.all),
    };

    let transformed = encrypt_contents(&contents, previous.as_deref(), &encrypter, &policy, only_values)?;
    fs::write(&encrypted_file, &transformed.contents)?;

    info!(path = %encrypted_file.display(), %cipher, only_values, "environment encrypted");

    println!("Environment successfully encrypted.");
    if generated {
        println!("  Key ............ {}", format_key(&key));
    }
    println!("  Cipher ......... {cipher}");
    println!("  Encrypted file . {}", encrypted_file.display());
    if only_values {
        let summary = transformed.summary;
        println!(
            "  Values ......... {} encrypted, {} unchanged, {} left readable",
            summary.transformed,
            summary.reused,
            summary.safe_literals + summary.passed_through
        );
    }

    Ok(())
}
