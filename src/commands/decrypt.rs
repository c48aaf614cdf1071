use super::{encrypted_path, environment_file_name, resolve_cipher, ENCRYPTED_SUFFIX};
use crate::config::load_config;
use crate::crypto::{parse_key, Encrypter};
use crate::error::{Result, VeilError};
use crate::transform::decrypt_contents;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options of the `decrypt` command.
#[derive(Debug, Clone, Default)]
pub struct DecryptArgs {
    pub key: Option<String>,
    pub cipher: Option<String>,
    pub env: Option<String>,
    pub force: bool,
    pub path: Option<PathBuf>,
    pub filename: Option<String>,
    /// `None` defers to the configuration.
    pub only_values: Option<bool>,
}

/// Where the decrypted file is written: `<path>/<filename>`, defaulting to
/// the environment file itself.
pub fn output_path(base_dir: &Path, args: &DecryptArgs) -> PathBuf {
    let dir = args.path.clone().unwrap_or_else(|| base_dir.to_path_buf());
    let name = match &args.filename {
        Some(name) => name.trim_start_matches(['/', '\\']).to_string(),
        None => environment_file_name(args.env.as_deref()),
    };
    dir.join(name)
}

/// Decrypt `.env[.<env>].encrypted` under `base_dir`
pub fn decrypt(base_dir: &Path, args: &DecryptArgs) -> Result<()> {
    let key = args
        .key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or(VeilError::MissingKey)?;
    let key = parse_key(key)?;

    let output_file = output_path(base_dir, args);
    if output_file.to_string_lossy().ends_with(ENCRYPTED_SUFFIX) {
        return Err(VeilError::InvalidOutputFilename(output_file));
    }

    let config = load_config(base_dir)?;
    let cipher = resolve_cipher(args.cipher.as_deref(), &config)?;
    let only_values = args.only_values.unwrap_or(config.only_values);

    let encrypted_file = encrypted_path(&base_dir.join(environment_file_name(args.env.as_deref())));
    if !encrypted_file.exists() {
        return Err(VeilError::EncryptedFileNotFound(encrypted_file));
    }
    if output_file.exists() && !args.force {
        return Err(VeilError::OutputExists(output_file));
    }

    let encrypter = Encrypter::new(&key, cipher)?;
    let contents = fs::read_to_string(&encrypted_file)?;

    let transformed = decrypt_contents(&contents, &encrypter, only_values)?;
    fs::write(&output_file, &transformed.contents)?;

    info!(path = %output_file.display(), %cipher, only_values, "environment decrypted");

    println!("Environment successfully decrypted.");
    println!("  Decrypted file . {}", output_file.display());
    if only_values {
        println!("  Values ......... {} decrypted", transformed.summary.transformed);
    }

    Ok(())
}
