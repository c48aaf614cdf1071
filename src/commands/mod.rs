pub mod decrypt;
pub mod encrypt;

pub use decrypt::{decrypt, DecryptArgs};
pub use encrypt::{encrypt, EncryptArgs};

use crate::config::VeilConfig;
use crate::crypto::Cipher;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Suffix appended to an environment file name for its encrypted form.
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";

/// Name of the environment file: `.env` or `.env.<environment>`.
pub fn environment_file_name(environment: Option<&str>) -> String {
    match environment {
        Some(env) => format!(".env.{env}"),
        None => ".env".to_string(),
    }
}

/// Path of the encrypted counterpart of `environment_file`.
pub fn encrypted_path(environment_file: &Path) -> PathBuf {
    let mut path = environment_file.as_os_str().to_owned();
    path.push(ENCRYPTED_SUFFIX);
    PathBuf::from(path)
}

/// `--cipher` if given, else the configured cipher.
fn resolve_cipher(cipher: Option<&str>, config: &VeilConfig) -> Result<Cipher> {
    match cipher {
        Some(name) => name.parse(),
        None => config.cipher(),
    }
}
