use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeilError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("A decryption key is required")]
    MissingKey,

    #[error("Environment file not found: {}", .0.display())]
    InputFileNotFound(PathBuf),

    #[error("Encrypted environment file not found: {}", .0.display())]
    EncryptedFileNotFound(PathBuf),

    #[error("Output file already exists: {} (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    #[error("Invalid filename: {}", .0.display())]
    InvalidOutputFilename(PathBuf),

    #[error("Could not decrypt: {0}")]
    Decryption(String),

    #[error("Could not encrypt: {0}")]
    Encryption(String),

    #[error("Unsupported cipher or incorrect key length for {0}. Supported ciphers are: aes-128-cbc, aes-256-cbc, aes-128-gcm, aes-256-gcm")]
    UnsupportedCipher(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VeilError>;
