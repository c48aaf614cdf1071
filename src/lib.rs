//! # veil
//!
//! Selective encryption for environment files.
//!
//! Instead of turning a whole `.env` file into an opaque blob, `veil` can
//! encrypt only the values that are secrets (`*_KEY`, `*_SECRET`,
//! `*_PASSWORD`, `*_TOKEN`, ...) and leave everything else readable, so the
//! encrypted file can be committed and reviewed like any other config file.
//!
//! ## Quick Start
//!
//! ```bash
//! # Encrypt .env into .env.encrypted, secrets only
//! veil encrypt --only-values --key base64:...
//!
//! # Decrypt .env.production.encrypted into .env.production
//! veil decrypt --only-values --env production --key base64:...
//! ```
//!
//! Given
//!
//! ```text
//! APP_NAME=Laravel
//! APP_DEBUG=true
//! API_TOKEN=secret
//! ```
//!
//! `veil encrypt --only-values` writes
//!
//! ```text
//! APP_NAME=Laravel
//! APP_DEBUG=true
//! API_TOKEN=eyJpdiI6...
//! ```
//!
//! ## How It Works
//!
//! 1. **Selection**: a key is encrypted if it matches one of the `--only`
//!    patterns, or always with `--all`
//! 2. **Safe literals**: blank, `null`, `true` and `false` are never encrypted
//! 3. **Reuse**: when re-encrypting, values whose plaintext did not change keep
//!    their previous ciphertext, so diffs only show real changes
//! 4. **Line preservation**: comments, blank lines and the file's line endings
//!    are left exactly as they were
//!
//! Without `--only-values` the whole file is encrypted as one payload.
//!
//! ## Module Overview
//!
//! - [`lines`] - Line ending detection and `KEY=value` parsing
//! - [`policy`] - Glob selection policy and the safe literal filter
//! - [`crypto`] - AES-CBC/GCM payload encryption, key parsing
//! - [`transform`] - The selective encrypt/decrypt engine
//! - [`config`] - `.veil.toml` and environment defaults
//! - [`commands`] - The `encrypt` and `decrypt` commands
//! - [`error`] - Error types
//!
//! ## Compatibility
//!
//! Payloads use the same format as the Laravel encrypter, and the key is read
//! from `LARAVEL_ENV_ENCRYPTION_KEY` when `--key` is not given, so files can be
//! decrypted by `php artisan env:decrypt` and vice versa.

pub mod commands;
pub mod config;
pub mod crypto;
pub mod error;
pub mod lines;
pub mod policy;
pub mod transform;

pub use crypto::{Cipher, Encrypter};
pub use error::{Result, VeilError};
pub use policy::SelectionPolicy;
pub use transform::{decrypt_contents, encrypt_contents, TransformDecision, Transformed};
