use assert_cmd::{cargo::cargo_bin_cmd, Command};
use tempfile::TempDir;
use veil::{Cipher, Encrypter};

/// 32-byte raw key accepted by AES-256-CBC.
#[allow(dead_code)]
pub const KEY: &str = "abcdefghijklmnopabcdefghijklmnop";

/// Create a working directory holding `.env` with `contents`.
#[allow(dead_code)]
pub fn create_env_dir(contents: &str) -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp.path().join(".env"), contents).expect("failed to write .env");
    temp
}

/// Convenience helper for spawning the veil binary via assert_cmd, isolated
/// from the caller's environment.
#[allow(dead_code)]
pub fn veil_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("veil");
    cmd.env_remove("LARAVEL_ENV_ENCRYPTION_KEY")
        .env_remove("VEIL_CIPHER")
        .env_remove("VEIL_ONLY")
        .env_remove("VEIL_ONLY_VALUES")
        .env_remove("VEIL_LOG");
    cmd
}

#[allow(dead_code)]
pub fn encrypter() -> Encrypter {
    Encrypter::new(KEY.as_bytes(), Cipher::Aes256Cbc).expect("valid test key")
}

/// Value of `key` in `contents`, as written after the first `=`.
#[allow(dead_code)]
pub fn value_of<'a>(contents: &'a str, key: &str) -> &'a str {
    contents
        .lines()
        .find_map(|line| line.strip_prefix(key).and_then(|rest| rest.strip_prefix('=')))
        .unwrap_or_else(|| panic!("{key} not found in {contents:?}"))
}
