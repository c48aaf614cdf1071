//! # Integration Tests
//!
//! End-to-end runs of the `veil` binary against temporary directories.
//!
//! ## Test Coverage
//!
//! - Selective encryption of matching keys
//! - Reuse of unchanged ciphertext on re-encryption
//! - Safe literal exemption
//! - Selective and whole-file decryption
//! - Error reporting and exit codes
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test integration_test
//! ```

mod common;

use common::{create_env_dir, encrypter, value_of, veil_cmd, KEY};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_encrypts_the_secrets_of_an_environment() {
    let contents = "APP_KEY=1234\nAPP_NAME=Laravel\nAPP_ENV=local\nAPP_DEBUG=true\nAPP_URL=http://localhost\nAPI_TOKEN=secret\n";
    let temp = create_env_dir(contents);

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--only-values"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment successfully encrypted."));

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    let e = encrypter();
    assert_eq!(e.decrypt(value_of(&written, "APP_KEY")).unwrap(), "1234");
    assert_eq!(e.decrypt(value_of(&written, "API_TOKEN")).unwrap(), "secret");
    for line in ["APP_NAME=Laravel\n", "APP_ENV=local\n", "APP_DEBUG=true\n", "APP_URL=http://localhost\n"] {
        assert!(written.contains(line), "{line:?} missing");
    }
    assert!(written.ends_with('\n'));
}

#[test]
fn test_prevents_rotating_unchanged_secrets() {
    let e = encrypter();
    let app_key = e.encrypt("1234").unwrap();
    let api_token = e.encrypt("secret").unwrap();
    let changed = e.encrypt("secret-1").unwrap();

    let temp = create_env_dir(
        "APP_KEY=1234\nAPP_NAME=Laravel\nAPI_TOKEN=secret\nNEW_SECRET=newvalue\nCHANGED_SECRET=secret-2\n",
    );
    fs::write(
        temp.path().join(".env.encrypted"),
        format!("APP_KEY={app_key}\nAPI_TOKEN={api_token}\nCHANGED_SECRET={changed}"),
    )
    .unwrap();

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--only-values", "--force"])
        .current_dir(temp.path())
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert_eq!(value_of(&written, "APP_KEY"), app_key);
    assert_eq!(value_of(&written, "API_TOKEN"), api_token);
    assert_ne!(value_of(&written, "CHANGED_SECRET"), changed);
    assert_eq!(e.decrypt(value_of(&written, "CHANGED_SECRET")).unwrap(), "secret-2");
    assert_eq!(e.decrypt(value_of(&written, "NEW_SECRET")).unwrap(), "newvalue");
    assert!(written.contains("APP_NAME=Laravel\n"));
}

#[test]
fn test_does_not_encrypt_known_safe_values() {
    let temp = create_env_dir(
        "APP_KEY=null\nOTHER_SECRET=true\nAPI_PASSWORD=false\nAPP_ONE_KEY=1\nAPP_ZERO_KEY=0\nAPI_TOKEN=\nAPP_NAME=Laravel",
    );

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--only-values"])
        .current_dir(temp.path())
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    for line in ["APP_KEY=null\n", "OTHER_SECRET=true\n", "API_PASSWORD=false\n", "API_TOKEN=\n"] {
        assert!(written.contains(line), "{line:?} missing");
    }
    assert!(written.ends_with("APP_NAME=Laravel"));
    let e = encrypter();
    assert_eq!(e.decrypt(value_of(&written, "APP_ONE_KEY")).unwrap(), "1");
    assert_eq!(e.decrypt(value_of(&written, "APP_ZERO_KEY")).unwrap(), "0");
}

#[test]
fn test_only_patterns_and_all_flag() {
    let temp = create_env_dir("API_TOKEN=secret\nDB_HOST=db\nAPP_NAME=Laravel");

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--only-values", "--only", "DB_*"])
        .current_dir(temp.path())
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert!(written.starts_with("API_TOKEN=secret\n"));
    assert_eq!(encrypter().decrypt(value_of(&written, "DB_HOST")).unwrap(), "db");

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--only-values", "--only", "DB_*", "--all", "--force"])
        .current_dir(temp.path())
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert_eq!(encrypter().decrypt(value_of(&written, "APP_NAME")).unwrap(), "Laravel");
    assert_eq!(encrypter().decrypt(value_of(&written, "API_TOKEN")).unwrap(), "secret");
}

#[test]
fn test_decrypts_an_environment_where_only_secrets_are_encrypted() {
    let temp = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let encrypted = format!(
        "APP_NAME=Laravel\nAPP_ENV=local\nAPP_DEBUG=true\nAPP_URL=http://localhost\nAPP_KEY={}",
        encrypter().encrypt("1234").unwrap()
    );
    fs::write(temp.path().join(".env.production.encrypted"), encrypted).unwrap();

    veil_cmd()
        .args(["decrypt", "--env", "production", "--key", KEY, "--filename", ".env", "--only-values"])
        .arg("--path")
        .arg(out.path())
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment successfully decrypted."));

    assert_eq!(
        fs::read_to_string(out.path().join(".env")).unwrap(),
        "APP_NAME=Laravel\nAPP_ENV=local\nAPP_DEBUG=true\nAPP_URL=http://localhost\nAPP_KEY=1234"
    );
}

#[test]
fn test_selective_round_trip_through_cli() {
    let contents = "# App\r\nAPP_NAME=Laravel\r\nAPP_KEY=base64:Zm9vYmFy=\r\n\r\nDB_PASSWORD=p@ss=word\r\nDB_PORT=3306\r\n";
    let temp = create_env_dir(contents);

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--only-values"])
        .current_dir(temp.path())
        .assert()
        .success();

    let encrypted = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert!(encrypted.contains("# App\r\nAPP_NAME=Laravel\r\n"));
    assert!(encrypted.contains("DB_PORT=3306\r\n"));
    assert!(!encrypted.contains("p@ss=word"));

    fs::remove_file(temp.path().join(".env")).unwrap();

    veil_cmd()
        .args(["decrypt", "--key", KEY, "--only-values"])
        .current_dir(temp.path())
        .assert()
        .success();

    assert_eq!(fs::read_to_string(temp.path().join(".env")).unwrap(), contents);
}

#[test]
fn test_whole_file_round_trip_ignores_patterns() {
    let contents = "APP_NAME=Laravel\nAPP_KEY=1234\n";
    let temp = create_env_dir(contents);

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--only", "NOTHING"])
        .current_dir(temp.path())
        .assert()
        .success();

    let encrypted = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert!(!encrypted.contains("APP_NAME"));
    assert_eq!(encrypter().decrypt(&encrypted).unwrap(), contents);

    veil_cmd()
        .args(["decrypt", "--key", KEY, "--force"])
        .current_dir(temp.path())
        .assert()
        .success();

    assert_eq!(fs::read_to_string(temp.path().join(".env")).unwrap(), contents);
}

#[test]
fn test_key_from_environment_variable() {
    let temp = create_env_dir("API_TOKEN=secret");

    veil_cmd()
        .env("LARAVEL_ENV_ENCRYPTION_KEY", KEY)
        .args(["encrypt", "--only-values"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Key").not());

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert_eq!(encrypter().decrypt(value_of(&written, "API_TOKEN")).unwrap(), "secret");
}

#[test]
fn test_generated_key_is_reported_and_usable() {
    let temp = create_env_dir("API_TOKEN=secret");

    let output = veil_cmd()
        .args(["encrypt", "--only-values"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let key = stdout
        .lines()
        .find_map(|l| l.split_whitespace().find(|w| w.starts_with("base64:")))
        .expect("generated key printed")
        .to_string();

    veil_cmd()
        .args(["decrypt", "--only-values", "--filename", ".env.out", "--key", &key])
        .current_dir(temp.path())
        .assert()
        .success();

    assert_eq!(fs::read_to_string(temp.path().join(".env.out")).unwrap(), "API_TOKEN=secret");
}

#[test]
fn test_gcm_cipher_round_trip() {
    let temp = create_env_dir("API_TOKEN=secret\nAPP_NAME=Laravel");
    let key = "base64:AAECAwQFBgcICQoLDA0ODw==";

    veil_cmd()
        .args(["encrypt", "--cipher", "AES-128-GCM", "--only-values", "--key", key])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("AES-128-GCM"));

    veil_cmd()
        .args(["decrypt", "--cipher", "aes-128-gcm", "--only-values", "--filename", ".env.copy", "--key", key])
        .current_dir(temp.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join(".env.copy")).unwrap(),
        "API_TOKEN=secret\nAPP_NAME=Laravel"
    );
}

#[test]
fn test_config_file_supplies_defaults() {
    let temp = create_env_dir("DB_HOST=db\nAPI_TOKEN=secret");
    fs::write(
        temp.path().join(".veil.toml"),
        "only = [\"DB_*\"]\nonly_values = true\n",
    )
    .unwrap();

    veil_cmd()
        .args(["encrypt", "--key", KEY])
        .current_dir(temp.path())
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert!(written.ends_with("\nAPI_TOKEN=secret"));
    assert_eq!(encrypter().decrypt(value_of(&written, "DB_HOST")).unwrap(), "db");
}

#[test]
fn test_no_only_values_overrides_config_file() {
    let temp = create_env_dir("DB_HOST=db\nAPI_TOKEN=secret");
    fs::write(temp.path().join(".veil.toml"), "only_values = true\n").unwrap();

    veil_cmd()
        .args(["encrypt", "--key", KEY, "--no-only-values"])
        .current_dir(temp.path())
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join(".env.encrypted")).unwrap();
    assert!(!written.contains("DB_HOST"));

    veil_cmd()
        .args(["decrypt", "--key", KEY, "--no-only-values", "--filename", ".env.out"])
        .current_dir(temp.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join(".env.out")).unwrap(),
        "DB_HOST=db\nAPI_TOKEN=secret"
    );
}

#[test]
fn test_encrypt_without_environment_file_fails() {
    let temp = tempfile::TempDir::new().unwrap();

    veil_cmd()
        .args(["encrypt", "--key", KEY])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Environment file not found"));
}

#[test]
fn test_encrypt_refuses_to_overwrite_without_force() {
    let temp = create_env_dir("APP_KEY=1234");
    fs::write(temp.path().join(".env.encrypted"), "existing").unwrap();

    veil_cmd()
        .args(["encrypt", "--key", KEY])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(temp.path().join(".env.encrypted")).unwrap(), "existing");
}

#[test]
fn test_decrypt_requires_key() {
    let temp = tempfile::TempDir::new().unwrap();

    veil_cmd()
        .arg("decrypt")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("A decryption key is required"));
}
