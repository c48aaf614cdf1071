//! # Cryptographic Operations
//!
//! Encrypts and decrypts single strings into a self-describing text payload.
//! The payload is compatible with the Laravel encrypter, so files written by
//! either tool can be read by the other.
//!
//! ## Ciphers
//!
//! | Identifier    | Key size | IV size | Authentication        |
//! |---------------|----------|---------|-----------------------|
//! | `AES-128-CBC` | 16 bytes | 16      | HMAC-SHA256 (`mac`)   |
//! | `AES-256-CBC` | 32 bytes | 16      | HMAC-SHA256 (`mac`)   |
//! | `AES-128-GCM` | 16 bytes | 12      | GCM tag (`tag`)       |
//! | `AES-256-GCM` | 32 bytes | 12      | GCM tag (`tag`)       |
//!
//! ## Payload Format
//!
//! ```text
//! base64({"iv":"<b64>","value":"<b64>","mac":"<hex>","tag":"<b64>"})
//! ```
//!
//! For CBC the MAC is `HMAC-SHA256(key, iv_b64 || value_b64)` and the tag is
//! empty. For GCM the MAC is empty and the tag holds the 16-byte GCM tag.
//!
//! The plaintext is wrapped as a PHP serialized string (`s:5:"hello";`)
//! before encryption. Decryption unwraps it when present.
//!
//! ## Security Properties
//!
//! - A fresh random IV for every call, so equal plaintexts never produce equal payloads
//! - MAC verified in constant time before any CBC decryption
//! - Key bytes are zeroed on drop

use crate::error::{Result, VeilError};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

pub const CBC_IV_SIZE: usize = 16;
pub const GCM_NONCE_SIZE: usize = 12;
pub const GCM_TAG_SIZE: usize = 16;

/// Prefix marking a key given as base64 rather than raw bytes.
pub const BASE64_KEY_PREFIX: &str = "base64:";

/// Base64 of `{"iv":`, the start of every encoded payload.
pub const PAYLOAD_PREFIX: &str = "eyJpdiI6";

/// Supported symmetric ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cipher {
    Aes128Cbc,
    #[default]
    Aes256Cbc,
    Aes128Gcm,
    Aes256Gcm,
}

impl Cipher {
    pub fn key_size(&self) -> usize {
        match self {
            Cipher::Aes128Cbc | Cipher::Aes128Gcm => 16,
            Cipher::Aes256Cbc | Cipher::Aes256Gcm => 32,
        }
    }

    pub fn iv_size(&self) -> usize {
        if self.is_aead() {
            GCM_NONCE_SIZE
        } else {
            CBC_IV_SIZE
        }
    }

    pub fn is_aead(&self) -> bool {
        matches!(self, Cipher::Aes128Gcm | Cipher::Aes256Gcm)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cipher::Aes128Cbc => "AES-128-CBC",
            Cipher::Aes256Cbc => "AES-256-CBC",
            Cipher::Aes128Gcm => "AES-128-GCM",
            Cipher::Aes256Gcm => "AES-256-GCM",
        }
    }

    /// Generate a random key of the right size for this cipher
    pub fn generate_key(&self) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; self.key_size()]);
        OsRng.fill_bytes(&mut key);
        key
    }
}

impl FromStr for Cipher {
    type Err = VeilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aes-128-cbc" => Ok(Cipher::Aes128Cbc),
            "aes-256-cbc" => Ok(Cipher::Aes256Cbc),
            "aes-128-gcm" => Ok(Cipher::Aes128Gcm),
            "aes-256-gcm" => Ok(Cipher::Aes256Gcm),
            _ => Err(VeilError::UnsupportedCipher(s.to_string())),
        }
    }
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode a key given on the command line: `base64:<data>` or raw bytes.
pub fn parse_key(key: &str) -> Result<Zeroizing<Vec<u8>>> {
    match key.strip_prefix(BASE64_KEY_PREFIX) {
        Some(encoded) => STANDARD
            .decode(encoded)
            .map(Zeroizing::new)
            .map_err(|e| VeilError::InvalidKey(e.to_string())),
        None => Ok(Zeroizing::new(key.as_bytes().to_vec())),
    }
}

/// Render key bytes in the `base64:` form accepted by [`parse_key`].
pub fn format_key(key: &[u8]) -> String {
    format!("{BASE64_KEY_PREFIX}{}", STANDARD.encode(key))
}

/// Wire form of an encrypted value, before the outer base64.
#[derive(Debug, Serialize, Deserialize)]
pub struct Payload {
    pub iv: String,
    pub value: String,
    pub mac: String,
    #[serde(default)]
    pub tag: String,
}

impl Payload {
    /// Parse an encoded payload without decrypting it.
    pub fn decode(encoded: &str) -> Result<Self> {
        let json = STANDARD
            .decode(encoded.trim())
            .map_err(|_| VeilError::Decryption("The payload is invalid.".into()))?;
        serde_json::from_slice(&json)
            .map_err(|_| VeilError::Decryption("The payload is invalid.".into()))
    }

    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| VeilError::Encryption(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    /// Whether `value` claims to be an encrypted payload.
    ///
    /// Only the prefix is checked, so a truncated or damaged payload still
    /// counts and fails later in [`Encrypter::decrypt`].
    pub fn looks_encrypted(value: &str) -> bool {
        value.trim().starts_with(PAYLOAD_PREFIX)
    }
}

/// Symmetric encrypter bound to one key and cipher for a whole invocation.
pub struct Encrypter {
    key: Zeroizing<Vec<u8>>,
    cipher: Cipher,
}

impl Encrypter {
    pub fn new(key: &[u8], cipher: Cipher) -> Result<Self> {
        if key.len() != cipher.key_size() {
            return Err(VeilError::UnsupportedCipher(cipher.name().to_string()));
        }
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
            cipher,
        })
    }

    pub fn cipher(&self) -> Cipher {
        self.cipher
    }

    /// Encrypt a string into an encoded payload.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let serialized = serialize_string(plaintext);

        let mut iv = vec![0u8; self.cipher.iv_size()];
        OsRng.fill_bytes(&mut iv);

        let payload = if self.cipher.is_aead() {
            let mut sealed = self.gcm_encrypt(&iv, serialized.as_bytes())?;
            let tag = sealed.split_off(sealed.len() - GCM_TAG_SIZE);
            Payload {
                iv: STANDARD.encode(&iv),
                value: STANDARD.encode(&sealed),
                mac: String::new(),
                tag: STANDARD.encode(tag),
            }
        } else {
            let ciphertext = self.cbc_encrypt(&iv, serialized.as_bytes())?;
            let iv = STANDARD.encode(&iv);
            let value = STANDARD.encode(ciphertext);
            let mac = self.mac(&iv, &value)?;
            Payload {
                iv,
                value,
                mac,
                tag: String::new(),
            }
        };

        payload.encode()
    }

    /// Decrypt an encoded payload back into a string.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let payload = Payload::decode(encoded)?;

        let iv = STANDARD
            .decode(&payload.iv)
            .map_err(|_| VeilError::Decryption("The payload is invalid.".into()))?;
        if iv.len() != self.cipher.iv_size() {
            return Err(VeilError::Decryption("The payload is invalid.".into()));
        }
        let value = STANDARD
            .decode(&payload.value)
            .map_err(|_| VeilError::Decryption("The payload is invalid.".into()))?;

        let plaintext = if self.cipher.is_aead() {
            let tag = STANDARD
                .decode(&payload.tag)
                .map_err(|_| VeilError::Decryption("Could not decrypt the data.".into()))?;
            if tag.len() != GCM_TAG_SIZE {
                return Err(VeilError::Decryption("Could not decrypt the data.".into()));
            }
            let mut sealed = value;
            sealed.extend_from_slice(&tag);
            self.gcm_decrypt(&iv, &sealed)?
        } else {
            self.verify_mac(&payload)?;
            self.cbc_decrypt(&iv, &value)?
        };

        let plaintext = String::from_utf8(plaintext)
            .map_err(|_| VeilError::Decryption("Decrypted data is not valid UTF-8.".into()))?;

        Ok(match unserialize_string(&plaintext) {
            Some(inner) => inner.to_string(),
            None => plaintext,
        })
    }

    fn mac(&self, iv: &str, value: &str) -> Result<String> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .map_err(|e| VeilError::Encryption(e.to_string()))?;
        mac.update(iv.as_bytes());
        mac.update(value.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn verify_mac(&self, payload: &Payload) -> Result<()> {
        let expected =
            hex::decode(&payload.mac).map_err(|_| VeilError::Decryption("The MAC is invalid.".into()))?;
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .map_err(|e| VeilError::Decryption(e.to_string()))?;
        mac.update(payload.iv.as_bytes());
        mac.update(payload.value.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| VeilError::Decryption("The MAC is invalid.".into()))
    }

    fn cbc_encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let err = |e: aes::cipher::InvalidLength| VeilError::Encryption(e.to_string());
        Ok(match self.cipher {
            Cipher::Aes128Cbc => cbc::Encryptor::<aes::Aes128>::new_from_slices(&self.key, iv)
                .map_err(err)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            _ => cbc::Encryptor::<aes::Aes256>::new_from_slices(&self.key, iv)
                .map_err(err)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        })
    }

    fn cbc_decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let err = |e: aes::cipher::InvalidLength| VeilError::Decryption(e.to_string());
        let unpadded = match self.cipher {
            Cipher::Aes128Cbc => cbc::Decryptor::<aes::Aes128>::new_from_slices(&self.key, iv)
                .map_err(err)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            _ => cbc::Decryptor::<aes::Aes256>::new_from_slices(&self.key, iv)
                .map_err(err)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        };
        unpadded.map_err(|_| VeilError::Decryption("Could not decrypt the data.".into()))
    }

    fn gcm_encrypt(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Nonce::from_slice(nonce);
        let sealed = match self.cipher {
            Cipher::Aes128Gcm => Aes128Gcm::new_from_slice(&self.key)
                .map_err(|e| VeilError::Encryption(e.to_string()))?
                .encrypt(nonce, plaintext),
            _ => Aes256Gcm::new_from_slice(&self.key)
                .map_err(|e| VeilError::Encryption(e.to_string()))?
                .encrypt(nonce, plaintext),
        };
        sealed.map_err(|e| VeilError::Encryption(e.to_string()))
    }

    fn gcm_decrypt(&self, nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
        let nonce = Nonce::from_slice(nonce);
        let opened = match self.cipher {
            Cipher::Aes128Gcm => Aes128Gcm::new_from_slice(&self.key)
                .map_err(|e| VeilError::Decryption(e.to_string()))?
                .decrypt(nonce, sealed),
            _ => Aes256Gcm::new_from_slice(&self.key)
                .map_err(|e| VeilError::Decryption(e.to_string()))?
                .decrypt(nonce, sealed),
        };
        opened.map_err(|_| VeilError::Decryption("Could not decrypt the data.".into()))
    }
}

/// PHP string serialization: `s:<byte length>:"<bytes>";`
fn serialize_string(value: &str) -> String {
    format!("s:{}:\"{}\";", value.len(), value)
}

fn unserialize_string(serialized: &str) -> Option<&str> {
    let rest = serialized.strip_prefix("s:")?;
    let (len, rest) = rest.split_once(':')?;
    let len: usize = len.parse().ok()?;
    let body = rest.strip_prefix('"')?.strip_suffix("\";")?;
    (body.len() == len).then_some(body)
}
