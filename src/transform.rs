//! # Selective Transform Engine
//!
//! Encrypts or decrypts the values of an environment file line by line while
//! every other byte of the file stays as it was.
//!
//! ## Encryption
//!
//! For each line, in order:
//!
//! 1. No `=` in the line: pass through
//! 2. Key not selected by the [`SelectionPolicy`]: pass through
//! 3. Value is a safe literal (blank, `null`, `true`, `false`): pass through
//! 4. The previous encrypted file holds a payload for this key that decrypts
//!    to the same value: copy that payload forward
//! 5. Otherwise encrypt the value fresh
//!
//! Step 4 keeps version control diffs limited to values that actually changed,
//! since every fresh encryption uses a new IV.
//!
//! ## Decryption
//!
//! Every value that starts like an encrypted payload is decrypted. A payload
//! that fails to decrypt, including one that was truncated or mangled, aborts
//! the whole operation. Values that are not payloads (plain configuration,
//! safe literals) pass through.
//!
//! ## Whole-file Mode
//!
//! Without `only_values` the entire contents are one payload and the selection
//! policy is not consulted.

use crate::crypto::{Encrypter, Payload};
use crate::error::Result;
use crate::lines::{parse_lines, EnvLine};
use crate::policy::{is_safe_literal, SelectionPolicy};
use tracing::{debug, trace};

/// What happens to one line during selective encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformDecision {
    /// No `=` in the line, or the key is not selected.
    PassThrough,
    /// Selected key whose value is blank, `null`, `true` or `false`.
    SkipSafeLiteral,
    /// Payload from the previous encrypted file, copied forward unchanged.
    ReuseExisting(String),
    /// Encrypt (or decrypt) the value fresh.
    Transform,
}

/// Tally of decisions taken over one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub transformed: usize,
    pub reused: usize,
    pub safe_literals: usize,
    pub passed_through: usize,
}

impl Summary {
    fn record(&mut self, decision: &TransformDecision) {
        match decision {
            TransformDecision::PassThrough => self.passed_through += 1,
            TransformDecision::SkipSafeLiteral => self.safe_literals += 1,
            TransformDecision::ReuseExisting(_) => self.reused += 1,
            TransformDecision::Transform => self.transformed += 1,
        }
    }
}

/// Result of transforming a file's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub contents: String,
    pub summary: Summary,
}

/// Parsed view of a previously encrypted file, used to reuse payloads.
pub struct PreviousFile<'a> {
    lines: Vec<EnvLine<'a>>,
}

impl<'a> PreviousFile<'a> {
    pub fn parse(contents: &'a str) -> Self {
        let (_, lines) = parse_lines(contents);
        Self { lines }
    }

    /// Payload stored for `key` if it decrypts to exactly `current`.
    ///
    /// Only the first line with a matching key is considered. A value that
    /// fails to decrypt (a legacy plaintext, a safe literal) is not a match.
    pub fn find_reusable(&self, key: &str, current: &str, encrypter: &Encrypter) -> Option<&'a str> {
        let existing = self.lines.iter().find(|line| line.key() == Some(key))?.value()?;
        if existing.is_empty() {
            return None;
        }

        match encrypter.decrypt(existing) {
            Ok(plaintext) if plaintext == current => Some(existing),
            Ok(_) => None,
            Err(e) => {
                trace!(key, error = %e, "previous value not reusable");
                None
            }
        }
    }
}

/// Decide what selective encryption does with `line`.
pub fn decide(
    line: &EnvLine<'_>,
    policy: &SelectionPolicy,
    previous: Option<&PreviousFile<'_>>,
    encrypter: &Encrypter,
) -> TransformDecision {
    let Some((key, value)) = line.pair else {
        return TransformDecision::PassThrough;
    };
    if !policy.matches(key) {
        return TransformDecision::PassThrough;
    }
    if is_safe_literal(value) {
        return TransformDecision::SkipSafeLiteral;
    }
    match previous.and_then(|p| p.find_reusable(key, value, encrypter)) {
        Some(existing) => TransformDecision::ReuseExisting(existing.to_string()),
        None => TransformDecision::Transform,
    }
}

/// Encrypt the selected values of `contents`.
///
/// `previous` is the last encrypted version of the file, if any.
pub fn encrypt_values(
    contents: &str,
    previous: Option<&str>,
    encrypter: &Encrypter,
    policy: &SelectionPolicy,
) -> Result<Transformed> {
    let (ending, lines) = parse_lines(contents);
    let previous = previous.map(PreviousFile::parse);

    let mut summary = Summary::default();
    let mut output = Vec::with_capacity(lines.len());

    for line in &lines {
        let decision = decide(line, policy, previous.as_ref(), encrypter);
        trace!(
            key = line.key().unwrap_or_default(),
            decision = decision_kind(&decision),
            "line decided"
        );
        summary.record(&decision);

        output.push(match (&decision, line.value()) {
            (TransformDecision::ReuseExisting(payload), _) => line.with_value(payload),
            (TransformDecision::Transform, Some(value)) => line.with_value(&encrypter.encrypt(value)?),
            _ => line.raw.to_string(),
        });
    }

    debug!(
        encrypted = summary.transformed,
        reused = summary.reused,
        safe_literals = summary.safe_literals,
        passed_through = summary.passed_through,
        "selective encryption finished"
    );

    Ok(Transformed {
        contents: ending.join(&output),
        summary,
    })
}

/// Decrypt every encrypted value of `contents`.
pub fn decrypt_values(contents: &str, encrypter: &Encrypter) -> Result<Transformed> {
    let (ending, lines) = parse_lines(contents);

    let mut summary = Summary::default();
    let mut output = Vec::with_capacity(lines.len());

    for line in &lines {
        match line.value() {
            Some(value) if Payload::looks_encrypted(value) => {
                output.push(line.with_value(&encrypter.decrypt(value)?));
                summary.record(&TransformDecision::Transform);
            }
            _ => {
                output.push(line.raw.to_string());
                summary.record(&TransformDecision::PassThrough);
            }
        }
    }

    debug!(
        decrypted = summary.transformed,
        passed_through = summary.passed_through,
        "selective decryption finished"
    );

    Ok(Transformed {
        contents: ending.join(&output),
        summary,
    })
}

/// Encrypt a file, selectively when `only_values` is set, otherwise as one payload.
pub fn encrypt_contents(
    contents: &str,
    previous: Option<&str>,
    encrypter: &Encrypter,
    policy: &SelectionPolicy,
    only_values: bool,
) -> Result<Transformed> {
    if only_values {
        return encrypt_values(contents, previous, encrypter, policy);
    }

    Ok(Transformed {
        contents: encrypter.encrypt(contents)?,
        summary: Summary {
            transformed: 1,
            ..Summary::default()
        },
    })
}

/// Decrypt a file, selectively when `only_values` is set, otherwise as one payload.
pub fn decrypt_contents(contents: &str, encrypter: &Encrypter, only_values: bool) -> Result<Transformed> {
    if only_values {
        return decrypt_values(contents, encrypter);
    }

    Ok(Transformed {
        contents: encrypter.decrypt(contents)?,
        summary: Summary {
            transformed: 1,
            ..Summary::default()
        },
    })
}

fn decision_kind(decision: &TransformDecision) -> &'static str {
    match decision {
        TransformDecision::PassThrough => "pass-through",
        TransformDecision::SkipSafeLiteral => "safe-literal",
        TransformDecision::ReuseExisting(_) => "reuse",
        TransformDecision::Transform => "encrypt",
    }
}
