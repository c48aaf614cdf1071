//! # Line Handling
//!
//! Environment files are processed line by line. This module detects the
//! file's line terminator, splits and rejoins contents without losing a single
//! byte, and parses each line into an optional `KEY=value` pair.
//!
//! ## Line Endings
//!
//! A file is treated as CRLF if `\r\n` occurs anywhere in it, otherwise LF.
//! Splitting always uses the detected terminator, so a CRLF file never leaks a
//! trailing `\r` into its values.
//!
//! ## Parsing
//!
//! ```text
//! APP_KEY=base64:abc=    key = "APP_KEY", value = "base64:abc="
//! # comment              no key, passed through
//! EMPTY=                 key = "EMPTY",   value = ""
//! ```

/// Line terminator used by a whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the terminator of `contents`: CRLF if present anywhere, else LF.
    pub fn detect(contents: &str) -> Self {
        if contents.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Split `contents` on this terminator.
    ///
    /// A trailing terminator yields a final empty line, so [`LineEnding::join`]
    /// restores it.
    pub fn split<'a>(&self, contents: &'a str) -> Vec<&'a str> {
        contents.split(self.as_str()).collect()
    }

    pub fn join<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push_str(self.as_str());
            }
            out.push_str(line.as_ref());
        }
        out
    }
}

/// One line of an environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLine<'a> {
    pub raw: &'a str,
    pub pair: Option<(&'a str, &'a str)>,
}

impl<'a> EnvLine<'a> {
    /// Split `raw` at the first `=`. Lines without `=` carry no pair.
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            pair: raw.split_once('='),
        }
    }

    pub fn key(&self) -> Option<&'a str> {
        self.pair.map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&'a str> {
        self.pair.map(|(_, value)| value)
    }

    /// Rebuild the line with `value` in place of the current one.
    pub fn with_value(&self, value: &str) -> String {
        match self.key() {
            Some(key) => format!("{key}={value}"),
            None => self.raw.to_string(),
        }
    }
}

/// Detect the terminator and parse every line of `contents`.
pub fn parse_lines(contents: &str) -> (LineEnding, Vec<EnvLine<'_>>) {
    let ending = LineEnding::detect(contents);
    let lines = ending.split(contents).into_iter().map(EnvLine::parse).collect();
    (ending, lines)
}
