use serde::{Serialize, Serializer};
use std::fmt;

const BODY_LEN: usize = 8;
const MIN_SIGNIFICANT_DIGITS: usize = 2;

/// A well-formed `NNNNNNNN-C` Common Procurement Vocabulary code.
///
/// Only the 8-digit body takes part in matching; the check digit is kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpvCode {
    body: [u8; BODY_LEN],
    check_digit: u8,
}

impl CpvCode {
    /// Parse user input, trimming surrounding whitespace. Anything that is not
    /// exactly eight digits, a hyphen, and one digit yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let bytes = raw.trim().as_bytes();
        if bytes.len() != BODY_LEN + 2 || bytes[BODY_LEN] != b'-' {
            return None;
        }

        let mut body = [0u8; BODY_LEN];
        for (slot, byte) in body.iter_mut().zip(&bytes[..BODY_LEN]) {
            if !byte.is_ascii_digit() {
                return None;
            }
            *slot = *byte;
        }

        let check_digit = bytes[BODY_LEN + 1];
        if !check_digit.is_ascii_digit() {
            return None;
        }

        Some(Self { body, check_digit })
    }

    /// The 8-digit body that participates in matching.
    pub fn body(&self) -> &str {
        // body only ever holds ASCII digits
        std::str::from_utf8(&self.body).unwrap_or_default()
    }

    pub fn check_digit(&self) -> char {
        char::from(self.check_digit)
    }
}

impl fmt::Display for CpvCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body(), self.check_digit())
    }
}

impl Serialize for CpvCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Body with trailing zeros stripped, never shorter than the division.
pub(crate) fn significant_prefix(body: &str) -> &str {
    let trimmed = body.trim_end_matches('0');
    if trimmed.len() < MIN_SIGNIFICANT_DIGITS {
        &body[..MIN_SIGNIFICANT_DIGITS.min(body.len())]
    } else {
        trimmed
    }
}

/// Prefix-with-wildcards pattern used by mapping rules.
///
/// Accepts an 8-digit body (optionally followed by `-C`) whose trailing zeros act as
/// wildcards, or an explicit prefix of 2 to 8 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CpvPattern {
    prefix: String,
}

impl CpvPattern {
    pub fn parse(raw: &str) -> Result<Self, InvalidPattern> {
        let trimmed = raw.trim();
        let digits = match trimmed.split_once('-') {
            Some((body, check))
                if body.len() == BODY_LEN
                    && check.len() == 1
                    && check.bytes().all(|b| b.is_ascii_digit()) =>
            {
                body
            }
            Some(_) => return Err(InvalidPattern(trimmed.to_string())),
            None => trimmed,
        };

        if digits.len() < MIN_SIGNIFICANT_DIGITS
            || digits.len() > BODY_LEN
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(InvalidPattern(trimmed.to_string()));
        }

        let prefix = if digits.len() == BODY_LEN {
            significant_prefix(digits).to_string()
        } else {
            digits.to_string()
        };

        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of significant digits; larger means more specific.
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }

    pub fn matches(&self, code: &CpvCode) -> bool {
        code.body().starts_with(&self.prefix)
    }
}

impl fmt::Display for CpvPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0<width$}", self.prefix, width = BODY_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a CPV pattern (expected 2-8 digits or NNNNNNNN[-C])")]
pub struct InvalidPattern(pub String);
