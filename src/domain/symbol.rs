// ============================================================================
// Symbol Value Object
// ============================================================================

use crate::error::{ExchangeError, ExchangeResult};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longest ticker accepted unless configured otherwise
pub const DEFAULT_MAX_SYMBOL_LEN: usize = 10;

/// Normalized (uppercase) ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Symbol(String);

impl Symbol {
    /// Validate and normalize with the default length bound.
    pub fn new(raw: &str) -> ExchangeResult<Self> {
        Self::parse(raw, DEFAULT_MAX_SYMBOL_LEN)
    }

    /// Uppercase `raw` and require `1..=max_len` characters.
    ///
    /// The bound applies to the normalized form, since uppercasing can
    /// lengthen a string (`ß` becomes `SS`).
    pub fn parse(raw: &str, max_len: usize) -> ExchangeResult<Self> {
        let normalized = raw.to_uppercase();
        let len = normalized.chars().count();
        if len == 0 || len > max_len {
            return Err(ExchangeError::validation(format!(
                "symbol must be between 1 and {} characters",
                max_len
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ExchangeError;

    fn try_from(raw: String) -> ExchangeResult<Self> {
        Self::new(&raw)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
