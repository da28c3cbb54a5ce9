//! Identifier types for exchange entities
//!
//! Order ids are dense u64 counters assigned by the exchange in acceptance
//! order, so they double as a global ordering of accepted orders and fit
//! directly into the wire protocol's integer OrderID field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an order
///
/// Assigned by the exchange from a monotonically increasing counter
/// starting at 0. Ids are never reused within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Create from a raw integer (wire decode, tests)
    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw integer value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instrument identifier (ticker)
///
/// Opaque non-empty string, e.g. "AAPL".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol from a string
    ///
    /// # Panics
    /// Panics if the ticker is empty
    pub fn new(ticker: impl Into<String>) -> Self {
        let s = ticker.into();
        assert!(!s.is_empty(), "Symbol must be non-empty");
        Self(s)
    }

    /// Try to create a Symbol, returning None if empty
    pub fn try_new(ticker: impl Into<String>) -> Option<Self> {
        let s = ticker.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Get the ticker string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
