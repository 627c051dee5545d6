use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use jobboard_core::{DomainError, DomainResult};

pub const DEFAULT_CURRENCY: &str = "INR";

/// A positive amount held in minor units (paise, cents).
///
/// Serialized as the major-unit decimal clients send and read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    minor: i64,
}

fn not_positive() -> DomainError {
    DomainError::validation("amount must be a positive number")
}

impl Amount {
    pub fn from_minor(minor: i64) -> DomainResult<Self> {
        if minor <= 0 {
            return Err(not_positive());
        }
        Ok(Self { minor })
    }

    /// `round(major × 100)`; must be finite and end up at least one minor unit.
    pub fn from_major(major: f64) -> DomainResult<Self> {
        if !major.is_finite() || major <= 0.0 {
            return Err(not_positive());
        }
        let minor = (major * 100.0).round();
        if minor < 1.0 || minor > i64::MAX as f64 {
            return Err(not_positive());
        }
        Self::from_minor(minor as i64)
    }

    /// Accept a JSON number or a numeric string.
    pub fn from_json(value: Option<&Value>) -> DomainResult<Self> {
        match value {
            Some(Value::Number(n)) => n.as_f64().ok_or_else(not_positive).and_then(Self::from_major),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| not_positive())
                .and_then(Self::from_major),
            _ => Err(not_positive()),
        }
    }

    pub fn minor(&self) -> i64 {
        self.minor
    }

    pub fn major(&self) -> f64 {
        self.minor as f64 / 100.0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.major())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        Amount::from_major(major).map_err(serde::de::Error::custom)
    }
}

/// ISO-4217-style three-letter currency code, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parse an optional code; absent or blank means [`DEFAULT_CURRENCY`].
    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        let raw = raw.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(DEFAULT_CURRENCY);
        if raw.len() != 3 || !raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation("currency must be a 3-letter code"));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self(DEFAULT_CURRENCY.to_string())
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
