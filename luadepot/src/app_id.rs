//! Application identifier parsing.
//!
//! Every installable bundle is keyed by a numeric application id. Callers on
//! the RPC boundary hand ids over as JSON numbers or strings, so parsing is
//! strict: anything that is not a plain unsigned integer is rejected up front
//! and never reaches the background install machinery.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric key identifying one installable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(u32);

/// Rejected identifier input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid appid: {input:?}")]
pub struct InvalidAppId {
    /// The raw input as received.
    pub input: String,
}

impl AppId {
    /// Create an id from a raw integer.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw integer value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Parse an id from a JSON value (number or numeric string).
    pub fn from_json(value: &serde_json::Value) -> Result<Self, InvalidAppId> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Self)
                .ok_or_else(|| InvalidAppId {
                    input: n.to_string(),
                }),
            serde_json::Value::String(s) => s.parse(),
            other => Err(InvalidAppId {
                input: other.to_string(),
            }),
        }
    }

    /// File name of the primary script for this id (`<id>.lua`).
    pub fn script_filename(self) -> String {
        format!("{}.lua", self.0)
    }

    /// File name of the disabled script variant (`<id>.lua.disabled`).
    pub fn disabled_script_filename(self) -> String {
        format!("{}.lua.disabled", self.0)
    }
}

impl FromStr for AppId {
    type Err = InvalidAppId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // u32::from_str accepts a leading '+', which is not a plain id
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidAppId {
                input: s.to_string(),
            });
        }
        trimmed.parse::<u32>().map(Self).map_err(|_| InvalidAppId {
            input: s.to_string(),
        })
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AppId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!("730".parse::<AppId>().unwrap(), AppId::new(730));
        assert_eq!("  440\n".parse::<AppId>().unwrap(), AppId::new(440));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", " ", "abc", "12a", "-5", "+5", "1.5", "99999999999"] {
            assert!(input.parse::<AppId>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_from_json_number_and_string() {
        assert_eq!(AppId::from_json(&json!(10)).unwrap(), AppId::new(10));
        assert_eq!(AppId::from_json(&json!("20")).unwrap(), AppId::new(20));
    }

    #[test]
    fn test_from_json_rejects_non_integers() {
        assert!(AppId::from_json(&json!(-1)).is_err());
        assert!(AppId::from_json(&json!(1.5)).is_err());
        assert!(AppId::from_json(&json!(null)).is_err());
        assert!(AppId::from_json(&json!([1])).is_err());
        assert!(AppId::from_json(&json!(u64::from(u32::MAX) + 1)).is_err());
    }

    #[test]
    fn test_script_filenames() {
        let id = AppId::new(570);
        assert_eq!(id.script_filename(), "570.lua");
        assert_eq!(id.disabled_script_filename(), "570.lua.disabled");
    }

    #[test]
    fn test_invalid_app_id_display() {
        let err = "x1".parse::<AppId>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid appid: \"x1\"");
    }
}
