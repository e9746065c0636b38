use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ID_LEN: usize = 32;

/// Content identifier: the SHA-256 digest of whatever the id names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id([u8; ID_LEN]);

pub type CaptureId = Id;
pub type TreeId = Id;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    #[error("id must be {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid hex character {0:?} in id")]
    InvalidChar(char),
}

impl Id {
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps test failures readable.
        let full = self.to_string();
        write!(f, "Id({})", &full[..12])
    }
}

impl FromStr for Id {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != ID_LEN * 2 {
            return Err(IdParseError::Length {
                expected: ID_LEN * 2,
                actual: s.len(),
            });
        }

        let mut bytes = [0u8; ID_LEN];
        let mut chars = s.chars();
        for byte in &mut bytes {
            let hi = hex_value(chars.next())?;
            let lo = hex_value(chars.next())?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(ch: Option<char>) -> Result<u8, IdParseError> {
    let ch = ch.unwrap_or('\0');
    ch.to_digit(16)
        .map(|d| d as u8)
        .ok_or(IdParseError::InvalidChar(ch))
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
