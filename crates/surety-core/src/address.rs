//! Account addresses.
//!
//! An [`Address`] is an opaque 20-byte identity. Callers, airlines,
//! passengers and oracles are all addresses; the role an address plays is
//! determined by the ledger tables it appears in, not by the address itself.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

// ─── Address ─────────────────────────────────────────────────────────────────

/// A 20-byte account address, rendered as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
  pub const ZERO: Self = Self([0; 20]);

  pub const fn from_bytes(bytes: [u8; 20]) -> Self { Self(bytes) }

  pub fn as_bytes(&self) -> &[u8; 20] { &self.0 }

  /// Derive a stable address from a namespace and an ordinal.
  ///
  /// Used to provision fleets of well-known accounts (e.g. relay oracles)
  /// without key material.
  pub fn derive(namespace: &str, n: u64) -> Self {
    let digest = Sha256::new()
      .chain_update(namespace.as_bytes())
      .chain_update(n.to_be_bytes())
      .finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[..20]);
    Self(bytes)
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "0x{}", hex::encode(self.0))
  }
}

impl fmt::Debug for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)
      .map_err(|_| Error::InvalidAddress(s.to_owned()))?;
    Ok(Self(bytes))
  }
}

impl Serialize for Address {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Address {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_and_parse_agree() {
    let a = Address::derive("airline", 1);
    let text = a.to_string();
    assert!(text.starts_with("0x"));
    assert_eq!(text.len(), 42);
    assert_eq!(text.parse::<Address>().unwrap(), a);
  }

  #[test]
  fn parse_rejects_short_input() {
    assert!(matches!(
      "0x1234".parse::<Address>(),
      Err(Error::InvalidAddress(_))
    ));
  }

  #[test]
  fn derive_is_stable_and_distinct() {
    assert_eq!(Address::derive("oracle", 3), Address::derive("oracle", 3));
    assert_ne!(Address::derive("oracle", 3), Address::derive("oracle", 4));
    assert_ne!(Address::derive("oracle", 3), Address::derive("airline", 3));
  }

  #[test]
  fn serde_uses_hex_string() {
    let a = Address::from_bytes([0xab; 20]);
    let json = serde_json::to_string(&a).unwrap();
    assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
    let back: Address = serde_json::from_str(&json).unwrap();
    assert_eq!(back, a);
  }
}
