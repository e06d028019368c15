//! Native-value amounts.
//!
//! Amounts are plain `u128` counts of the smallest unit. On the wire they are
//! decimal strings, since JSON numbers and TOML integers cannot carry the
//! full range.

/// Native value in its smallest indivisible unit.
pub type Amount = u128;

/// One whole unit of native value (`10^18` of the smallest unit).
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// `n` whole units.
pub const fn units(n: u64) -> Amount { n as Amount * UNIT }

/// `n` thousandths of a unit (`milli(100)` is 0.1 units).
pub const fn milli(n: u64) -> Amount { n as Amount * (UNIT / 1000) }

/// Serde adapter: an [`Amount`] as a decimal string.
///
/// Deserialisation also accepts a bare integer so hand-written config files
/// can use small literal values.
pub mod as_str {
  use serde::{Deserialize, Deserializer, Serializer, de};

  use super::Amount;

  pub fn serialize<S: Serializer>(v: &Amount, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
  }

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Int(u64),
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Amount, D::Error> {
    match Raw::deserialize(d)? {
      Raw::Text(t) => t.trim().parse().map_err(de::Error::custom),
      Raw::Int(i) => Ok(Amount::from(i)),
    }
  }
}
