//! Flights and their status codes.
//!
//! A flight is identified by the `(airline, code, timestamp)` tuple. The same
//! flight code on a different departure timestamp is a different flight.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, address::Address};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The canonical identity of a flight instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
  pub airline:   Address,
  pub code:      String,
  /// Scheduled departure, seconds since the Unix epoch.
  pub timestamp: u64,
}

impl FlightKey {
  pub fn new(airline: Address, code: impl Into<String>, timestamp: u64) -> Self {
    Self { airline, code: code.into(), timestamp }
  }
}

impl fmt::Display for FlightKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}@{}", self.airline, self.code, self.timestamp)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Flight status as reported by oracles. The numeric codes are fixed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FlightStatus {
  #[default]
  Unknown       = 0,
  OnTime        = 10,
  LateAirline   = 20,
  LateWeather   = 30,
  LateTechnical = 40,
  LateOther     = 50,
}

impl FlightStatus {
  pub const fn code(self) -> u8 { self as u8 }

  /// Whether this status ends the flight's lifecycle.
  pub const fn is_terminal(self) -> bool { !matches!(self, Self::Unknown) }

  /// Whether insured passengers are owed a payout.
  pub const fn pays_out(self) -> bool { matches!(self, Self::LateAirline) }
}

impl TryFrom<u8> for FlightStatus {
  type Error = Error;

  fn try_from(code: u8) -> Result<Self> {
    Ok(match code {
      0 => Self::Unknown,
      10 => Self::OnTime,
      20 => Self::LateAirline,
      30 => Self::LateWeather,
      40 => Self::LateTechnical,
      50 => Self::LateOther,
      other => return Err(Error::InvalidStatusCode(other)),
    })
  }
}

// ─── Flight ──────────────────────────────────────────────────────────────────

/// A registered flight. Presence in the flight table means registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
  pub key:         FlightKey,
  pub status:      FlightStatus,
  /// Block at which the status became terminal.
  pub resolved_at: Option<u64>,
}

impl Flight {
  pub fn new(key: FlightKey) -> Self {
    Self { key, status: FlightStatus::Unknown, resolved_at: None }
  }

  pub fn is_resolved(&self) -> bool { self.status.is_terminal() }
}
