//! Runtime configuration, deserialised from `surety.toml` and `SURETY__*`
//! environment variables.

use std::path::PathBuf;

use serde::Deserialize;
use surety_core::{Address, flight::FlightStatus, params::Params};

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
  /// SQLite journal file. A leading `~/` is expanded by the binary.
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Registered (unfunded) at genesis.
  pub genesis_airline: Address,
  /// Seed for oracle index generation. Changing it invalidates replay of an
  /// existing journal.
  #[serde(default)]
  pub index_seed:      u64,
  #[serde(default)]
  pub params:          Params,
  #[serde(default)]
  pub relay:           RelayConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.surety/journal.db") }

// ─── Relay ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RelayConfig {
  pub enabled:         bool,
  /// Number of oracle identities the relay operates.
  pub oracle_count:    u64,
  /// Oracle addresses are derived from this namespace.
  pub namespace:       String,
  /// Status every relay oracle reports.
  pub response_status: FlightStatus,
}

impl Default for RelayConfig {
  fn default() -> Self {
    Self {
      enabled:         true,
      oracle_count:    20,
      namespace:       "oracle".into(),
      response_status: FlightStatus::LateAirline,
    }
  }
}
