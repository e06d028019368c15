//! Domain events emitted by accepted transactions.
//!
//! Events are the only channel through which off-ledger collaborators (the
//! oracle relay in particular) learn about ledger activity.

use serde::{Deserialize, Serialize};

use crate::{
  address::Address,
  amount::{self, Amount},
  flight::{FlightKey, FlightStatus},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
  OperationalStatusChanged { operational: bool },

  AirlineRegistered { airline: Address, sponsor: Address },
  AirlineVoted { candidate: Address, voter: Address, votes: usize, required: usize },
  AirlineFunded {
    airline: Address,
    #[serde(with = "amount::as_str")]
    amount:  Amount,
  },

  FlightRegistered { flight: FlightKey },

  InsurancePurchased {
    flight:    FlightKey,
    passenger: Address,
    #[serde(with = "amount::as_str")]
    amount:    Amount,
    /// Policy total after this purchase.
    #[serde(with = "amount::as_str")]
    insured:   Amount,
  },

  OracleRegistered { oracle: Address, indexes: [u8; 3] },

  /// A status request is open; oracles holding `index` may answer it.
  OracleRequest { index: u8, flight: FlightKey },

  /// An oracle response was accepted but quorum is not yet reached.
  OracleReport { oracle: Address, flight: FlightKey, status: FlightStatus },

  FlightStatusResolved { flight: FlightKey, status: FlightStatus },

  InsureeCredited {
    flight:    FlightKey,
    passenger: Address,
    #[serde(with = "amount::as_str")]
    amount:    Amount,
  },

  PayoutWithdrawn {
    passenger: Address,
    #[serde(with = "amount::as_str")]
    amount:    Amount,
  },
}

impl Event {
  /// Stable discriminant, used as the `kind` column by journals.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::OperationalStatusChanged { .. } => "operational_status_changed",
      Self::AirlineRegistered { .. } => "airline_registered",
      Self::AirlineVoted { .. } => "airline_voted",
      Self::AirlineFunded { .. } => "airline_funded",
      Self::FlightRegistered { .. } => "flight_registered",
      Self::InsurancePurchased { .. } => "insurance_purchased",
      Self::OracleRegistered { .. } => "oracle_registered",
      Self::OracleRequest { .. } => "oracle_request",
      Self::OracleReport { .. } => "oracle_report",
      Self::FlightStatusResolved { .. } => "flight_status_resolved",
      Self::InsureeCredited { .. } => "insuree_credited",
      Self::PayoutWithdrawn { .. } => "payout_withdrawn",
    }
  }

  /// The flight this event concerns, if any.
  pub fn flight(&self) -> Option<&FlightKey> {
    match self {
      Self::FlightRegistered { flight }
      | Self::InsurancePurchased { flight, .. }
      | Self::OracleRequest { flight, .. }
      | Self::OracleReport { flight, .. }
      | Self::FlightStatusResolved { flight, .. }
      | Self::InsureeCredited { flight, .. } => Some(flight),
      _ => None,
    }
  }
}
