//! The ledger transaction envelope.
//!
//! A [`Transaction`] is a self-contained, serialisable record of one call:
//! who made it, what value was attached, the block it executes in, and the
//! operation itself. Journals persist transactions verbatim so that replay
//! reproduces the ledger exactly.

use serde::{Deserialize, Serialize};

use crate::{
  address::Address,
  airline::Registration,
  amount::{self, Amount},
  event::Event,
  flight::FlightKey,
  oracle::ResponseOutcome,
};

// ─── Context ─────────────────────────────────────────────────────────────────

/// Position of a transaction in the total order, plus wall-clock time.
/// Doubles as the entropy source for oracle index generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockInfo {
  pub number:    u64,
  /// Seconds since the Unix epoch.
  pub timestamp: i64,
}

/// Caller identity and attached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
  pub caller: Address,
  #[serde(with = "amount::as_str", default)]
  pub value:  Amount,
  #[serde(default)]
  pub block:  BlockInfo,
}

impl TxContext {
  /// A call with no value attached.
  pub fn new(caller: Address) -> Self {
    Self { caller, value: 0, block: BlockInfo::default() }
  }

  pub fn with_value(self, value: Amount) -> Self { Self { value, ..self } }

  pub fn at(self, block: BlockInfo) -> Self { Self { block, ..self } }
}

// ─── Calls ───────────────────────────────────────────────────────────────────

/// The mutating operations a transaction can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
  SetOperationalStatus { desired: bool },
  RegisterAirline { candidate: Address },
  FundAirline,
  RegisterFlight { code: String, timestamp: u64 },
  BuyInsurance { flight: FlightKey },
  RegisterOracle,
  FetchFlightStatus { flight: FlightKey },
  /// `status` is the raw code; it is validated on execution.
  SubmitOracleResponse { index: u8, flight: FlightKey, status: u8 },
  Withdraw,
}

impl Call {
  /// Whether the call accepts attached value.
  pub fn is_payable(&self) -> bool {
    matches!(self, Self::FundAirline | Self::BuyInsurance { .. } | Self::RegisterOracle)
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::SetOperationalStatus { .. } => "set_operational_status",
      Self::RegisterAirline { .. } => "register_airline",
      Self::FundAirline => "fund_airline",
      Self::RegisterFlight { .. } => "register_flight",
      Self::BuyInsurance { .. } => "buy_insurance",
      Self::RegisterOracle => "register_oracle",
      Self::FetchFlightStatus { .. } => "fetch_flight_status",
      Self::SubmitOracleResponse { .. } => "submit_oracle_response",
      Self::Withdraw => "withdraw",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
  pub ctx:  TxContext,
  pub call: Call,
}

impl Transaction {
  pub fn new(ctx: TxContext, call: Call) -> Self { Self { ctx, call } }
}

// ─── Receipts ────────────────────────────────────────────────────────────────

/// The operation-specific result of an accepted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Done,
  Airline(Registration),
  Indexes([u8; 3]),
  Requested { index: u8 },
  Response(ResponseOutcome),
  Withdrawn(#[serde(with = "amount::as_str")] Amount),
}

/// What an accepted transaction produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
  pub outcome: Outcome,
  pub events:  Vec<Event>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transaction_json_shape() {
    let tx = Transaction::new(
      TxContext::new(Address::ZERO).with_value(5),
      Call::RegisterFlight { code: "AB721".into(), timestamp: 1_649_129_486 },
    );
    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["ctx"]["value"], "5");
    assert_eq!(json["call"]["register_flight"]["code"], "AB721");

    let back: Transaction = serde_json::from_value(json).unwrap();
    assert_eq!(back, tx);
  }

  #[test]
  fn unit_calls_parse_from_bare_strings() {
    let call: Call = serde_json::from_str(r#""withdraw""#).unwrap();
    assert_eq!(call, Call::Withdraw);
  }

  #[test]
  fn context_defaults_value_and_block() {
    let ctx: TxContext = serde_json::from_str(&format!(
      r#"{{"caller":"{}"}}"#,
      Address::ZERO
    ))
    .unwrap();
    assert_eq!(ctx.value, 0);
    assert_eq!(ctx.block, BlockInfo::default());
  }

  #[test]
  fn payable_calls() {
    assert!(Call::FundAirline.is_payable());
    assert!(Call::RegisterOracle.is_payable());
    assert!(!Call::Withdraw.is_payable());
  }
}
