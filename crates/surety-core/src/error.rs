//! Error types for `surety-core`.
//!
//! Every failure is local to the transaction that produced it; a failed
//! transaction leaves no trace in the ledger.

use serde::Serialize;
use thiserror::Error;

use crate::{address::Address, amount::Amount, flight::FlightKey};

#[derive(Debug, Error)]
pub enum Error {
  #[error("operations are disabled")]
  OperationalDisabled,

  #[error("{0} is not authorized: {1}")]
  Unauthorized(Address, &'static str),

  #[error("airline {0} is already registered")]
  AirlineAlreadyRegistered(Address),

  #[error("airline {0} is already funded")]
  AirlineAlreadyFunded(Address),

  #[error("flight {0} is already registered")]
  FlightAlreadyRegistered(FlightKey),

  #[error("oracle {0} is already registered")]
  OracleAlreadyRegistered(Address),

  #[error("flight not found: {0}")]
  FlightNotFound(FlightKey),

  #[error("oracle not found: {0}")]
  OracleNotFound(Address),

  #[error("invalid amount {got}: {reason}")]
  InvalidAmount { got: Amount, reason: &'static str },

  #[error("flight {0} is already resolved")]
  AlreadyResolved(FlightKey),

  #[error("index {index} does not match: {reason}")]
  IndexMismatch { index: u8, reason: &'static str },

  #[error("invalid status code: {0}")]
  InvalidStatusCode(u8),

  #[error("nothing to withdraw for {0}")]
  NothingToWithdraw(Address),

  #[error("reserve of {reserve} cannot cover {requested}")]
  InsufficientReserve { reserve: Amount, requested: Amount },

  #[error(transparent)]
  TransferFailed(#[from] TransferError),

  #[error("invalid address: {0:?}")]
  InvalidAddress(String),

  #[error("invalid params: {0}")]
  InvalidParams(&'static str),
}

/// Failure reported by a [`Transfer`](crate::ledger::Transfer) collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transfer failed: {0}")]
pub struct TransferError(pub String);

/// Coarse classification of an [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Unauthorized,
  AlreadyExists,
  NotFound,
  InvalidAmount,
  AlreadyResolved,
  IndexMismatch,
  OperationalDisabled,
  NothingToWithdraw,
  InvalidStatusCode,
  InsufficientReserve,
  TransferFailed,
  Malformed,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::OperationalDisabled => ErrorKind::OperationalDisabled,
      Self::Unauthorized(..) => ErrorKind::Unauthorized,
      Self::AirlineAlreadyRegistered(_)
      | Self::AirlineAlreadyFunded(_)
      | Self::FlightAlreadyRegistered(_)
      | Self::OracleAlreadyRegistered(_) => ErrorKind::AlreadyExists,
      Self::FlightNotFound(_) | Self::OracleNotFound(_) => ErrorKind::NotFound,
      Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
      Self::AlreadyResolved(_) => ErrorKind::AlreadyResolved,
      Self::IndexMismatch { .. } => ErrorKind::IndexMismatch,
      Self::InvalidStatusCode(_) => ErrorKind::InvalidStatusCode,
      Self::NothingToWithdraw(_) => ErrorKind::NothingToWithdraw,
      Self::InsufficientReserve { .. } => ErrorKind::InsufficientReserve,
      Self::TransferFailed(_) => ErrorKind::TransferFailed,
      Self::InvalidAddress(_) | Self::InvalidParams(_) => ErrorKind::Malformed,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
