//! Off-ledger oracles.
//!
//! The relay operates a fixed set of oracle identities. It listens for
//! [`Event::OracleRequest`] and answers from every identity whose index triple
//! holds the requested index. Rejections are expected (the flight may have
//! resolved before all answers land) and are only logged.

use std::sync::Arc;

use surety_core::{
  Address,
  event::Event,
  flight::{FlightKey, FlightStatus},
  journal::Journal,
  tx::Call,
};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
  NodeError, Result,
  config::RelayConfig,
  node::{Node, Submission},
};

// ─── Status source ───────────────────────────────────────────────────────────

/// Decides what status the relay reports for a flight.
pub trait StatusReporter: Send + Sync {
  fn status(&self, flight: &FlightKey) -> FlightStatus;
}

/// Reports the same status for every flight.
#[derive(Debug, Clone, Copy)]
pub struct FixedStatus(pub FlightStatus);

impl StatusReporter for FixedStatus {
  fn status(&self, _flight: &FlightKey) -> FlightStatus { self.0 }
}

// ─── Relay ───────────────────────────────────────────────────────────────────

pub struct OracleRelay<J, R> {
  node:     Arc<Node<J>>,
  oracles:  Vec<Address>,
  reporter: R,
}

impl<J, R> OracleRelay<J, R>
where
  J: Journal + 'static,
  R: StatusReporter + 'static,
{
  pub fn new(node: Arc<Node<J>>, config: &RelayConfig, reporter: R) -> Self {
    let oracles = (0..config.oracle_count)
      .map(|n| Address::derive(&config.namespace, n))
      .collect();
    Self { node, oracles, reporter }
  }

  pub fn oracles(&self) -> &[Address] { &self.oracles }

  /// Register every relay oracle the ledger does not know yet.
  ///
  /// Returns how many were newly registered.
  pub async fn register(&self) -> Result<usize> {
    let fee = self.node.params().await.registration_fee;
    let mut registered = 0;
    for oracle in &self.oracles {
      if self.node.oracle_indexes(oracle).await.is_some() {
        continue;
      }
      self
        .node
        .submit(Submission::new(*oracle, fee, Call::RegisterOracle))
        .await?;
      registered += 1;
    }
    tracing::info!(registered, total = self.oracles.len(), "relay oracles ready");
    Ok(registered)
  }

  /// Answer one request. Returns how many answers the ledger accepted.
  pub async fn answer(&self, index: u8, flight: &FlightKey) -> usize {
    let status = self.reporter.status(flight);
    let mut accepted = 0;
    for oracle in &self.oracles {
      let holds = match self.node.oracle_indexes(oracle).await {
        Some(indexes) => indexes.contains(&index),
        None => false,
      };
      if !holds {
        continue;
      }
      let call = Call::SubmitOracleResponse { index, flight: flight.clone(), status: status.code() };
      match self.node.submit(Submission::new(*oracle, 0, call)).await {
        Ok(_) => accepted += 1,
        Err(NodeError::Rejected(e)) => {
          tracing::debug!(%oracle, %flight, index, error = %e, "oracle response rejected");
        }
        Err(e) => tracing::debug!(%oracle, %flight, error = %e, "oracle response failed"),
      }
    }
    accepted
  }

  /// Serve requests as they arrive. Returns once the event channel closes.
  pub async fn run(self, mut events: broadcast::Receiver<Event>) {
    loop {
      match events.recv().await {
        Ok(Event::OracleRequest { index, flight }) => {
          let accepted = self.answer(index, &flight).await;
          tracing::debug!(%flight, index, accepted, "answered oracle request");
        }
        Ok(_) => {}
        Err(RecvError::Lagged(missed)) => {
          tracing::warn!(missed, "relay lagged behind ledger events");
        }
        Err(RecvError::Closed) => break,
      }
    }
  }
}
