//! The `Journal` trait: durable, append-only transaction history.
//!
//! The ledger itself lives in memory. Durability comes from journalling each
//! accepted [`Transaction`] together with the events it emitted; replaying
//! the journal through a fresh ledger rebuilds the same state.
//!
//! Implemented by storage backends (e.g. `surety-store-sqlite`).

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{event::Event, flight::FlightKey, tx::Transaction};

// ─── Records ─────────────────────────────────────────────────────────────────

/// One accepted transaction as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
  /// Position in the total order, starting at 1.
  pub seq:         u64,
  pub entry_id:    Uuid,
  /// Store-assigned; never changes after creation.
  pub recorded_at: DateTime<Utc>,
  pub transaction: Transaction,
  pub events:      Vec<Event>,
}

/// An event together with the entry that emitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
  pub seq:   u64,
  pub event: Event,
}

/// Parameters for [`Journal::events`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  /// Restrict to event kinds (see [`Event::kind`]).
  pub kinds:  Vec<String>,
  pub flight: Option<FlightKey>,
  /// Only events from entries with `seq` strictly greater than this.
  pub after:  Option<u64>,
  pub limit:  Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

pub trait Journal: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist an accepted transaction and its events as one entry.
  fn append(
    &self,
    transaction: Transaction,
    events: Vec<Event>,
  ) -> impl Future<Output = Result<JournalEntry, Self::Error>> + Send + '_;

  /// Entries in sequence order, optionally only those after `after`.
  fn entries(
    &self,
    after: Option<u64>,
  ) -> impl Future<Output = Result<Vec<JournalEntry>, Self::Error>> + Send + '_;

  fn events<'a>(
    &'a self,
    query: &'a EventQuery,
  ) -> impl Future<Output = Result<Vec<RecordedEvent>, Self::Error>> + Send + 'a;

  /// Sequence number of the latest entry, or 0 when empty.
  fn head(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
