//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings and UUIDs hyphenated lowercase strings.
//! Transactions and events are stored as compact JSON; the scalar columns
//! beside them exist for filtering and are never read back.

use chrono::{DateTime, Utc};
use surety_core::{
  event::Event,
  journal::{JournalEntry, RecordedEvent},
  tx::Transaction,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// SQLite integers are signed.
pub fn encode_u64(n: u64, what: &'static str) -> Result<i64> {
  i64::try_from(n).map_err(|_| Error::OutOfRange(what))
}

pub fn decode_seq(seq: i64) -> Result<u64> {
  u64::try_from(seq).map_err(|_| Error::Corrupt { seq, reason: "negative sequence".into() })
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Column values for one `entries` insert.
pub struct EntryRow {
  pub entry_id:         String,
  pub recorded_at:      String,
  pub caller:           String,
  pub value:            String,
  pub block_number:     i64,
  pub block_timestamp:  i64,
  pub call_name:        &'static str,
  pub transaction_json: String,
}

impl EntryRow {
  pub fn new(entry_id: Uuid, recorded_at: DateTime<Utc>, tx: &Transaction) -> Result<Self> {
    Ok(Self {
      entry_id:         encode_uuid(entry_id),
      recorded_at:      encode_dt(recorded_at),
      caller:           tx.ctx.caller.to_string(),
      value:            tx.ctx.value.to_string(),
      block_number:     encode_u64(tx.ctx.block.number, "block number")?,
      block_timestamp:  tx.ctx.block.timestamp,
      call_name:        tx.call.name(),
      transaction_json: serde_json::to_string(tx)?,
    })
  }
}

/// Column values for one `events` insert.
pub struct EventRow {
  pub position:     i64,
  pub kind:         &'static str,
  pub flight_key:   Option<String>,
  pub payload_json: String,
}

impl EventRow {
  pub fn new(position: usize, event: &Event) -> Result<Self> {
    Ok(Self {
      position:     encode_u64(position as u64, "event position")?,
      kind:         event.kind(),
      flight_key:   event.flight().map(ToString::to_string),
      payload_json: serde_json::to_string(event)?,
    })
  }
}

/// Raw strings read directly from an `entries` row.
pub struct RawEntry {
  pub seq:              i64,
  pub entry_id:         String,
  pub recorded_at:      String,
  pub transaction_json: String,
}

impl RawEntry {
  pub fn into_entry(self, events: Vec<Event>) -> Result<JournalEntry> {
    Ok(JournalEntry {
      seq: decode_seq(self.seq)?,
      entry_id: decode_uuid(&self.entry_id)?,
      recorded_at: decode_dt(&self.recorded_at)?,
      transaction: serde_json::from_str(&self.transaction_json)?,
      events,
    })
  }
}

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub seq:          i64,
  pub payload_json: String,
}

impl RawEvent {
  pub fn decode(&self) -> Result<Event> { Ok(serde_json::from_str(&self.payload_json)?) }

  pub fn into_recorded(self) -> Result<RecordedEvent> {
    Ok(RecordedEvent { seq: decode_seq(self.seq)?, event: self.decode()? })
  }
}
