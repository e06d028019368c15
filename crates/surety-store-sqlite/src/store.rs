//! [`SqliteJournal`]: the SQLite implementation of [`Journal`].

use std::path::Path;

use chrono::Utc;
use rusqlite::types::Value;
use surety_core::{
  event::Event,
  journal::{EventQuery, Journal, JournalEntry, RecordedEvent},
  tx::Transaction,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{EntryRow, EventRow, RawEntry, RawEvent, decode_seq, encode_u64},
  schema::SCHEMA,
};

// ─── Journal ─────────────────────────────────────────────────────────────────

/// An append-only transaction journal backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteJournal {
  conn: tokio_rusqlite::Connection,
}

impl SqliteJournal {
  /// Open (or create) a journal at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let journal = Self { conn };
    journal.init_schema().await?;
    Ok(journal)
  }

  /// Open an in-memory journal, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let journal = Self { conn };
    journal.init_schema().await?;
    Ok(journal)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Events of entries `from..=to`, ordered by entry then emission.
  async fn events_of(&self, from: i64, to: i64) -> Result<Vec<RawEvent>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT seq, payload_json FROM events
           WHERE seq >= ?1 AND seq <= ?2
           ORDER BY seq, position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from, to], |row| {
            Ok(RawEvent { seq: row.get(0)?, payload_json: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(raws)
  }
}

// ─── Journal impl ────────────────────────────────────────────────────────────

impl Journal for SqliteJournal {
  type Error = crate::Error;

  async fn append(&self, transaction: Transaction, events: Vec<Event>) -> Result<JournalEntry> {
    let entry_id = Uuid::new_v4();
    let recorded_at = Utc::now();

    let entry = EntryRow::new(entry_id, recorded_at, &transaction)?;
    let event_rows = events
      .iter()
      .enumerate()
      .map(|(i, e)| EventRow::new(i, e))
      .collect::<Result<Vec<_>>>()?;

    // The entry and its events land together or not at all.
    let seq: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let seq: i64 =
          tx.query_row("SELECT COALESCE(MAX(seq), 0) + 1 FROM entries", [], |r| r.get(0))?;
        tx.execute(
          "INSERT INTO entries (
             seq, entry_id, recorded_at, caller, value,
             block_number, block_timestamp, call_name, transaction_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            seq,
            entry.entry_id,
            entry.recorded_at,
            entry.caller,
            entry.value,
            entry.block_number,
            entry.block_timestamp,
            entry.call_name,
            entry.transaction_json,
          ],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO events (seq, position, kind, flight_key, payload_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for row in &event_rows {
            stmt.execute(rusqlite::params![
              seq,
              row.position,
              row.kind,
              row.flight_key,
              row.payload_json,
            ])?;
          }
        }
        tx.commit()?;
        Ok(seq)
      })
      .await?;

    let seq = decode_seq(seq)?;
    tracing::debug!(seq, call = transaction.call.name(), events = events.len(), "journalled");
    Ok(JournalEntry { seq, entry_id, recorded_at, transaction, events })
  }

  async fn entries(&self, after: Option<u64>) -> Result<Vec<JournalEntry>> {
    let after = encode_u64(after.unwrap_or(0), "sequence")?;

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT seq, entry_id, recorded_at, transaction_json
           FROM entries WHERE seq > ?1 ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![after], |row| {
            Ok(RawEntry {
              seq:              row.get(0)?,
              entry_id:         row.get(1)?,
              recorded_at:      row.get(2)?,
              transaction_json: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let (Some(first), Some(last)) = (raws.first(), raws.last()) else {
      return Ok(Vec::new());
    };
    let mut events = self.events_of(first.seq, last.seq).await?.into_iter().peekable();

    let mut entries = Vec::with_capacity(raws.len());
    for raw in raws {
      let mut own = Vec::new();
      while let Some(ev) = events.next_if(|ev| ev.seq == raw.seq) {
        own.push(ev.decode()?);
      }
      entries.push(raw.into_entry(own)?);
    }
    Ok(entries)
  }

  async fn events(&self, query: &EventQuery) -> Result<Vec<RecordedEvent>> {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<Value> = vec![];

    if !query.kinds.is_empty() {
      let marks = vec!["?"; query.kinds.len()].join(", ");
      conds.push(format!("kind IN ({marks})"));
      params.extend(query.kinds.iter().cloned().map(Value::Text));
    }
    if let Some(flight) = &query.flight {
      conds.push("flight_key = ?".into());
      params.push(Value::Text(flight.to_string()));
    }
    if let Some(after) = query.after {
      conds.push("seq > ?".into());
      params.push(Value::Integer(encode_u64(after, "sequence")?));
    }
    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    // SQLite treats a negative limit as unbounded.
    let limit = query.limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
    params.push(Value::Integer(limit));

    let sql = format!(
      "SELECT seq, payload_json FROM events
       {where_clause}
       ORDER BY seq, position
       LIMIT ?"
    );

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawEvent { seq: row.get(0)?, payload_json: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_recorded).collect()
  }

  async fn head(&self) -> Result<u64> {
    let seq: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COALESCE(MAX(seq), 0) FROM entries", [], |r| r.get(0))?)
      })
      .await?;
    decode_seq(seq)
  }
}
