//! SQL schema for the surety journal.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per accepted transaction. Strictly append-only.
CREATE TABLE IF NOT EXISTS entries (
    seq              INTEGER PRIMARY KEY,
    entry_id         TEXT NOT NULL UNIQUE,
    recorded_at      TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    caller           TEXT NOT NULL,
    value            TEXT NOT NULL,   -- decimal wei
    block_number     INTEGER NOT NULL,
    block_timestamp  INTEGER NOT NULL,
    call_name        TEXT NOT NULL,
    transaction_json TEXT NOT NULL
);

-- Events in emission order within their entry.
CREATE TABLE IF NOT EXISTS events (
    seq          INTEGER NOT NULL REFERENCES entries(seq),
    position     INTEGER NOT NULL,
    kind         TEXT NOT NULL,
    flight_key   TEXT,            -- display form of the flight, if any
    payload_json TEXT NOT NULL,
    PRIMARY KEY (seq, position)
);

CREATE INDEX IF NOT EXISTS entries_caller_idx ON entries(caller);
CREATE INDEX IF NOT EXISTS events_kind_idx    ON events(kind);
CREATE INDEX IF NOT EXISTS events_flight_idx  ON events(flight_key);

PRAGMA user_version = 1;
";
