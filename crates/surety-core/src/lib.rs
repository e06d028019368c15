//! Core state ledger and consensus engine for consortium flight insurance.
//!
//! This crate is deliberately free of I/O. It holds the domain types, the
//! [`store::LedgerStore`] abstraction with an in-memory implementation, and
//! the [`ledger::FlightSurety`] engine that admits airlines, registers
//! flights, sells policies, and settles them from oracle votes.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod address;
pub mod airline;
pub mod amount;
pub mod error;
pub mod event;
pub mod flight;
pub mod guard;
pub mod index;
pub mod insurance;
pub mod journal;
pub mod ledger;
pub mod memory;
pub mod oracle;
pub mod params;
pub mod store;
pub mod tx;

pub use address::Address;
pub use amount::{Amount, UNIT};
pub use error::{Error, ErrorKind, Result};
pub use ledger::{Balances, FlightSurety, Genesis, Transfer};
