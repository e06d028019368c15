//! Runtime host for the surety ledger.
//!
//! A [`Node`] owns the ledger engine, persists every accepted transaction
//! through a [`Journal`](surety_core::journal::Journal), and fans out events
//! to subscribers such as the [`OracleRelay`].

pub mod config;
pub mod error;
pub mod node;
pub mod relay;

pub use config::{NodeConfig, RelayConfig};
pub use error::{NodeError, Result};
pub use node::{Accepted, Engine, Node, Settings, Submission};
pub use relay::{FixedStatus, OracleRelay, StatusReporter};

#[cfg(test)]
mod tests;
