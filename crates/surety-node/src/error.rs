//! Error type for `surety-node`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
  /// The ledger refused the transaction.
  #[error(transparent)]
  Rejected(#[from] surety_core::Error),

  #[error("journal error: {0}")]
  Journal(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A journalled transaction no longer executes. The journal and the
  /// ledger rules disagree, so the node must not start.
  #[error("replay failed at entry {seq}: {source}")]
  Replay {
    seq:    u64,
    #[source]
    source: surety_core::Error,
  },

  /// Replay produced different events than were journalled.
  #[error("replay diverged at entry {seq}")]
  Diverged { seq: u64 },

  #[error("invalid settings: {0}")]
  Settings(#[source] surety_core::Error),

  /// A failed append could not be undone by replaying the journal. The
  /// in-memory ledger may be ahead of disk, so nothing more is accepted.
  #[error("node halted after a journal failure")]
  Halted,

  #[error("block height exhausted")]
  HeightExhausted,
}

impl NodeError {
  pub(crate) fn journal(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Journal(Box::new(e))
  }
}

pub type Result<T, E = NodeError> = std::result::Result<T, E>;
