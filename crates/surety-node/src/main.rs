//! surety-node binary.
//!
//! Reads `surety.toml` (or the path given with `--config`), replays the
//! SQLite journal, starts the oracle relay, and then executes transactions
//! read from stdin, one JSON [`Submission`] per line. Each line gets one JSON
//! reply on stdout.
//!
//! ```text
//! {"caller":"0x…","value":"10000000000000000000","call":"fund_airline"}
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use serde::Serialize;
use surety_core::{ErrorKind, Genesis};
use surety_node::{
  Accepted, FixedStatus, Node, NodeConfig, NodeError, OracleRelay, Settings, Submission,
};
use surety_store_sqlite::SqliteJournal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Consortium flight-insurance ledger node")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "surety.toml")]
  config: PathBuf,

  /// Do not run the built-in oracle relay, whatever the config says.
  #[arg(long)]
  no_relay: bool,
}

/// One line of output per line of input.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Reply {
  Accepted(Accepted),
  Rejected {
    kind:    Option<ErrorKind>,
    message: String,
  },
}

impl Reply {
  fn rejected(kind: Option<ErrorKind>, message: impl ToString) -> Self {
    Self::Rejected { kind, message: message.to_string() }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries replies only.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SURETY").separator("__"))
    .build()
    .context("failed to read config file")?;

  let node_cfg: NodeConfig = settings
    .try_deserialize()
    .context("failed to deserialise NodeConfig")?;
  node_cfg.params.validate().context("invalid [params]")?;

  let store_path = expand_tilde(&node_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let journal = SqliteJournal::open(&store_path)
    .await
    .with_context(|| format!("failed to open journal at {store_path:?}"))?;

  let node = Node::open(journal, Settings {
    genesis:    Genesis { first_airline: node_cfg.genesis_airline },
    index_seed: node_cfg.index_seed,
    params:     node_cfg.params.clone(),
  })
  .await
  .context("failed to restore ledger from journal")?;
  let node = Arc::new(node);

  let relay = if node_cfg.relay.enabled && !cli.no_relay {
    let relay = OracleRelay::new(
      node.clone(),
      &node_cfg.relay,
      FixedStatus(node_cfg.relay.response_status),
    );
    let events = node.subscribe();
    relay.register().await.context("failed to register relay oracles")?;
    Some(tokio::spawn(relay.run(events)))
  } else {
    None
  };

  tracing::info!(path = ?store_path, height = node.height().await, "accepting transactions on stdin");

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    let line = tokio::select! {
      line = lines.next_line() => line.context("failed to read stdin")?,
      _ = tokio::signal::ctrl_c() => {
        tracing::info!("interrupted");
        break;
      }
    };
    let Some(line) = line else { break };
    if line.trim().is_empty() {
      continue;
    }

    let reply = match serde_json::from_str::<Submission>(&line) {
      Ok(submission) => match node.submit(submission).await {
        Ok(accepted) => Reply::Accepted(accepted),
        Err(NodeError::Rejected(e)) => Reply::rejected(Some(e.kind()), e),
        Err(e) => {
          tracing::error!(error = %e, "submission failed");
          Reply::rejected(None, e)
        }
      },
      Err(e) => Reply::rejected(Some(ErrorKind::Malformed), e),
    };
    println!("{}", serde_json::to_string(&reply)?);
  }

  if let Some(task) = relay {
    task.abort();
  }
  tracing::info!(height = node.height().await, "shutting down");
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
