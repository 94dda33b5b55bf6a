// Copyright (C) Microsoft Corporation. All rights reserved.

//! The ledger application's ABCI server binary, mirroring
//! `original_source/run_node.py`'s argparse surface (`--port`), plus
//! the file paths the Python version hardcodes and a `--log-filter`
//! for structured logging (SPEC_FULL.md §4.3/§10).

use std::path::PathBuf;

use clap::Parser;
use crypto_core::PaillierPublicKey;
use voting_ledger::{VotingApplication, VotingLedger};

#[derive(Parser, Debug)]
#[command(author, version, about = "Voting ledger ABCI application")]
struct Args {
    /// TCP port to listen for ABCI connections on.
    #[arg(long, env = "VOTING_NODE_PORT", default_value_t = 26658)]
    port: u16,

    /// Path to the node's persisted state file.
    #[arg(long, env = "VOTING_NODE_STATE_FILE", default_value = "app_state.json")]
    state_file: PathBuf,

    /// Path to the Paillier public key file (`{"n": "<decimal>"}`).
    #[arg(
        long,
        env = "VOTING_NODE_PUBKEY_FILE",
        default_value = "paillier_pubkey.json"
    )]
    pubkey_file: PathBuf,

    /// `tracing_subscriber::EnvFilter` directive, e.g. "info" or "debug".
    #[arg(long, env = "VOTING_NODE_LOG_FILTER", default_value = "info")]
    log_filter: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    util::logging::init(&args.log_filter);

    let pubkey_bytes = std::fs::read(&args.pubkey_file)
        .map_err(|e| anyhow::anyhow!("reading {:?}: {e}", args.pubkey_file))?;
    let public_key: PaillierPublicKey = serde_json::from_slice(&pubkey_bytes)
        .map_err(|e| anyhow::anyhow!("parsing {:?}: {e}", args.pubkey_file))?;

    let ledger = VotingLedger::open(&args.state_file, public_key)?;
    let app = VotingApplication::new(ledger);

    let addr = format!("127.0.0.1:{}", args.port);
    tracing::info!(%addr, "starting voting ledger ABCI server");

    let server = tendermint_abci::ServerBuilder::default().bind(addr, app)?;
    server.listen()?;

    Ok(())
}
