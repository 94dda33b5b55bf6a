// Copyright (C) Microsoft Corporation. All rights reserved.

//! `tally`: the end-to-end tally orchestration of spec.md §4.4 — query
//! state, verify preconditions, reconstruct the private key from
//! guardian shares, decrypt the accumulated ciphertext, and broadcast
//! the result. Grounded on
//! `original_source/scripts/admin_cli.py`'s `tally` command.

use std::path::Path;

use crypto_core::{EncryptedNumber, PaillierPublicKey, Share};
use serde::Deserialize;

use crate::error::{TallyError, TallyResult};
use crate::rpc::RpcClient;

#[derive(Deserialize)]
struct SharesFile {
    shares: Vec<Share>,
    threshold: u8,
}

#[derive(Deserialize)]
struct ChainState {
    current_height: u64,
    encrypted_sum: String,
    final_result: Option<String>,
    total_votes: u64,
    voting_end_height: u64,
}

/// Runs the full tally procedure against `rpc_endpoint`, using the
/// public key and guardian shares found at `pubkey_path`/`shares_path`.
/// Each precondition failure aborts with a `TallyError::Precondition`
/// and attempts no state mutation, per spec.md §4.4.
pub fn tally(rpc_endpoint: &str, pubkey_path: &Path, shares_path: &Path) -> TallyResult<String> {
    let public_key: PaillierPublicKey =
        serde_json::from_slice(&std::fs::read(pubkey_path)?)?;
    let shares_file: SharesFile = serde_json::from_slice(&std::fs::read(shares_path)?)?;
    tracing::info!(
        loaded = shares_file.shares.len(),
        threshold = shares_file.threshold,
        "loaded guardian shares"
    );

    let client = RpcClient::new(rpc_endpoint);

    tracing::info!("querying chain state");
    let value = client.abci_query("/state")?;
    let state: ChainState = serde_json::from_slice(&value)?;
    tracing::info!(height = state.current_height, "fetched chain state");

    if state.voting_end_height == 0 {
        return Err(TallyError::Precondition(
            "voting_end_height is not set on-chain".to_string(),
        ));
    }
    if state.current_height <= state.voting_end_height {
        return Err(TallyError::Precondition(format!(
            "voting has not ended yet (current height {}, end height {})",
            state.current_height, state.voting_end_height
        )));
    }
    if let Some(existing) = &state.final_result {
        return Err(TallyError::Precondition(format!(
            "result already published on-chain: {existing}"
        )));
    }

    if (shares_file.shares.len() as u8) < shares_file.threshold {
        return Err(TallyError::Precondition(format!(
            "only {} shares on file, need at least {}",
            shares_file.shares.len(),
            shares_file.threshold
        )));
    }
    let shares_to_use = &shares_file.shares[..shares_file.threshold as usize];

    tracing::info!("reconstructing private key from guardian shares");
    let private_key = crypto_core::shamir::recover_private_key(shares_to_use, &public_key)?;

    let encrypted_sum = EncryptedNumber::from_decimal_str(&state.encrypted_sum)
        .map_err(TallyError::Crypto)?;
    let sum = crypto_core::paillier::decrypt(&private_key, &encrypted_sum)?;
    drop(private_key);

    tracing::info!(total_votes = state.total_votes, %sum, "tally decrypted");

    let result_payload = format!("Total Votes: {}, Sum: {sum}", state.total_votes);
    let tx = format!("result:{result_payload}");

    tracing::info!("broadcasting result to the chain");
    client.broadcast_tx_commit(&tx)?;

    Ok(result_payload)
}
