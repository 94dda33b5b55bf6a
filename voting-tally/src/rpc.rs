// Copyright (C) Microsoft Corporation. All rights reserved.

//! A blocking JSON-RPC client against the Tendermint-compatible surface
//! consumed by the tally controller (spec.md §6), grounded on
//! `original_source/scripts/admin_cli.py`'s use of `requests.post` with
//! a `{jsonrpc, id, method, params}` envelope.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;

use crate::error::{TallyError, TallyResult};

pub struct RpcClient {
    endpoint: String,
    http: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    data: Option<String>,
    message: Option<String>,
}

/// CometBFT 0.38+'s `broadcast_tx_commit` reply: `deliver_tx` was
/// renamed `tx_result` when per-tx delivery moved into `finalize_block`.
#[derive(Deserialize)]
struct BroadcastTxCommitResult {
    check_tx: TxResult,
    tx_result: TxResult,
}

#[derive(Deserialize)]
struct TxResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
}

#[derive(Deserialize)]
struct AbciQueryResult {
    response: AbciQueryResponse,
}

#[derive(Deserialize)]
struct AbciQueryResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    log: String,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        RpcClient {
            endpoint: endpoint.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn post<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> TallyResult<T> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": -1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .map_err(|source| TallyError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let envelope: RpcEnvelope<T> =
            response
                .json()
                .map_err(|source| TallyError::Transport {
                    endpoint: self.endpoint.clone(),
                    source,
                })?;

        if let Some(err) = envelope.error {
            return Err(TallyError::RpcError(
                err.data.or(err.message).unwrap_or_else(|| "unknown RPC error".to_string()),
            ));
        }

        envelope
            .result
            .ok_or_else(|| TallyError::RpcError("RPC reply had no result".to_string()))
    }

    /// Broadcasts `tx` and waits for it to be committed, matching
    /// `send_tx` in `original_source/scripts/admin_cli.py`. Returns the
    /// transaction's result log on success; an `Err` if either
    /// `check_tx` or the finalized tx result reported a non-zero code.
    pub fn broadcast_tx_commit(&self, tx: &str) -> TallyResult<String> {
        let tx_b64 = BASE64.encode(tx.as_bytes());
        let result: BroadcastTxCommitResult =
            self.post("broadcast_tx_commit", json!({ "tx": tx_b64 }))?;

        if result.check_tx.code != 0 {
            return Err(TallyError::RpcError(format!(
                "check_tx rejected the transaction: {}",
                result.check_tx.log
            )));
        }
        if result.tx_result.code != 0 {
            return Err(TallyError::RpcError(format!(
                "transaction was rejected: {}",
                result.tx_result.log
            )));
        }
        Ok(result.tx_result.log)
    }

    /// Queries `path` (only `/state` is meaningful to this system) and
    /// returns the raw decoded value bytes.
    pub fn abci_query(&self, path: &str) -> TallyResult<Vec<u8>> {
        let result: AbciQueryResult = self.post("abci_query", json!({ "path": path }))?;

        if result.response.code != 0 {
            return Err(TallyError::RpcError(format!(
                "query failed: {}",
                result.response.log
            )));
        }

        let Some(value_b64) = result.response.value else {
            return Ok(Vec::new());
        };
        BASE64
            .decode(value_b64)
            .map_err(|e| TallyError::RpcError(format!("value is not valid base64: {e}")))
    }
}
