// Copyright (C) Microsoft Corporation. All rights reserved.

//! Thin adapter from `VotingLedger`'s domain callbacks onto
//! `tendermint_abci::Application`, per SPEC_FULL.md §4.3. All the
//! actual state-transition logic lives in `ledger.rs`; this module only
//! translates `tendermint_proto::abci` request/response types.

use std::sync::{Arc, Mutex};

use tendermint_abci::Application;
use tendermint_proto::abci::{
    ExecTxResult, RequestCheckTx, RequestFinalizeBlock, RequestInfo, RequestInitChain,
    RequestQuery, ResponseCheckTx, ResponseCommit, ResponseFinalizeBlock, ResponseInfo,
    ResponseInitChain, ResponseQuery,
};

use crate::ledger::VotingLedger;

/// Wraps `VotingLedger` behind `Arc<Mutex<_>>` purely to satisfy
/// `Application`'s `&self` method signatures — the consensus engine
/// itself serializes `finalize_block`/`commit` delivery per spec.md §5,
/// so the mutex is never meaningfully contended.
#[derive(Clone)]
pub struct VotingApplication {
    ledger: Arc<Mutex<VotingLedger>>,
}

impl VotingApplication {
    pub fn new(ledger: VotingLedger) -> Self {
        VotingApplication {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }
}

impl Application for VotingApplication {
    fn info(&self, _request: RequestInfo) -> ResponseInfo {
        let ledger = self.ledger.lock().expect("ledger mutex poisoned");
        match ledger.info() {
            Ok(reply) => ResponseInfo {
                data: "voting-ledger".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                app_version: 1,
                last_block_height: reply.last_block_height as i64,
                last_block_app_hash: reply.last_block_app_hash.to_vec().into(),
            },
            Err(e) => {
                tracing::error!(error = %e, "fatal: failed to compute info reply");
                std::process::abort();
            }
        }
    }

    fn init_chain(&self, request: RequestInitChain) -> ResponseInitChain {
        let mut ledger = self.ledger.lock().expect("ledger mutex poisoned");
        if let Err(e) = ledger.init_chain(&request.app_state_bytes) {
            tracing::error!(error = %e, "fatal: init_chain persistence failed");
            std::process::abort();
        }
        ResponseInitChain::default()
    }

    fn check_tx(&self, request: RequestCheckTx) -> ResponseCheckTx {
        let ledger = self.ledger.lock().expect("ledger mutex poisoned");
        let (code, log) = ledger.check_tx(&request.tx);
        ResponseCheckTx {
            code,
            log,
            ..Default::default()
        }
    }

    fn finalize_block(&self, request: RequestFinalizeBlock) -> ResponseFinalizeBlock {
        let mut ledger = self.ledger.lock().expect("ledger mutex poisoned");
        let txs: Vec<Vec<u8>> = request.txs.into_iter().map(|tx| tx.to_vec()).collect();
        match ledger.finalize_block(&txs) {
            Ok(reply) => {
                let tx_results = reply
                    .tx_results
                    .into_iter()
                    .map(|(code, log)| ExecTxResult {
                        code,
                        log,
                        ..Default::default()
                    })
                    .collect();
                ResponseFinalizeBlock {
                    tx_results,
                    app_hash: reply.app_hash.to_vec().into(),
                    ..Default::default()
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "fatal: finalize_block failed to compute app_hash");
                std::process::abort();
            }
        }
    }

    fn query(&self, request: RequestQuery) -> ResponseQuery {
        let ledger = self.ledger.lock().expect("ledger mutex poisoned");
        match ledger.query(&request.path) {
            Ok((code, value, log)) => ResponseQuery {
                code,
                value: value.into(),
                log,
                ..Default::default()
            },
            Err(e) => {
                tracing::error!(error = %e, "fatal: query failed to read state");
                std::process::abort();
            }
        }
    }

    fn commit(&self) -> ResponseCommit {
        let mut ledger = self.ledger.lock().expect("ledger mutex poisoned");
        ledger.commit();
        // ABCI 2.0's `ResponseCommit` carries no app hash; `finalize_block`
        // already reported it. `retain_height: 0` keeps all blocks.
        ResponseCommit { retain_height: 0 }
    }
}
