// Copyright (C) Microsoft Corporation. All rights reserved.

//! The domain-level ledger application, per spec.md §4.3: pure
//! byte-in/byte-out callback logic with no networking. `abci.rs` is the
//! thin adapter that plugs this onto a real ABCI socket server.

use std::path::{Path, PathBuf};

use crypto_core::PaillierPublicKey;
use voting_state::VotingState;

/// ABCI reply code meaning "ok". Every callback in this ledger returns
/// this code, even for rejections — spec.md §9 "Uniform OK codes":
/// the source reference implementation reports rejections only via the
/// free-form `log` string, and changing that now would make replicas
/// diverge from others built against the same spec.
pub const CODE_OK: u32 = 0;

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    State(#[from] voting_state::StateError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Reply of `info`: the height and app-hash of the last committed
/// block, so the consensus engine knows where to resume replay.
pub struct InfoReply {
    pub last_block_height: u64,
    pub last_block_app_hash: [u8; 32],
}

pub struct VotingLedger {
    state: VotingState,
    public_key: PaillierPublicKey,
    state_path: PathBuf,
}

impl VotingLedger {
    /// Loads (or freshly initializes) the ledger's state from
    /// `state_path`, per spec.md §3's lifecycle: "created at node
    /// startup from its persisted file, or fresh if absent".
    pub fn open(state_path: &Path, public_key: PaillierPublicKey) -> LedgerResult<Self> {
        let state = VotingState::load(state_path, &public_key)?;
        Ok(VotingLedger {
            state,
            public_key,
            state_path: state_path.to_path_buf(),
        })
    }

    pub fn info(&self) -> LedgerResult<InfoReply> {
        Ok(InfoReply {
            last_block_height: self.state.current_height,
            last_block_app_hash: self.state.app_hash()?,
        })
    }

    /// Parses `app_state_bytes` as JSON and, if it contains a
    /// `voting_end_height` field, stores it, then persists the state.
    /// Called exactly once on a fresh chain.
    pub fn init_chain(&mut self, app_state_bytes: &[u8]) -> LedgerResult<()> {
        if !app_state_bytes.is_empty() {
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(app_state_bytes) {
                if let Some(end_height) = value.get("voting_end_height").and_then(|v| v.as_u64())
                {
                    self.state.voting_end_height = end_height;
                }
            } else {
                tracing::warn!("init_chain app_state is not valid JSON, ignoring");
            }
        }
        self.state.save(self.state.current_height, &self.state_path)?;
        Ok(())
    }

    /// Stateless validation: grammar checks only. Always returns
    /// `CODE_OK`; rejection reasons are carried in `log` alone (spec.md
    /// §9).
    pub fn check_tx(&self, tx: &[u8]) -> (u32, String) {
        let Ok(raw) = std::str::from_utf8(tx) else {
            return (CODE_OK, "transaction is not valid UTF-8".to_string());
        };

        match crate::tx::Transaction::parse(raw) {
            crate::tx::Transaction::VoteMalformed(reason) => (CODE_OK, reason),
            crate::tx::Transaction::Vote { .. } => (CODE_OK, String::new()),
            crate::tx::Transaction::Result { .. } => (CODE_OK, String::new()),
            crate::tx::Transaction::Unknown(_) => {
                (CODE_OK, "unrecognized transaction prefix, accepted as no-op".to_string())
            }
        }
    }

    /// The single point of state mutation, per spec.md §4.3's
    /// four-step algorithm. Always returns `CODE_OK`; rejections are
    /// reported via `log` and never mutate `self.state`.
    pub fn deliver_tx(&mut self, tx: &[u8]) -> (u32, String) {
        let Ok(raw) = std::str::from_utf8(tx) else {
            return (CODE_OK, "transaction is not valid UTF-8".to_string());
        };
        let parsed = crate::tx::Transaction::parse(raw);

        let voting_ended = self.state.is_voting_ended(self.state.current_height);
        if voting_ended && !matches!(parsed, crate::tx::Transaction::Result { .. }) {
            return (CODE_OK, "voting closed".to_string());
        }

        match parsed {
            crate::tx::Transaction::Vote { uid, ciphertext } => {
                let Ok(enc) = crypto_core::EncryptedNumber::from_decimal_str(&ciphertext) else {
                    return (CODE_OK, "malformed ciphertext".to_string());
                };
                match self.state.add_vote(uid, &enc, &self.public_key) {
                    Ok(()) => (CODE_OK, String::new()),
                    Err(voting_state::StateError::DuplicateUid(_)) => {
                        (CODE_OK, "already voted".to_string())
                    }
                    Err(e) => (CODE_OK, format!("rejected: {e}")),
                }
            }
            crate::tx::Transaction::Result { payload } => {
                if self.state.final_result.is_some() {
                    return (CODE_OK, "already published".to_string());
                }
                if !voting_ended {
                    return (CODE_OK, "too early".to_string());
                }
                self.state.final_result = Some(payload);
                (CODE_OK, String::new())
            }
            crate::tx::Transaction::VoteMalformed(reason) => (CODE_OK, reason),
            crate::tx::Transaction::Unknown(_) => (CODE_OK, String::new()),
        }
    }

    /// Only `/state` is recognized; any other path returns an empty
    /// value with an informational log.
    pub fn query(&self, path: &str) -> LedgerResult<(u32, Vec<u8>, String)> {
        if path == "/state" {
            let bytes = self.state.to_canonical_bytes()?;
            return Ok((CODE_OK, bytes, String::new()));
        }
        Ok((
            CODE_OK,
            Vec::new(),
            format!("unrecognized query path {path:?}"),
        ))
    }

    /// Runs every transaction in a block through `deliver_tx` against
    /// the height of the *previous* commit (so `is_voting_ended` checks
    /// inside the loop see the not-yet-advanced height), then advances
    /// `current_height` in memory and returns the resulting per-tx
    /// results plus app hash. Persistence is deferred to `commit`,
    /// mirroring CometBFT 0.38+'s split of the old `deliver_tx`+
    /// `commit` pair into `finalize_block` (execute, return app hash)
    /// and `commit` (persist).
    pub fn finalize_block(&mut self, txs: &[Vec<u8>]) -> LedgerResult<FinalizeBlockReply> {
        let tx_results = txs.iter().map(|tx| self.deliver_tx(tx)).collect();
        self.state.current_height += 1;
        let app_hash = self.state.app_hash()?;
        Ok(FinalizeBlockReply {
            tx_results,
            app_hash,
        })
    }

    /// Persists the state advanced by the most recent `finalize_block`
    /// call, aborting the process on a persistence failure per spec.md
    /// §7/§5 rather than let replicas silently diverge.
    pub fn commit(&mut self) {
        let height = self.state.current_height;
        if let Err(e) = self.state.save(height, &self.state_path) {
            tracing::error!(error = %e, "fatal: failed to persist state during commit");
            std::process::abort();
        }
    }
}

/// Reply of `finalize_block`: each transaction's `(code, log)` result,
/// in request order, plus the app hash of the resulting state.
pub struct FinalizeBlockReply {
    pub tx_results: Vec<(u32, String)>,
    pub app_hash: [u8; 32],
}
