// Copyright (C) Microsoft Corporation. All rights reserved.

//! The persisted voting ledger state, per spec.md §3 and §4.2.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crypto_core::{EncryptedNumber, PaillierPublicKey};

use crate::error::{StateError, StateResult};

/// Fields are declared in lexicographic order, and `voted_uids` is a
/// `BTreeSet` rather than a `HashSet`, so that `serde_json` (built with
/// the `preserve_order` feature) emits sorted-key, sorted-member JSON
/// with no custom sorting pass — the concrete fix for the ambiguity
/// spec.md §9 flags around hashing an unordered set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingState {
    pub current_height: u64,
    pub encrypted_sum: EncryptedNumber,
    pub final_result: Option<String>,
    pub total_votes: u64,
    pub voted_uids: BTreeSet<String>,
    pub voting_end_height: u64,
}

impl VotingState {
    /// A fresh, empty state: no votes, the canonical `Enc(0)` ciphertext
    /// (spec.md §9's fixed convention, ciphertext integer `1`), and
    /// voting open indefinitely until `init_chain` says otherwise.
    pub fn fresh() -> Self {
        VotingState {
            current_height: 0,
            encrypted_sum: EncryptedNumber::canonical_zero(),
            final_result: None,
            total_votes: 0,
            voted_uids: BTreeSet::new(),
            voting_end_height: 0,
        }
    }

    /// Loads state from `path`, or returns a fresh state if the file
    /// does not exist yet (a brand-new node's first startup).
    /// `public_key` is used only to validate that a loaded
    /// `encrypted_sum` is in range; it does not affect the bytes read.
    pub fn load(path: &Path, public_key: &PaillierPublicKey) -> StateResult<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no existing state file, starting fresh");
                return Ok(Self::fresh());
            }
            Err(e) => return Err(StateError::Io(e)),
        };

        let state: VotingState = serde_json::from_slice(&bytes)?;

        let n_squared = public_key.n_squared();
        if *state.encrypted_sum.ciphertext() >= n_squared {
            return Err(StateError::Corrupt(
                "encrypted_sum ciphertext is out of range for the active public key".to_string(),
            ));
        }
        if state.total_votes != state.voted_uids.len() as u64 {
            return Err(StateError::Corrupt(
                "total_votes does not match voted_uids cardinality".to_string(),
            ));
        }

        Ok(state)
    }

    /// Serializes to JSON with lexicographically-sorted keys and a
    /// sorted `voted_uids`, per spec.md §4.2's canonicalization
    /// invariant: two replicas with equal logical state must produce
    /// byte-identical output.
    pub fn to_canonical_bytes(&self) -> StateResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// SHA-256 of the canonical bytes, used as the ABCI app-hash.
    pub fn app_hash(&self) -> StateResult<[u8; 32]> {
        let bytes = self.to_canonical_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hasher.finalize().into())
    }

    /// Sets `current_height` and atomically persists the canonical
    /// JSON to `path` (write-to-temp, fsync, rename), so a crash
    /// mid-write leaves either the pre- or post-commit file intact.
    pub fn save(&mut self, height: u64, path: &Path) -> StateResult<()> {
        self.current_height = height;
        let bytes = self.to_canonical_bytes()?;
        util::atomic_file::write_atomic(path, &bytes)?;
        Ok(())
    }

    pub fn is_voting_ended(&self, height: u64) -> bool {
        self.voting_end_height > 0 && height > self.voting_end_height
    }

    /// Records `uid`'s ballot, homomorphically folding `enc` into
    /// `encrypted_sum`. Rejects a `uid` that has already voted without
    /// mutating any field (spec.md §3's monotonic `voted_uids`
    /// invariant).
    pub fn add_vote(
        &mut self,
        uid: String,
        enc: &EncryptedNumber,
        public_key: &PaillierPublicKey,
    ) -> StateResult<()> {
        if self.voted_uids.contains(&uid) {
            return Err(StateError::DuplicateUid(uid));
        }
        let new_sum = crypto_core::paillier::add(public_key, &self.encrypted_sum, enc)?;

        self.encrypted_sum = new_sum;
        self.voted_uids.insert(uid);
        self.total_votes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use util::csprng::Csprng;

    fn test_key() -> PaillierPublicKey {
        let mut csprng = Csprng::new();
        let (pk, _sk) = crypto_core::generate_keypair(128, &mut csprng).unwrap();
        pk
    }

    #[test]
    fn fresh_state_has_zero_sum_and_no_votes() {
        let state = VotingState::fresh();
        assert_eq!(state.total_votes, 0);
        assert!(state.voted_uids.is_empty());
        assert_eq!(state.encrypted_sum, EncryptedNumber::canonical_zero());
    }

    #[test]
    fn add_vote_rejects_duplicate_uid() {
        let pk = test_key();
        let mut csprng = Csprng::new();
        let mut state = VotingState::fresh();
        let enc = crypto_core::paillier::encrypt(&pk, &BigUint::from(1u32), &mut csprng).unwrap();

        state.add_vote("alice".to_string(), &enc, &pk).unwrap();
        assert_eq!(state.total_votes, 1);

        let err = state.add_vote("alice".to_string(), &enc, &pk).unwrap_err();
        assert!(matches!(err, StateError::DuplicateUid(_)));
        assert_eq!(state.total_votes, 1);
    }

    #[test]
    fn canonical_bytes_are_independent_of_insertion_order() {
        let pk = test_key();
        let mut csprng = Csprng::new();
        let enc_a = crypto_core::paillier::encrypt(&pk, &BigUint::from(1u32), &mut csprng).unwrap();
        let enc_b = crypto_core::paillier::encrypt(&pk, &BigUint::from(0u32), &mut csprng).unwrap();

        let mut state1 = VotingState::fresh();
        state1.add_vote("alice".to_string(), &enc_a, &pk).unwrap();
        state1.add_vote("bob".to_string(), &enc_b, &pk).unwrap();

        let mut state2 = VotingState::fresh();
        state2.add_vote("bob".to_string(), &enc_b, &pk).unwrap();
        state2.add_vote("alice".to_string(), &enc_a, &pk).unwrap();

        // Ciphertexts differ (Paillier encryption is probabilistic) so
        // compare the sorted uid set and vote count rather than hashes.
        assert_eq!(state1.voted_uids, state2.voted_uids);
        assert_eq!(state1.total_votes, state2.total_votes);

        let bytes1 = state1.to_canonical_bytes().unwrap();
        let json1: serde_json::Value = serde_json::from_slice(&bytes1).unwrap();
        assert_eq!(
            json1["voted_uids"],
            serde_json::json!(["alice", "bob"])
        );
    }

    #[test]
    fn is_voting_ended_respects_zero_as_unset() {
        let state = VotingState::fresh();
        assert!(!state.is_voting_ended(1_000_000));
    }

    #[test]
    fn is_voting_ended_boundary_is_strictly_greater_than() {
        let mut state = VotingState::fresh();
        state.voting_end_height = 10;
        assert!(!state.is_voting_ended(10));
        assert!(state.is_voting_ended(11));
    }

    #[test]
    fn save_and_load_round_trip() {
        let pk = test_key();
        let mut csprng = Csprng::new();
        let enc = crypto_core::paillier::encrypt(&pk, &BigUint::from(1u32), &mut csprng).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_state.json");

        let mut state = VotingState::fresh();
        state.add_vote("alice".to_string(), &enc, &pk).unwrap();
        state.save(1, &path).unwrap();

        let loaded = VotingState::load(&path, &pk).unwrap();
        assert_eq!(loaded.total_votes, 1);
        assert_eq!(loaded.current_height, 1);
        assert!(loaded.voted_uids.contains("alice"));
    }

    #[test]
    fn load_missing_file_returns_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let pk = test_key();
        let loaded = VotingState::load(&path, &pk).unwrap();
        assert_eq!(loaded.total_votes, 0);
    }
}
