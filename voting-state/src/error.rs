// Copyright (C) Microsoft Corporation. All rights reserved.

/// Errors returned by `voting_state`'s persistence and validation layer,
/// matching spec.md §7's `PersistenceFailure` kind plus the corrupt-state
/// case called out in SPEC_FULL.md §4.2.
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("failed to read or write state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("state file is corrupt: {0}")]
    Corrupt(String),

    #[error("uid {0:?} has already voted")]
    DuplicateUid(String),

    #[error("homomorphic accumulation failed: {0}")]
    Crypto(#[from] crypto_core::CryptoError),
}

pub type StateResult<T> = Result<T, StateError>;
