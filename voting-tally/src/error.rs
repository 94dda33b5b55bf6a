// Copyright (C) Microsoft Corporation. All rights reserved.

/// Errors surfaced to the `voting-admin` operator CLI, per spec.md §7's
/// `TransportFailure` kind plus the tally-specific precondition and
/// key-material failures SPEC_FULL.md §4.4 calls out.
#[derive(thiserror::Error, Debug)]
pub enum TallyError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Crypto(#[from] crypto_core::CryptoError),

    #[error("RPC request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("RPC call succeeded but the node reported an error: {0}")]
    RpcError(String),

    #[error("tally precondition failed: {0}")]
    Precondition(String),
}

pub type TallyResult<T> = Result<T, TallyError>;
