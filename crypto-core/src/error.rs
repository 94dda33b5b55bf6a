// Copyright (C) Microsoft Corporation. All rights reserved.

/// The error type returned by `crypto-core`'s fallible operations, per
/// spec.md §7's `CryptoDomain`/`ShareInsufficient`/`KeyRecoveryMismatch`
/// kinds.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("key generation failed: {0}")]
    Keygen(String),

    #[error("plaintext {0} is out of range for this public key")]
    Range(String),

    #[error("ciphertexts do not share the same modulus")]
    Domain,

    #[error("share error: {0}")]
    Share(String),

    #[error("key recovery failed: reconstructed p*q does not match the public modulus")]
    KeyRecoveryMismatch,
}

pub type CryptoResult<T> = Result<T, CryptoError>;
