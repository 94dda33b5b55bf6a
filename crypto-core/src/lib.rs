// Copyright (C) Microsoft Corporation. All rights reserved.

//! Pure cryptographic primitives for the voting ledger: Paillier
//! keygen/encrypt/decrypt/add, and GF(2^8) Shamir secret sharing of the
//! private key material. No I/O, no persistence, no networking — those
//! live in `voting-state`, `voting-ledger`, and `voting-tally`.

pub mod error;
pub mod paillier;
pub mod primes;
pub mod shamir;

pub use error::{CryptoError, CryptoResult};
pub use paillier::{EncryptedNumber, PaillierPrivateKey, PaillierPublicKey, generate_keypair};
pub use shamir::Share;
