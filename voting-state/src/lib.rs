// Copyright (C) Microsoft Corporation. All rights reserved.

//! The voting ledger's persisted state: canonical serialization,
//! app-hash, and atomic on-disk storage. No networking, no transaction
//! parsing — those live in `voting-ledger`.

pub mod error;
pub mod state;

pub use error::{StateError, StateResult};
pub use state::VotingState;
