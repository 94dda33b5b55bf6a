// Copyright (C) Microsoft Corporation. All rights reserved.

//! The tally controller: key generation, genesis fragment emission,
//! and the tally orchestration, per spec.md §4.4.

pub mod error;
pub mod genesis;
pub mod keygen;
pub mod rpc;
pub mod tally;

pub use error::{TallyError, TallyResult};
