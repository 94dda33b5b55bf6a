// Copyright (C) Microsoft Corporation. All rights reserved.

//! The ledger application: transaction grammar, the state-machine
//! callbacks, and the ABCI socket adapter, per spec.md §4.3.

pub mod abci;
pub mod ledger;
pub mod tx;

pub use abci::VotingApplication;
pub use ledger::{LedgerError, LedgerResult, VotingLedger, CODE_OK};
pub use tx::Transaction;
