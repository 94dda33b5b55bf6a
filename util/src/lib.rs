// Copyright (C) Microsoft Corporation. All rights reserved.

//! Ambient utilities shared by the voting-ledger workspace: a CSPRNG
//! wrapper, atomic file persistence, canonical bigint/hex serde helpers,
//! and `tracing` setup.

pub mod atomic_file;
pub mod biguint_serde;
pub mod csprng;
pub mod hex_serde;
pub mod logging;
