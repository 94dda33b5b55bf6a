// Copyright (C) Microsoft Corporation. All rights reserved.

//! `generate-keys`: produces a fresh Paillier keypair and splits the
//! private key across `n` guardian shares, per spec.md §4.4. Grounded
//! on `original_source/scripts/admin_cli.py`'s `generate_keys` command.

use std::path::Path;

use serde::Serialize;
use util::csprng::Csprng;

use crate::error::TallyResult;

#[derive(Serialize)]
struct SharesFile<'a> {
    shares: &'a [crypto_core::Share],
    threshold: u8,
}

/// Generates a `key_length`-bit-modulus Paillier keypair, writes the
/// public key to `pubkey_path`, splits the private key into `nodes`
/// shares requiring `threshold` to reconstruct, and writes them to
/// `shares_path`. The private key is dropped (and zeroized) as soon as
/// the shares file is written — it never touches disk in whole form.
pub fn generate_keys(
    nodes: u8,
    threshold: u8,
    key_length: usize,
    pubkey_path: &Path,
    shares_path: &Path,
) -> TallyResult<()> {
    let mut csprng = Csprng::new();

    tracing::info!(key_length, "generating Paillier keypair");
    let (public_key, private_key) = crypto_core::generate_keypair(key_length, &mut csprng)?;

    if let Some(parent) = pubkey_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let pubkey_json = serde_json::to_vec_pretty(&public_key)?;
    std::fs::write(pubkey_path, pubkey_json)?;
    tracing::info!(path = %pubkey_path.display(), "wrote public key");

    tracing::info!(nodes, threshold, "splitting private key into guardian shares");
    let shares = crypto_core::shamir::split_private_key(&private_key, nodes, threshold, &mut csprng)?;
    drop(private_key);

    if let Some(parent) = shares_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let shares_json = serde_json::to_vec_pretty(&SharesFile {
        shares: &shares,
        threshold,
    })?;
    std::fs::write(shares_path, shares_json)?;
    tracing::info!(path = %shares_path.display(), "wrote guardian shares");

    Ok(())
}
