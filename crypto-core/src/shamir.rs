// Copyright (C) Microsoft Corporation. All rights reserved.

//! Byte-wise `(k, n)` Shamir secret sharing over GF(2^8), used to split
//! the Paillier private key's prime factors across guardians, per
//! spec.md §4.2 ("Crypto Core" threshold splitting). Mirrors the
//! original reference implementation's use of `pyshamir`
//! (`examples/original_source/abci_app/crypto_utils.py`), reimplemented
//! natively instead of pulled in as a dependency since no maintained
//! Rust crate implements the same byte-wise GF(2^8) scheme.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use util::csprng::Csprng;

use crate::error::{CryptoError, CryptoResult};
use crate::paillier::{PaillierPrivateKey, PaillierPublicKey};

const FIELD_SIZE: usize = 256;

struct GfTables {
    exp: [u8; 512],
    log: [u8; FIELD_SIZE],
}

lazy_static! {
    /// Precomputed GF(2^8) exponent/log tables using the AES
    /// reduction polynomial `x^8 + x^4 + x^3 + x + 1` (0x11b), built
    /// once and shared across every split/combine call.
    static ref GF: GfTables = build_gf_tables();
}

fn build_gf_tables() -> GfTables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; FIELD_SIZE];

    let mut x: u16 = 1;
    for i in 0..255usize {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= 0x11b;
        }
    }
    for i in 255..512 {
        exp[i] = exp[i - 255];
    }

    GfTables { exp, log }
}

fn gf_add(a: u8, b: u8) -> u8 {
    a ^ b
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let log_sum = GF.log[a as usize] as usize + GF.log[b as usize] as usize;
    GF.exp[log_sum]
}

fn gf_pow(a: u8, power: u8) -> u8 {
    if power == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    let log_product = (GF.log[a as usize] as usize * power as usize) % 255;
    GF.exp[log_product]
}

fn gf_inv(a: u8) -> u8 {
    debug_assert!(a != 0, "zero has no multiplicative inverse in GF(2^8)");
    GF.exp[255 - GF.log[a as usize] as usize]
}

/// One guardian's share of a split secret: a share index in `1..=255`
/// and the corresponding byte vector for each of the Paillier prime
/// factors `p` and `q`.
///
/// Share bytes are serialized as lowercase hex (`util::hex_serde`) so
/// that the genesis file stays human-inspectable, matching the
/// decimal/hex string conventions used elsewhere for big integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub index: u8,
    #[serde(with = "util::hex_serde")]
    pub p_share: Vec<u8>,
    #[serde(with = "util::hex_serde")]
    pub q_share: Vec<u8>,
}

/// Splits `secret` into `n_shares` shares such that any `threshold` of
/// them reconstruct the secret, per spec.md §4.2's Invariant 4
/// ("k-of-n reconstruction must succeed, fewer than k must not").
///
/// Returns `(index, share_bytes)` pairs; `index` never takes the value
/// `0`, which is reserved for the secret itself in the underlying
/// polynomial evaluation.
pub fn split_secret(
    secret: &[u8],
    n_shares: u8,
    threshold: u8,
    csprng: &mut Csprng,
) -> CryptoResult<Vec<(u8, Vec<u8>)>> {
    if threshold < 2 || threshold > n_shares {
        return Err(CryptoError::Share(format!(
            "threshold {threshold} must be in 2..={n_shares}"
        )));
    }
    if n_shares == 0 || n_shares as usize >= FIELD_SIZE {
        return Err(CryptoError::Share(format!(
            "n_shares {n_shares} must be in 1..{FIELD_SIZE}"
        )));
    }

    let mut shares: Vec<(u8, Vec<u8>)> = (1..=n_shares).map(|i| (i, Vec::with_capacity(secret.len()))).collect();

    for &secret_byte in secret {
        // Random polynomial of degree (threshold - 1) with the secret
        // byte as the constant term.
        let mut coefficients = vec![secret_byte];
        for _ in 1..threshold {
            coefficients.push(csprng.next_u8());
        }

        for (index, share_bytes) in shares.iter_mut() {
            let x = *index;
            let mut y = 0u8;
            for &coeff in coefficients.iter().rev() {
                // Horner's method: y = y*x + coeff, in GF(2^8).
                y = gf_add(gf_mul(y, x), coeff);
            }
            share_bytes.push(y);
        }
    }

    Ok(shares)
}

/// Reconstructs the original secret bytes from `shares` via Lagrange
/// interpolation at `x = 0`. Any `threshold` (or more) correct shares
/// reconstruct the same secret; fewer, or shares produced under a
/// different polynomial, silently reconstruct garbage rather than
/// erroring — the caller is expected to validate the result (e.g.
/// `recover_private_key`'s `p * q == n` check).
pub fn combine_shares(shares: &[(u8, Vec<u8>)]) -> CryptoResult<Vec<u8>> {
    if shares.is_empty() {
        return Err(CryptoError::Share("no shares supplied".to_string()));
    }
    let len = shares[0].1.len();
    if shares.iter().any(|(_, bytes)| bytes.len() != len) {
        return Err(CryptoError::Share(
            "shares have mismatched lengths".to_string(),
        ));
    }
    let indices: Vec<u8> = shares.iter().map(|(i, _)| *i).collect();
    if indices.iter().any(|&i| i == 0) {
        return Err(CryptoError::Share("share index 0 is reserved".to_string()));
    }
    let mut sorted_indices = indices.clone();
    sorted_indices.sort_unstable();
    sorted_indices.dedup();
    if sorted_indices.len() != indices.len() {
        return Err(CryptoError::Share(
            "shares have duplicate indices".to_string(),
        ));
    }

    let mut secret = Vec::with_capacity(len);
    for byte_pos in 0..len {
        let mut acc = 0u8;
        for (i, share_i) in shares.iter().enumerate() {
            let xi = share_i.0;
            let yi = share_i.1[byte_pos];

            // Lagrange basis polynomial l_i(0) = prod_{j != i} xj / (xj - xi).
            let mut numerator = 1u8;
            let mut denominator = 1u8;
            for (j, share_j) in shares.iter().enumerate() {
                if i == j {
                    continue;
                }
                let xj = share_j.0;
                numerator = gf_mul(numerator, xj);
                denominator = gf_mul(denominator, gf_add(xj, xi));
            }
            let basis = gf_mul(numerator, gf_inv(denominator));
            acc = gf_add(acc, gf_mul(yi, basis));
        }
        secret.push(acc);
    }

    Ok(secret)
}

/// Splits both prime factors of `private_key` into `n_shares` per-
/// guardian `Share`s requiring `threshold` to reconstruct, per
/// spec.md §4.2's `split_private_key`.
pub fn split_private_key(
    private_key: &PaillierPrivateKey,
    n_shares: u8,
    threshold: u8,
    csprng: &mut Csprng,
) -> CryptoResult<Vec<Share>> {
    let p_bytes = private_key.p().to_bytes_be();
    let q_bytes = private_key.q().to_bytes_be();

    let p_shares = split_secret(&p_bytes, n_shares, threshold, csprng)?;
    let q_shares = split_secret(&q_bytes, n_shares, threshold, csprng)?;

    Ok(p_shares
        .into_iter()
        .zip(q_shares)
        .map(|((index, p_share), (_, q_share))| Share {
            index,
            p_share,
            q_share,
        })
        .collect())
}

/// Reconstructs a `PaillierPrivateKey` from a set of guardian shares,
/// recomputing `λ` and `μ` and validating the result against the
/// known public modulus. Returns `CryptoError::KeyRecoveryMismatch` if
/// the reconstructed `p * q` does not equal `public_key.n()` — e.g.
/// because fewer than `threshold` shares were supplied (spec.md §4.2,
/// scenario S5).
pub fn recover_private_key(
    shares: &[Share],
    public_key: &PaillierPublicKey,
) -> CryptoResult<PaillierPrivateKey> {
    let p_shares: Vec<(u8, Vec<u8>)> = shares
        .iter()
        .map(|s| (s.index, s.p_share.clone()))
        .collect();
    let q_shares: Vec<(u8, Vec<u8>)> = shares
        .iter()
        .map(|s| (s.index, s.q_share.clone()))
        .collect();

    // Wrapped so the reconstructed prime-factor bytes are wiped from
    // memory once `p`/`q` have been parsed out of them, per spec.md
    // §9's "Private key lifetime" note.
    let p_bytes = Zeroizing::new(combine_shares(&p_shares)?);
    let q_bytes = Zeroizing::new(combine_shares(&q_shares)?);

    let p = num_bigint::BigUint::from_bytes_be(&p_bytes);
    let q = num_bigint::BigUint::from_bytes_be(&q_bytes);

    if &p * &q != *public_key.n() {
        return Err(CryptoError::KeyRecoveryMismatch);
    }

    use num_integer::Integer;
    let lambda = (&p - 1u8).lcm(&(&q - 1u8));
    let mu = crate::paillier::mod_inverse_pub(&lambda, public_key.n())
        .ok_or(CryptoError::KeyRecoveryMismatch)?;

    Ok(PaillierPrivateKey::from_parts(p, q, lambda, mu, public_key.clone()))
}
