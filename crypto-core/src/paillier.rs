// Copyright (C) Microsoft Corporation. All rights reserved.

//! Paillier additively-homomorphic public-key cryptosystem, per
//! spec.md §4.1 ("Crypto Core"). Key generation follows the same
//! probable-prime construction as the teacher's guardian key generation
//! (`examples/microsoft-electionguard-rust/src/eg/src/guardian_secret_key.rs`),
//! substituted with the Paillier `n = p*q`, `λ = lcm(p-1, q-1)` scheme
//! instead of ElGamal.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use util::csprng::Csprng;

use crate::error::{CryptoError, CryptoResult};
use crate::primes::random_prime;

/// A Paillier public key, i.e. the modulus `n = p*q`.
///
/// Serialized as a decimal string (see `util::biguint_serde`), matching
/// the teacher's convention of never emitting big integers as native
/// JSON numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaillierPublicKey {
    #[serde(with = "util::biguint_serde")]
    n: BigUint,
}

impl PaillierPublicKey {
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn n_squared(&self) -> BigUint {
        &self.n * &self.n
    }
}

/// A Paillier private key: the two primes (best-effort zeroized on
/// drop) plus the precomputed `λ` and `μ` used for decryption.
pub struct PaillierPrivateKey {
    p: BigUint,
    q: BigUint,
    lambda: BigUint,
    mu: BigUint,
    public_key: PaillierPublicKey,
}

impl PaillierPrivateKey {
    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public_key
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Assembles a private key from its already-reconstructed parts.
    /// Used by `shamir::recover_private_key` once enough guardian
    /// shares have been combined back into `p` and `q`.
    pub(crate) fn from_parts(
        p: BigUint,
        q: BigUint,
        lambda: BigUint,
        mu: BigUint,
        public_key: PaillierPublicKey,
    ) -> Self {
        PaillierPrivateKey {
            p,
            q,
            lambda,
            mu,
            public_key,
        }
    }
}

impl fmt::Debug for PaillierPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaillierPrivateKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl Drop for PaillierPrivateKey {
    fn drop(&mut self) {
        // BigUint carries no in-place zeroizing erase; overwriting with
        // zero is the same best-effort the teacher settles for on
        // heap-allocated bignums in `guardian_secret_key.rs`.
        self.p = BigUint::zero();
        self.q = BigUint::zero();
        self.lambda = BigUint::zero();
        self.mu = BigUint::zero();
    }
}

/// An encrypted plaintext under some `PaillierPublicKey`. Serialized as
/// a decimal string so it round-trips through JSON as a single scalar
/// value (spec.md §4.3's canonical-state requirement), rather than as
/// a struct with a `ciphertext` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedNumber {
    ciphertext: BigUint,
}

impl EncryptedNumber {
    pub fn ciphertext(&self) -> &BigUint {
        &self.ciphertext
    }

    pub fn to_decimal_string(&self) -> String {
        self.ciphertext.to_str_radix(10)
    }

    pub fn from_decimal_str(s: &str) -> CryptoResult<Self> {
        let ciphertext = s
            .parse::<BigUint>()
            .map_err(|e| CryptoError::Range(format!("invalid ciphertext {s:?}: {e}")))?;
        Ok(EncryptedNumber { ciphertext })
    }

    /// The canonical encryption of zero used to seed a fresh tally
    /// (spec.md §9): the raw ciphertext value `1`, which under any
    /// Paillier modulus decrypts to plaintext `0` without needing a
    /// public key at hand.
    pub fn canonical_zero() -> Self {
        EncryptedNumber {
            ciphertext: BigUint::one(),
        }
    }
}

impl Serialize for EncryptedNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for EncryptedNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EncryptedNumber::from_decimal_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Generates a fresh Paillier keypair with two primes of roughly
/// `bits / 2` bits each, so the modulus `n = p * q` comes out `bits`
/// bits wide, per spec.md §4.1's
/// `generate_keypair(bits) -> (PublicKey, PrivateKey)`.
pub fn generate_keypair(
    bits: usize,
    csprng: &mut Csprng,
) -> CryptoResult<(PaillierPublicKey, PaillierPrivateKey)> {
    if bits < 16 {
        return Err(CryptoError::Keygen(format!(
            "modulus bit length {bits} is too small to be secure"
        )));
    }
    let prime_bits = bits / 2;

    loop {
        let p = random_prime(csprng, prime_bits);
        let q = random_prime(csprng, prime_bits);
        if p == q {
            continue;
        }

        let n = &p * &q;
        let p_minus_1 = &p - 1u8;
        let q_minus_1 = &q - 1u8;
        let lambda = p_minus_1.lcm(&q_minus_1);

        // g = n + 1 gives L(g^λ mod n^2) = λ, so μ = λ^-1 mod n.
        let mu = match mod_inverse(&lambda, &n) {
            Some(mu) => mu,
            None => continue,
        };

        let public_key = PaillierPublicKey { n };
        let private_key = PaillierPrivateKey {
            p,
            q,
            lambda,
            mu,
            public_key: public_key.clone(),
        };
        return Ok((public_key, private_key));
    }
}

/// Encrypts `m` (reduced mod `n`) under `public_key`, sampling a fresh
/// random nonce `r` coprime to `n` as required by spec.md §4.1's
/// Invariant 2 ("encryption must be probabilistic").
pub fn encrypt(
    public_key: &PaillierPublicKey,
    m: &BigUint,
    csprng: &mut Csprng,
) -> CryptoResult<EncryptedNumber> {
    let n = public_key.n();
    if m >= n {
        return Err(CryptoError::Range(format!(
            "plaintext {m} is not smaller than modulus {n}"
        )));
    }
    let n_squared = public_key.n_squared();

    let r = loop {
        let candidate = csprng.next_biguint_lt(n);
        if candidate.gcd(n).is_one() && !candidate.is_zero() {
            break candidate;
        }
    };

    // c = g^m * r^n mod n^2, with g = n + 1 simplified to
    // (1 + m*n) mod n^2 as is standard for this fixed generator.
    let gm = (BigUint::one() + m * n) % &n_squared;
    let rn = r.modpow(n, &n_squared);
    let ciphertext = (gm * rn) % &n_squared;

    Ok(EncryptedNumber { ciphertext })
}

/// Decrypts `c` under `private_key`, returning the plaintext reduced
/// mod `n`.
pub fn decrypt(private_key: &PaillierPrivateKey, c: &EncryptedNumber) -> CryptoResult<BigUint> {
    let n = private_key.public_key.n();
    let n_squared = private_key.public_key.n_squared();

    if c.ciphertext >= n_squared {
        return Err(CryptoError::Range(
            "ciphertext is not smaller than n^2".to_string(),
        ));
    }

    let u = c.ciphertext.modpow(&private_key.lambda, &n_squared);
    let l = l_function(&u, n);
    Ok((l * &private_key.mu) % n)
}

/// Homomorphically adds two ciphertexts encrypted under the same
/// public key, per spec.md §4.1's Invariant 5 ("additive homomorphism
/// must hold"): `add(E(a), E(b)) = E(a + b)`.
pub fn add(
    public_key: &PaillierPublicKey,
    c1: &EncryptedNumber,
    c2: &EncryptedNumber,
) -> CryptoResult<EncryptedNumber> {
    let n_squared = public_key.n_squared();
    if c1.ciphertext >= n_squared || c2.ciphertext >= n_squared {
        return Err(CryptoError::Domain);
    }
    let ciphertext = (&c1.ciphertext * &c2.ciphertext) % &n_squared;
    Ok(EncryptedNumber { ciphertext })
}

/// `L(x) = (x - 1) / n`, the standard Paillier decryption helper.
fn l_function(x: &BigUint, n: &BigUint) -> BigUint {
    (x - 1u8) / n
}

/// Modular inverse of `a` mod `n`, via the extended Euclidean
/// algorithm over signed integers. Returns `None` if `a` and `n` are
/// not coprime. Exposed crate-wide as `mod_inverse_pub` for
/// `shamir::recover_private_key`, which needs to recompute `μ` after
/// reconstructing `λ` from guardian shares.
pub(crate) fn mod_inverse_pub(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    mod_inverse(a, n)
}

fn mod_inverse(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    let a = BigInt::from(a.clone());
    let n = BigInt::from(n.clone());
    let (gcd, x, _y) = a.extended_gcd(&n);
    if gcd != BigInt::one() {
        return None;
    }
    let result = ((x % &n) + &n) % &n;
    result.to_biguint()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csprng() -> Csprng {
        Csprng::new()
    }

    #[test]
    fn encrypts_and_decrypts_round_trip() {
        let mut csprng = csprng();
        let (pk, sk) = generate_keypair(256, &mut csprng).unwrap();

        for m in [0u32, 1, 42, 1_000_000] {
            let m = BigUint::from(m);
            let c = encrypt(&pk, &m, &mut csprng).unwrap();
            let decrypted = decrypt(&sk, &c).unwrap();
            assert_eq!(decrypted, m);
        }
    }

    #[test]
    fn is_additively_homomorphic() {
        let mut csprng = csprng();
        let (pk, sk) = generate_keypair(256, &mut csprng).unwrap();

        let a = BigUint::from(17u32);
        let b = BigUint::from(25u32);

        let ca = encrypt(&pk, &a, &mut csprng).unwrap();
        let cb = encrypt(&pk, &b, &mut csprng).unwrap();
        let sum_ciphertext = add(&pk, &ca, &cb).unwrap();

        let decrypted_sum = decrypt(&sk, &sum_ciphertext).unwrap();
        assert_eq!(decrypted_sum, &a + &b);
    }

    #[test]
    fn canonical_zero_decrypts_to_zero_under_any_key() {
        let mut csprng = csprng();
        let (_pk, sk) = generate_keypair(256, &mut csprng).unwrap();
        let zero = EncryptedNumber::canonical_zero();
        assert_eq!(decrypt(&sk, &zero).unwrap(), BigUint::zero());
    }

    #[test]
    fn same_plaintext_encrypts_to_different_ciphertexts() {
        let mut csprng = csprng();
        let (pk, _sk) = generate_keypair(256, &mut csprng).unwrap();
        let m = BigUint::from(7u32);
        let c1 = encrypt(&pk, &m, &mut csprng).unwrap();
        let c2 = encrypt(&pk, &m, &mut csprng).unwrap();
        assert_ne!(c1, c2);
    }

    #[test]
    fn decimal_string_round_trips() {
        let mut csprng = csprng();
        let (pk, _sk) = generate_keypair(256, &mut csprng).unwrap();
        let c = encrypt(&pk, &BigUint::from(3u32), &mut csprng).unwrap();
        let s = c.to_decimal_string();
        let parsed = EncryptedNumber::from_decimal_str(&s).unwrap();
        assert_eq!(c, parsed);
    }

    #[test]
    fn rejects_plaintext_out_of_range() {
        let mut csprng = csprng();
        let (pk, _sk) = generate_keypair(256, &mut csprng).unwrap();
        let too_big = pk.n().clone();
        assert!(matches!(
            encrypt(&pk, &too_big, &mut csprng),
            Err(CryptoError::Range(_))
        ));
    }
}
