// Copyright (C) Microsoft Corporation. All rights reserved.

//! Random probable-prime generation, using the trial-division-then-
//! Miller-Rabin structure of the teacher's `util::prime::is_prime`
//! (`examples/microsoft-electionguard-rust/src/util/src/prime.rs`),
//! adapted to *generate* a prime of a requested bit length rather than
//! just testing a given number.

use std::num::NonZeroUsize;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

use util::csprng::Csprng;

const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

const MILLER_RABIN_ITERATIONS: usize = 40;

/// Generates a random odd number of the requested bit length (top and
/// bottom bits set) and returns it once it passes a Miller-Rabin test,
/// per spec.md §4.1's "must use a cryptographically secure source of
/// randomness".
pub fn random_prime(csprng: &mut Csprng, bits: usize) -> BigUint {
    assert!(bits >= 2, "prime generation requires at least 2 bits");
    let nz_bits = NonZeroUsize::new(bits).expect("bits checked nonzero above");

    loop {
        let mut candidate = csprng.next_biguint_requiring_bits(nz_bits);
        candidate.set_bit(0, true); // force odd

        if passes_small_prime_sieve(&candidate) && is_prime(&candidate, csprng) {
            return candidate;
        }
    }
}

fn passes_small_prime_sieve(n: &BigUint) -> bool {
    for &p in SMALL_PRIMES.iter() {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }
    true
}

fn is_prime(n: &BigUint, csprng: &mut Csprng) -> bool {
    if *n < BigUint::from(2u8) {
        return false;
    }
    if *n == BigUint::from(2u8) {
        return true;
    }
    if n.is_even() {
        return false;
    }
    miller_rabin(n, MILLER_RABIN_ITERATIONS, csprng)
}

/// Miller-Rabin primality test per NIST FIPS 186-5 B.3.1, following the
/// structure of the teacher's `miller_rabin` in `util::prime`.
fn miller_rabin(w: &BigUint, iterations: usize, csprng: &mut Csprng) -> bool {
    debug_assert!(w.is_odd() && *w > BigUint::one());

    let w_minus_1 = w - 1u8;

    // Largest `a` such that 2^a divides `w - 1`.
    let mut a: u64 = 0;
    let mut m = w_minus_1.clone();
    while m.is_even() {
        m >>= 1u32;
        a += 1;
    }

    #[allow(clippy::unwrap_used)]
    let wlen = NonZeroUsize::new(w.bits() as usize).unwrap();
    let two = BigUint::from(2u8);

    'iterations: for _ in 0..iterations {
        let b = loop {
            let b = csprng.next_biguint(wlen);
            if b > BigUint::one() && b < w_minus_1 {
                break b;
            }
        };

        let mut z = b.modpow(&m, w);
        if z.is_one() || z == w_minus_1 {
            continue 'iterations;
        }

        for _ in 1..a {
            z = z.modpow(&two, w);
            if z == w_minus_1 {
                continue 'iterations;
            }
            if z.is_one() {
                return false;
            }
        }

        return false;
    }

    true
}
