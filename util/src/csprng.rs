// Copyright (C) Microsoft Corporation. All rights reserved.

//! A small wrapper around the OS CSPRNG with the `BigUint`-producing
//! helpers the crypto layer needs. Structured after the teacher's
//! `Csprng` (a fixed-seed SHAKE256 XOF reader with the same set of
//! `next_biguint*` helpers); unlike the teacher's version this one is
//! backed by [`rand::rngs::OsRng`] because key generation and secret
//! sharing are genuinely security sensitive here, not reproducible-test
//! material.

use std::num::NonZeroUsize;

use num_bigint::BigUint;
use rand::RngCore;
use rand::rngs::OsRng;

pub struct Csprng {
    rng: OsRng,
}

impl Default for Csprng {
    fn default() -> Self {
        Self::new()
    }
}

impl Csprng {
    pub fn new() -> Self {
        Csprng { rng: OsRng }
    }

    /// Returns uniformly random bytes.
    pub fn next_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.rng.fill_bytes(&mut buf);
        buf
    }

    pub fn next_u8(&mut self) -> u8 {
        (self.rng.next_u32() & 0xff) as u8
    }

    /// Returns a random number chosen uniformly from `0 <= n < 2^bits`.
    pub fn next_biguint(&mut self, bits: NonZeroUsize) -> BigUint {
        let bits = bits.get();
        let cnt_bytes = bits.div_ceil(8);
        let mut buf = self.next_bytes(cnt_bytes);

        let cnt_bits_filled = cnt_bytes * 8;
        let cnt_extra_bits = cnt_bits_filled - bits;
        if cnt_extra_bits > 0 {
            let mask = !(((1u8 << cnt_extra_bits) - 1) << (8 - cnt_extra_bits));
            buf[0] &= mask;
        }

        BigUint::from_bytes_be(&buf)
    }

    /// Returns a random number requiring exactly `bits` bits to represent
    /// (the top bit is always set).
    pub fn next_biguint_requiring_bits(&mut self, bits: NonZeroUsize) -> BigUint {
        let mut n = self.next_biguint(bits);
        let top_bit = bits.get() - 1;
        n.set_bit(top_bit as u64, true);
        n
    }

    /// Returns a random number uniformly from `0 <= n < end`. `end` must
    /// be nonzero.
    pub fn next_biguint_lt(&mut self, end: &BigUint) -> BigUint {
        assert!(end.bits() > 0, "end must be greater than 0");
        #[allow(clippy::unwrap_used)]
        let bits = NonZeroUsize::new(end.bits() as usize).unwrap();
        loop {
            let n = self.next_biguint(bits);
            if &n < end {
                return n;
            }
        }
    }

    /// Returns a random number uniformly from `start <= n < end`.
    pub fn next_biguint_range(&mut self, start: &BigUint, end: &BigUint) -> BigUint {
        let diff = end - start;
        start + self.next_biguint_lt(&diff)
    }
}
