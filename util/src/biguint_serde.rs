// Copyright (C) Microsoft Corporation. All rights reserved.

//! Canonical decimal-string serde for [`BigUint`], in the spirit of the
//! teacher's `biguint_serde` module. The teacher's version fixes the
//! serialized bit width (256 or 4096) because every field it serializes
//! belongs to a fixed-size algebraic group; a Paillier modulus has a
//! caller-chosen bit length, so this variant serializes the full decimal
//! value instead of a fixed-width hex string.

use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(u: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    u.to_str_radix(10).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    BigUint::from_str_radix(&s, 10).map_err(D::Error::custom)
}
