// Copyright (C) Microsoft Corporation. All rights reserved.

//! Lowercase-hex serde for `Vec<u8>` share material, used for the
//! `p_share`/`q_share` fields of a Shamir [`Share`](crate) and for the
//! on-disk shares file. Mirrors the hex encoding the teacher applies to
//! fixed-width group elements in `util::base16`, generalized to
//! variable-length byte strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    hex::encode(bytes).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    hex::decode(&s).map_err(D::Error::custom)
}
