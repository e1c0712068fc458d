//! `#[serde(with = ...)]` adapter for game seeds: written as a decimal string,
//! read back from a string or a non-negative integer.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

pub fn serialize<S>(seed: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(seed)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(SeedVisitor)
}

struct SeedVisitor;

impl<'de> Visitor<'de> for SeedVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a seed as a decimal string or a non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, seed: u64) -> Result<u64, E> {
        Ok(seed)
    }

    fn visit_i64<E: de::Error>(self, seed: i64) -> Result<u64, E> {
        u64::try_from(seed).map_err(|_| E::custom(format!("seed must not be negative, got {seed}")))
    }

    fn visit_str<E: de::Error>(self, raw: &str) -> Result<u64, E> {
        raw.trim()
            .parse::<u64>()
            .map_err(|_| E::custom(format!("seed is not a u64: {raw:?}")))
    }
}
