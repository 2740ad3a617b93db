//! Serde helpers for the loosely typed backend payloads
//!
//! The backend encodes booleans as `true`/`false`, `0`/`1` or `"0"`/`"1"`
//! depending on the endpoint, and uses `0` as "no parent". These helpers
//! normalize all of them at the deserialization boundary so the rest of
//! the workspace only ever sees `bool` and `Option<ModuleId>`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

struct LooseBoolVisitor;

impl<'de> Visitor<'de> for LooseBoolVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean, 0/1 or \"0\"/\"1\"")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        match v.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(E::custom(format!("invalid boolean flag: {other}"))),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(LooseBoolVisitor)
    }
}

/// Deserialize a flag that may arrive as bool, number or numeric string.
/// `null` is treated as false.
pub fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LooseBoolVisitor)
}

/// Default for flags that are on unless the payload says otherwise
pub fn default_true() -> bool {
    true
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
///
/// Pair with `#[serde(default)]` so a missing field stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parent id where `0` and `null` both mean "no parent"
pub mod parent_id {
    use super::*;

    pub fn serialize<S>(id: &Option<i64>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_i64(id.unwrap_or(0))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<LooseInt>::deserialize(deserializer)?;
        Ok(raw.map(|v| v.0).filter(|id| *id > 0))
    }
}

/// Integer that may arrive as a JSON number or a numeric string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LooseInt(pub i64);

impl<'de> Deserialize<'de> for LooseInt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LooseIntVisitor;

        impl<'de> Visitor<'de> for LooseIntVisitor {
            type Value = LooseInt;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<LooseInt, E> {
                Ok(LooseInt(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<LooseInt, E> {
                i64::try_from(v)
                    .map(LooseInt)
                    .map_err(|_| E::custom(format!("integer out of range: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LooseInt, E> {
                v.trim()
                    .parse::<i64>()
                    .map(LooseInt)
                    .map_err(|_| E::custom(format!("invalid integer: {v}")))
            }
        }

        deserializer.deserialize_any(LooseIntVisitor)
    }
}
