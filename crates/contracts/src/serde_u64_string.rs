//! Serde adapters that keep 64-bit seeds intact across JSON boundaries
//! (JSON numbers lose precision past 2^53, so seeds travel as strings).

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum U64Input {
        String(String),
        Number(u64),
    }

    match U64Input::deserialize(deserializer)? {
        U64Input::String(raw) => raw.parse::<u64>().map_err(D::Error::custom),
        U64Input::Number(value) => Ok(value),
    }
}

/// Variant for `Option<u64>` fields (absent island seeds).
pub mod option {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(seed) => serializer.serialize_some(&seed.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum U64Input {
            String(String),
            Number(u64),
        }

        match Option::<U64Input>::deserialize(deserializer)? {
            Some(U64Input::String(raw)) => raw
                .parse::<u64>()
                .map(Some)
                .map_err(D::Error::custom),
            Some(U64Input::Number(value)) => Ok(Some(value)),
            None => Ok(None),
        }
    }
}
