//! Object digests.
//!
//! Every object is named by the BLAKE3 digest of its encoded bytes and is
//! written out as 64 lower-case hex characters.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Length of the abbreviated form used in diff headers and log lines.
pub const SHORT_HEX_LEN: usize = 7;

/// Hex characters naming the shard directory of an object.
const SHARD_HEX_LEN: usize = 2;

/// Digest algorithm recorded in the repository config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Blake3,
}

impl Algorithm {
    /// Name written as `algo=` in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Blake3 => "blake3-256",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name.trim() {
            "blake3-256" => Ok(Algorithm::Blake3),
            other => Err(Error::unsupported_algorithm(other)),
        }
    }
}

/// Identity of a stored object.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; DIGEST_LEN]);

impl Hash {
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Hash(bytes)
    }

    /// Parse the full 64-character hex form.
    pub fn from_hex(text: &str) -> Result<Self> {
        let decoded = hex::decode(text)
            .map_err(|e| Error::invalid_hash(format!("'{}' is not hex: {}", text, e)))?;

        let bytes: [u8; DIGEST_LEN] = decoded.try_into().map_err(|raw: Vec<u8>| {
            Error::invalid_hash(format!(
                "expected {} hex characters, got {}",
                DIGEST_LEN * 2,
                raw.len() * 2
            ))
        })?;

        Ok(Hash(bytes))
    }

    /// Digest of arbitrary bytes.
    pub fn hash_bytes(data: &[u8]) -> Self {
        Hash(blake3::hash(data).into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(SHORT_HEX_LEN);
        hex
    }

    /// Name of the object's shard directory.
    pub fn shard(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(SHARD_HEX_LEN);
        hex
    }

    /// File name of the object inside its shard.
    pub fn object_name(&self) -> String {
        self.to_hex().split_off(SHARD_HEX_LEN)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.short())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Hash::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter storing `Option<Hash>` as a hex string, with `""` for `None`.
pub(crate) mod hex_or_empty {
    use super::Hash;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Hash>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(hash) => serializer.serialize_str(&hash.to_hex()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Hash>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(None);
        }
        Hash::from_hex(&text)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = Hash::hash_bytes(b"hello world");
        assert_eq!(
            hash.to_hex(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
        assert_eq!(hash.short(), "d74981e");
        assert_eq!(format!("{:?}", hash), "Hash(d74981e)");
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(
            Hash::from_hex("abcd").unwrap_err(),
            Error::InvalidHash { .. }
        ));
        assert!(Hash::from_hex("").is_err());
        assert!(Hash::from_hex(&"g".repeat(64)).is_err());
        assert!(Hash::from_hex(&"a".repeat(66)).is_err());
    }

    #[test]
    fn test_shard_layout() {
        let hash = Hash::hash_bytes(b"blob 5\0hello");

        assert_eq!(hash.shard().len(), 2);
        assert_eq!(hash.object_name().len(), 62);
        assert_eq!(hash.shard() + &hash.object_name(), hash.to_hex());
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let hash = Hash::hash_bytes(b"serde");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash));

        assert_eq!(serde_json::from_str::<Hash>(&json).unwrap(), hash);
        assert!(serde_json::from_str::<Hash>("\"nothex\"").is_err());
    }

    #[test]
    fn test_hex_or_empty() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Parent {
            #[serde(with = "hex_or_empty")]
            parent: Option<Hash>,
        }

        let root = Parent { parent: None };
        assert_eq!(serde_json::to_string(&root).unwrap(), r#"{"parent":""}"#);

        let child = Parent {
            parent: Some(Hash::hash_bytes(b"p")),
        };
        let json = serde_json::to_string(&child).unwrap();
        assert_eq!(serde_json::from_str::<Parent>(&json).unwrap(), child);
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(Algorithm::Blake3.as_str(), "blake3-256");
        assert_eq!(Algorithm::parse("blake3-256").unwrap(), Algorithm::Blake3);
        assert!(matches!(
            Algorithm::parse("sha1").unwrap_err(),
            Error::UnsupportedAlgorithm { .. }
        ));
    }

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        #[test]
        fn prop_same_bytes_same_digest(data: Vec<u8>) {
            prop_assert_eq!(Hash::hash_bytes(&data), Hash::hash_bytes(&data));
        }

        #[test]
        fn prop_hex_form_parses_back(bytes in prop::array::uniform32(any::<u8>())) {
            let hash = Hash::from_bytes(bytes);
            prop_assert_eq!(Hash::from_hex(&hash.to_hex()).unwrap(), hash);
            prop_assert!(hash.to_hex().starts_with(&hash.short()));
        }

        #[test]
        fn prop_wrong_length_is_rejected(s in "([0-9a-f]{2}){0,31}|([0-9a-f]{2}){33,40}") {
            prop_assert!(Hash::from_hex(&s).is_err());
        }
    }
}
