//! Binary resource catalog (embedded images)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single binary resource stored in the package's `BinData/` directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// MIME type (e.g., "image/png", "image/jpeg")
    pub media_type: String,

    /// The resource bytes
    #[serde(with = "base64_serde")]
    pub data: Vec<u8>,

    /// SHA-256 of the bytes, used for deduplication
    pub digest: String,
}

impl Resource {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        let digest = digest_of(&data);
        Self {
            media_type: media_type.into(),
            data,
            digest,
        }
    }
}

/// Registry of binary resources keyed by `bin{N}` identifiers
///
/// Adding bytes that are already present (by content hash) returns the
/// existing identifier instead of storing a second copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceStore {
    items: BTreeMap<String, Resource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add resource bytes, returning their identifier
    pub fn add(&mut self, media_type: impl Into<String>, data: Vec<u8>) -> String {
        let resource = Resource::new(media_type, data);
        if let Some((id, _)) = self
            .items
            .iter()
            .find(|(_, existing)| existing.digest == resource.digest)
        {
            return id.clone();
        }
        let id = self.next_free_id();
        self.items.insert(id.clone(), resource);
        id
    }

    /// Insert a resource under an explicit identifier (codec use)
    pub fn insert(&mut self, id: impl Into<String>, resource: Resource) {
        self.items.insert(id.into(), resource);
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next unused `bin{N}` identifier
    fn next_free_id(&self) -> String {
        let max = self
            .items
            .keys()
            .filter_map(|id| id.strip_prefix("bin").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        format!("bin{}", max + 1)
    }
}

fn digest_of(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Sniff a media type from the leading magic bytes
pub(crate) fn sniff_media_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else {
        "application/octet-stream"
    }
}

/// Base64 serialization for binary data
mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_bin_ids() {
        let mut store = ResourceStore::new();
        let a = store.add("image/png", vec![1, 2, 3]);
        let b = store.add("image/png", vec![4, 5, 6]);
        assert_eq!(a, "bin1");
        assert_eq!(b, "bin2");
    }

    #[test]
    fn test_duplicate_bytes_are_deduplicated() {
        let mut store = ResourceStore::new();
        let a = store.add("image/png", vec![1, 2, 3]);
        let b = store.add("image/png", vec![1, 2, 3]);
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sniff_media_type() {
        assert_eq!(sniff_media_type(&[0x89, b'P', b'N', b'G', 0, 0]), "image/png");
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_media_type(b"plain"), "application/octet-stream");
    }
}
