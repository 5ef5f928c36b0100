//! BLAKE3 helpers for cache keys and snapshot fingerprints.

use blake3::Hasher;

/// Full 32-byte digest of a normalized query, used as the query-vector cache key.
#[inline]
pub fn hash_query(normalized: &str) -> [u8; 32] {
    *blake3::hash(normalized.as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Fine for bucketing where a collision is harmless; anything that must not
/// collide uses the full digest from [`hash_query`] or [`Fingerprinter`].
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Incremental digest over the content of a catalog/matrix pair.
///
/// Fields are separated so that `("ab", "c")` and `("a", "bc")` hash differently.
pub struct Fingerprinter {
    hasher: Hasher,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    pub fn update_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn update_str(&mut self, value: &str) -> &mut Self {
        self.update_u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn update_f32s(&mut self, values: &[f32]) -> &mut Self {
        self.update_u64(values.len() as u64);
        for v in values {
            self.hasher.update(&v.to_le_bytes());
        }
        self
    }

    pub fn finalize(&self) -> [u8; 32] {
        *self.hasher.finalize().as_bytes()
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Short hex rendering of a digest prefix, for log fields.
pub fn short_hex(digest: &[u8; 32]) -> String {
    digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
}
