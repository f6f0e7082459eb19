use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque trade identifier carried through for traceability only.
///
/// Storage may hand us integers or strings; both are kept as their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradeId(pub String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic dataset hash (content hash of the normalized trade set)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// BLAKE3 over raw bytes, hex encoded.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_id_display() {
        assert_eq!(TradeId::new("42").to_string(), "42");
    }

    #[test]
    fn dataset_hash_is_deterministic() {
        let a = DatasetHash::from_bytes(b"trades");
        let b = DatasetHash::from_bytes(b"trades");
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
        assert_ne!(a, DatasetHash::from_bytes(b"other"));
    }
}
