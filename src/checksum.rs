//! Checksum utilities for generated artifacts

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 checksum of generated content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from text
    pub fn compute(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }

    /// Verify that content matches this checksum
    pub fn verify(&self, content: &str) -> bool {
        *self == Self::compute(content)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::BANNER;

    const IDS: &str = "export const ids = { ComExampleA: 'com.example.a' }\n";

    #[test]
    fn test_regenerated_artifact_keeps_checksum() {
        let first = Checksum::compute(&format!("{}{}", BANNER, IDS));
        let second = Checksum::compute(&format!("{}{}", BANNER, IDS));
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
        assert_eq!(first.to_string(), first.as_str());
    }

    #[test]
    fn test_missing_banner_changes_checksum() {
        let with_banner = Checksum::compute(&format!("{}{}", BANNER, IDS));
        assert_ne!(with_banner, Checksum::compute(IDS));
        assert!(!with_banner.verify(IDS));
    }

    #[test]
    fn test_hand_edited_artifact_fails_verification() {
        let generated = format!("{}{}", BANNER, IDS);
        let checksum = Checksum::compute(&generated);
        assert!(checksum.verify(&generated));
        assert!(!checksum.verify(&generated.replace("com.example.a", "com.example.b")));
        assert!(!checksum.verify(&format!("{}\n", generated)));
    }

    #[test]
    fn test_short_prefix_for_log_lines() {
        let checksum = Checksum::compute(IDS);
        assert_eq!(checksum.short().len(), 12);
        assert!(checksum.as_str().starts_with(checksum.short()));
        assert_eq!(Checksum::from_bytes(IDS.as_bytes()), checksum);
    }
}
