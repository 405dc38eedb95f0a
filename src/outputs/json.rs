//! JSON encoding for persisted links and records.
//!
//! Output is UTF-8 and keeps non-ASCII characters unescaped, so headlines and
//! body text stay readable on disk.

use crate::error::NewsError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

pub const EXTENSION: &str = "json";

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, NewsError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Read and decode a JSON file written by [`encode`].
pub async fn load<T: DeserializeOwned>(path: &Path) -> Result<T, NewsError> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| NewsError::persistence(path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_utf8_not_escaped() {
        let bytes = encode(&vec!["Économie", "東京"]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Économie"));
        assert!(text.contains("東京"));
        assert!(!text.contains("\\u"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Vec<String>, _> = load(&dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(NewsError::Persistence { .. })));
    }
}
