//! Binary blob encoding for quick reload of saved data.
//!
//! The format is bincode and is only meant to be read back by this program.

use crate::error::NewsError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

pub const EXTENSION: &str = "bin";

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, NewsError> {
    Ok(bincode::serialize(value)?)
}

pub async fn load<T: DeserializeOwned>(path: &Path) -> Result<T, NewsError> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| NewsError::persistence(path, e))?;
    Ok(bincode::deserialize(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_truncated_blob_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.bin");
        let mut bytes = encode(&vec!["https://example.com/a".to_string()]).unwrap();
        bytes.truncate(bytes.len() / 2);
        std::fs::write(&path, bytes).unwrap();

        let result: Result<Vec<String>, _> = load(&path).await;
        assert!(matches!(result, Err(NewsError::Blob(_))));
    }
}
