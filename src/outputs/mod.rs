//! Persistence of links and article records.
//!
//! # Submodules
//!
//! - [`json`]: UTF-8 JSON documents (non-ASCII text kept as-is)
//! - [`blob`]: compact binary blobs for fast reload by this program
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── links.json             # link list, JSON array
//! ├── links.bin              # same list, binary blob
//! └── 2021/
//!     └── 01/
//!         └── 05/
//!             ├── 10_30.json     # first article published 10:30 UTC
//!             └── 10_30_1.json   # second article in the same minute
//! ```

pub mod blob;
pub mod json;

use crate::error::NewsError;
use itertools::Itertools;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// Values that can be written under a base directory as JSON and as a blob.
///
/// `name` is a relative key without extension and may contain `/`
/// separators; missing directories are created.
pub trait Persistable: Serialize {
    /// Whether an existing file at the target path may be overwritten.
    /// When `false`, a numeric suffix is appended until a free name is found.
    fn replace_existing(&self) -> bool {
        true
    }

    async fn save_to_json(&self, base_dir: &Path, name: &str) -> Result<PathBuf, NewsError> {
        let bytes = json::encode(self)?;
        write_keyed(base_dir, name, json::EXTENSION, &bytes, self.replace_existing()).await
    }

    async fn save_to_file(&self, base_dir: &Path, name: &str) -> Result<PathBuf, NewsError> {
        let bytes = blob::encode(self)?;
        write_keyed(base_dir, name, blob::EXTENSION, &bytes, self.replace_existing()).await
    }
}

/// Key under which `path` was actually stored below `base_dir`.
///
/// This is the relative path with `/` separators and without extension, so a
/// suffixed write such as `2021/01/05/10_30_1.json` yields `2021/01/05/10_30_1`.
/// Returns `None` when `path` is not below `base_dir`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use news_pager::outputs::stored_key;
///
/// let key = stored_key(Path::new("out"), Path::new("out/2021/01/05/10_30_1.json"));
/// assert_eq!(key.as_deref(), Some("2021/01/05/10_30_1"));
/// ```
pub fn stored_key(base_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base_dir).ok()?.with_extension("");
    let key = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .join("/");
    (!key.is_empty()).then_some(key)
}

/// Write `bytes` to `{base_dir}/{name}.{ext}`, creating parent directories.
#[instrument(level = "debug", skip(base_dir, bytes), fields(base_dir = %base_dir.display()))]
async fn write_keyed(
    base_dir: &Path,
    name: &str,
    ext: &str,
    bytes: &[u8],
    replace: bool,
) -> Result<PathBuf, NewsError> {
    let path = base_dir.join(format!("{name}.{ext}"));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| NewsError::persistence(parent, e))?;
    }

    if replace {
        fs::write(&path, bytes)
            .await
            .map_err(|e| NewsError::persistence(&path, e))?;
        info!(path = %path.display(), bytes = bytes.len(), "Wrote file");
        return Ok(path);
    }

    let mut attempt = 0usize;
    loop {
        let candidate = if attempt == 0 {
            path.clone()
        } else {
            base_dir.join(format!("{name}_{attempt}.{ext}"))
        };
        let opened = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await;
        match opened {
            Ok(file) => {
                write_new_file(file, &candidate, bytes).await?;
                if attempt > 0 {
                    warn!(path = %candidate.display(), attempt, "Storage key taken; wrote with suffix");
                }
                info!(path = %candidate.display(), bytes = bytes.len(), "Wrote file");
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %candidate.display(), "Path exists, trying next suffix");
                attempt += 1;
            }
            Err(e) => return Err(NewsError::persistence(&candidate, e)),
        }
    }
}

/// Fill a freshly created file. On failure the file is removed so a partial
/// record never holds its key.
async fn write_new_file<W>(mut out: W, path: &Path, bytes: &[u8]) -> Result<(), NewsError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        out.write_all(bytes).await?;
        out.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(out);
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %cleanup, "Could not remove partial file");
        }
        return Err(NewsError::persistence(path, e));
    }
    Ok(())
}
