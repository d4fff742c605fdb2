//! Input resolution: read a local file and identify what it contains.
//!
//! Reads are awaited `tokio::fs` calls returning a `Result`; all user-input
//! failures (missing file, no permission, empty file, unidentifiable bytes)
//! are reported here, before a job claims the in-flight slot or any
//! collaborator library is loaded.

use crate::error::ConvertError;
use crate::format::{self, SourceFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A resolved input: the original path, its bytes, and the detected format.
#[derive(Debug)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub source: SourceFormat,
}

/// Read `path` fully into memory and sniff its source format.
pub async fn resolve_input(path: &Path) -> Result<ResolvedInput, ConvertError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ConvertError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if bytes.is_empty() {
        return Err(ConvertError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let source = format::detect_source(&bytes, path).ok_or_else(|| {
        let mut magic = [0u8; 4];
        for (i, b) in bytes.iter().take(4).enumerate() {
            magic[i] = *b;
        }
        ConvertError::UnrecognizedInput {
            path: path.to_path_buf(),
            magic,
        }
    })?;

    debug!(
        "Resolved input {} → {} ({} bytes)",
        path.display(),
        source,
        bytes.len()
    );

    Ok(ResolvedInput {
        path: path.to_path_buf(),
        bytes,
        source,
    })
}
