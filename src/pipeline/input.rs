//! Input resolution: read a user-supplied path or byte buffer and make sure
//! it looks like a PDF before pdfium ever sees it.
//!
//! Checking the `%PDF` magic up front turns "pdfium failed to load" into an
//! error that names the offending file and shows what it actually contains.

use crate::error::PrtError;
use std::path::Path;
use tracing::debug;

/// First bytes of every PDF file.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF loaded into memory, with the name used in diagnostics.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Read a local PDF, validating existence, permissions and magic bytes.
pub async fn resolve_input(path: impl AsRef<Path>) -> Result<ResolvedInput, PrtError> {
    let path = path.as_ref();
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PrtError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PrtError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let name = path.display().to_string();
    check_magic(&bytes, &name)?;
    debug!("Resolved local PDF: {} ({} bytes)", name, bytes.len());
    Ok(ResolvedInput { name, bytes })
}

/// Wrap an in-memory buffer, validating its magic bytes.
pub fn resolve_bytes(bytes: &[u8], name: impl Into<String>) -> Result<ResolvedInput, PrtError> {
    let name = name.into();
    check_magic(bytes, &name)?;
    Ok(ResolvedInput {
        name,
        bytes: bytes.to_vec(),
    })
}

fn check_magic(bytes: &[u8], name: &str) -> Result<(), PrtError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(());
    }
    Err(PrtError::NotAPdf {
        source_name: name.to_string(),
        magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bytes_with_magic_are_accepted() {
        let r = resolve_bytes(b"%PDF-1.7\n...", "mem").unwrap();
        assert_eq!(r.name, "mem");
        assert_eq!(r.bytes.len(), 12);
    }

    #[test]
    fn bytes_without_magic_are_rejected() {
        match resolve_bytes(b"PK\x03\x04zip", "archive.zip") {
            Err(PrtError::NotAPdf { source_name, magic }) => {
                assert_eq!(source_name, "archive.zip");
                assert_eq!(magic, b"PK\x03\x04".to_vec());
            }
            other => panic!("expected NotAPdf, got {other:?}"),
        }
        assert!(matches!(
            resolve_bytes(b"", "empty"),
            Err(PrtError::NotAPdf { .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = resolve_input("/definitely/not/here.pdf").await.unwrap_err();
        assert!(matches!(err, PrtError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn local_file_is_read() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.4\n%%EOF\n").unwrap();
        let r = resolve_input(tmp.path()).await.unwrap();
        assert!(r.bytes.starts_with(PDF_MAGIC));
        assert!(r.name.ends_with(&*tmp.path().file_name().unwrap().to_string_lossy()));
    }
}
