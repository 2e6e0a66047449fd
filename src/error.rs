//! Error types for the pdf2prt library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PrtError`] — **Fatal** for one conversion: the input cannot be read,
//!   the PDF cannot be decoded, or the geometry/settings violate a
//!   precondition of the synthesizer. Returned as `Err(PrtError)` from the
//!   `convert*` functions.
//!
//! * [`DocumentError`] — **Non-fatal** within a batch: one document failed
//!   but the remaining documents are unaffected. Yielded by
//!   [`crate::stream::convert_stream`] so callers can report partial success.
//!
//! The synthesizer itself is total over valid inputs; every variant below is
//! either an I/O condition or a precondition rejected before a buffer is sized.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2prt library.
#[derive(Debug, Error)]
pub enum PrtError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input was read, but is not a PDF.
    #[error("Input is not a valid PDF: '{source_name}'\nFirst bytes: {magic:?}")]
    NotAPdf { source_name: String, magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{source_name}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { source_name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{source_name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { source_name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{source_name}'")]
    WrongPassword { source_name: String },

    /// The PDF parsed but contains no pages.
    #[error("PDF '{source_name}' contains no pages")]
    EmptyDocument { source_name: String },

    // ── Precondition errors ───────────────────────────────────────────────
    /// Page geometry is degenerate or too large to address.
    #[error("Invalid page geometry {width}x{height} px × {page_count} pages: {reason}")]
    InvalidGeometry {
        width: u64,
        height: u64,
        page_count: u64,
        reason: String,
    },

    /// DPI, colour mode or compression level is out of range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    // ── Decoder binding errors ────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, or install libpdfium where the\n\
system loader can find it. Pre-built libraries are available from\n\
https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    DecoderUnavailable(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PrtError {
    /// True for errors that come from the caller's inputs rather than from
    /// the environment (file system, pdfium library).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PrtError::InvalidGeometry { .. } | PrtError::InvalidSettings(_)
        )
    }
}

/// A non-fatal error for a single document inside a batch.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The document could not be converted.
    #[error("{input}: conversion failed: {detail}")]
    ConversionFailed {
        /// 0-based position of the input in the batch.
        index: usize,
        input: String,
        detail: String,
    },

    /// The artifacts were produced but could not be written.
    #[error("{input}: writing artifacts failed: {detail}")]
    WriteFailed {
        index: usize,
        input: String,
        detail: String,
    },
}

impl DocumentError {
    /// The input this error belongs to.
    pub fn input(&self) -> &str {
        match self {
            DocumentError::ConversionFailed { input, .. } => input,
            DocumentError::WriteFailed { input, .. } => input,
        }
    }

    /// 0-based position of the failed input in the batch.
    pub fn index(&self) -> usize {
        match self {
            DocumentError::ConversionFailed { index, .. }
            | DocumentError::WriteFailed { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_geometry_display() {
        let e = PrtError::InvalidGeometry {
            width: 0,
            height: 1100,
            page_count: 1,
            reason: "width must be positive".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("0x1100"), "got: {msg}");
        assert!(msg.contains("width must be positive"));
        assert!(e.is_precondition());
    }

    #[test]
    fn invalid_settings_display() {
        let e = PrtError::InvalidSettings("compression level must be 10–100, got 5".into());
        assert!(e.to_string().contains("got 5"));
        assert!(e.is_precondition());
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = PrtError::NotAPdf {
            source_name: "notes.txt".into(),
            magic: b"PK\x03\x04".to_vec(),
        };
        assert!(e.to_string().contains("notes.txt"));
        assert!(!e.is_precondition());
    }

    #[test]
    fn document_error_reports_input() {
        let e = DocumentError::ConversionFailed {
            index: 3,
            input: "a.pdf".into(),
            detail: "corrupt".into(),
        };
        assert_eq!(e.input(), "a.pdf");
        assert_eq!(e.index(), 3);
        assert!(e.to_string().starts_with("a.pdf:"));
    }
}
