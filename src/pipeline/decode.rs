//! PDF decoding: page count and first-page size via pdfium.
//!
//! Decoding sits behind [`PageDecoder`] so the orchestrator never depends on
//! pdfium directly; tests and embedders inject their own implementation
//! through [`crate::config::ConversionConfigBuilder::decoder`].
//!
//! ## Library initialisation
//!
//! Where libpdfium lives is resolved once per process and cached:
//! `PDFIUM_LIB_PATH` (a file, or a directory containing the platform library)
//! wins, otherwise the system loader is used. Each decode then binds from the
//! cached location, matching how `pdfium-render` expects to be driven from
//! `spawn_blocking` threads.

use crate::error::PrtError;
use crate::pipeline::geometry::SourcePage;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Capability that turns PDF bytes into the geometry of page 1.
pub trait PageDecoder: Send + Sync {
    /// Decode `bytes`. `source_name` is used only in error messages.
    fn decode_page(
        &self,
        bytes: &[u8],
        password: Option<&str>,
        source_name: &str,
    ) -> Result<SourcePage, PrtError>;
}

/// Where the pdfium shared library is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    Path(PathBuf),
    System,
}

static LIBRARY: OnceCell<LibrarySource> = OnceCell::new();

/// Resolve (once) and return the pdfium library location.
pub fn library_source() -> &'static LibrarySource {
    LIBRARY.get_or_init(|| {
        let source = match std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from) {
            Some(p) if p.is_dir() => {
                LibrarySource::Path(Pdfium::pdfium_platform_library_name_at_path(&p))
            }
            Some(p) => LibrarySource::Path(p),
            None => LibrarySource::System,
        };
        info!("pdfium library: {:?}", source);
        source
    })
}

fn bind_pdfium() -> Result<Pdfium, PrtError> {
    let bindings = match library_source() {
        LibrarySource::Path(path) => Pdfium::bind_to_library(path),
        LibrarySource::System => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PrtError::DecoderUnavailable(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

/// [`PageDecoder`] backed by pdfium.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumDecoder;

impl PageDecoder for PdfiumDecoder {
    fn decode_page(
        &self,
        bytes: &[u8],
        password: Option<&str>,
        source_name: &str,
    ) -> Result<SourcePage, PrtError> {
        let pdfium = bind_pdfium()?;

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        PrtError::WrongPassword {
                            source_name: source_name.to_string(),
                        }
                    } else {
                        PrtError::PasswordRequired {
                            source_name: source_name.to_string(),
                        }
                    }
                } else {
                    PrtError::CorruptPdf {
                        source_name: source_name.to_string(),
                        detail: err_str,
                    }
                }
            })?;

        let pages = document.pages();
        let page_count = pages.len() as u32;
        if page_count == 0 {
            return Err(PrtError::EmptyDocument {
                source_name: source_name.to_string(),
            });
        }

        let first = pages.get(0).map_err(|e| PrtError::CorruptPdf {
            source_name: source_name.to_string(),
            detail: format!("page 1: {:?}", e),
        })?;

        let source = SourcePage {
            width_pts: f64::from(first.width().value),
            height_pts: f64::from(first.height().value),
            page_count,
        };
        debug!(
            "Decoded {}: {} pages, first page {}×{} pt",
            source_name, source.page_count, source.width_pts, source.height_pts
        );
        Ok(source)
    }
}
