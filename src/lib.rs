//! # pdf2prt
//!
//! Convert PDF documents into inkjet print artifacts: a primary `.prt` job
//! file and a reduced-resolution `.prt.pvw` preview.
//!
//! ## What is in an artifact?
//!
//! Each artifact is an ASCII header of `KEY:VALUE` lines closed by a sentinel
//! line, followed by a binary payload whose length is a pure function of the
//! page geometry and the chosen settings. The primary artifact additionally
//! carries print-head control data. The payload content is procedural: it has
//! the size, value ranges and statistical texture of real droplet data, but is
//! not a rasterisation of the PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     read a local file or buffer, check the %PDF magic
//!  ├─ 2. Decode    page count + first-page size via pdfium (spawn_blocking)
//!  ├─ 3. Geometry  points → pixels at the target DPI, preview rescale
//!  ├─ 4. Header    KEY:VALUE lines, device capabilities, sentinel
//!  ├─ 5. Payload   procedural intensities, preview resampled from primary
//!  ├─ 6. Control   nozzle firing delays + droplet sizes
//!  └─ 7. Assemble  header ++ payload ++ control, written atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2prt::{convert_to_files, ColorMode, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .dpi(600)
//!         .color_mode(ColorMode::Cmyk)
//!         .compression_level(80)
//!         .build()?;
//!     let (stats, paths) = convert_to_files("document.pdf", None, &config).await?;
//!     eprintln!(
//!         "{}: {} bytes, {}: {} bytes",
//!         paths.primary.display(),
//!         stats.primary_bytes,
//!         paths.preview.display(),
//!         stats.preview_bytes
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Synthesis without any PDF at all:
//!
//! ```rust
//! use pdf2prt::{synthesize_artifacts, ArtifactSettings, ColorMode, PageGeometry};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let geometry = PageGeometry::new(850, 1100, 1).unwrap();
//! let settings = ArtifactSettings::new(100, ColorMode::BlackWhite, 80).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//! let set = synthesize_artifacts(&geometry, &settings, &chrono::Utc::now(), &mut rng).unwrap();
//! assert_eq!(set.primary.payload.len(), 467_500);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2prt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2prt = { version = "0.1", default-features = false }
//! ```
//!
//! ## Locating pdfium
//!
//! Set `PDFIUM_LIB_PATH` to the shared library (or the directory holding it).
//! Without it the system loader search path is used.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ArtifactSettings, ColorMode, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_bytes, convert_sync, convert_to_files, inspect};
pub use error::{DocumentError, PrtError};
pub use output::{
    Artifact, ArtifactPaths, ArtifactSet, ConversionOutput, ConversionStats, DocumentInfo,
    DocumentResult,
};
pub use pipeline::assemble::{assemble, synthesize_artifacts};
pub use pipeline::control::synthesize_control_data;
pub use pipeline::decode::{PageDecoder, PdfiumDecoder};
pub use pipeline::geometry::{PageGeometry, SourcePage};
pub use pipeline::header::{build_header, parse_header, ArtifactKind, ParsedHeader};
pub use pipeline::payload::{resample_preview, synthesize_payload};
pub use progress::{
    ConversionProgressCallback, ConversionStage, NoopProgressCallback, ProgressCallback,
};
pub use stream::{convert_stream, convert_stream_to_files, DocumentStream};
