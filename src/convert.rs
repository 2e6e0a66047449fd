//! Single-document conversion entry points.
//!
//! Decoding and synthesis are CPU-bound and run inside
//! `tokio::task::spawn_blocking`. Dropping the returned future abandons the
//! conversion: the worker finishes its buffer and the result is discarded.
//! Nothing is written until both artifacts are complete.

use crate::config::ConversionConfig;
use crate::error::PrtError;
use crate::output::{ArtifactPaths, ConversionOutput, ConversionStats, DocumentInfo};
use crate::pipeline::assemble::synthesize_artifacts_with;
use crate::pipeline::decode::{PageDecoder, PdfiumDecoder};
use crate::pipeline::geometry::PageGeometry;
use crate::pipeline::input::{self, ResolvedInput};
use crate::progress::ConversionStage;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file into primary and preview artifacts held in memory.
///
/// # Errors
/// - File not found / permission denied / not a PDF
/// - pdfium unavailable, corrupt or password-protected PDF
/// - Invalid settings or degenerate page geometry
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PrtError> {
    let input = input.as_ref();
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(1);
    }
    let result = convert_path(input, config, 0, 1).await;
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(1, usize::from(result.is_ok()));
    }
    result
}

/// Convert PDF bytes already in memory.
pub async fn convert_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, PrtError> {
    const NAME: &str = "<memory>";
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(1);
        cb.on_document_start(0, 1, NAME);
    }
    let result = match input::resolve_bytes(bytes, NAME) {
        Ok(resolved) => convert_resolved(resolved, config, 0).await,
        Err(e) => Err(e),
    };
    report_outcome(config, 0, 1, &result);
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(1, usize::from(result.is_ok()));
    }
    result
}

/// Convert a PDF and write `<stem>.prt` and `<stem>.prt.pvw`.
///
/// `out_dir` defaults to the input's directory. Each file is written to a
/// temporary sibling and renamed into place.
pub async fn convert_to_files(
    input: impl AsRef<Path>,
    out_dir: Option<&Path>,
    config: &ConversionConfig,
) -> Result<(ConversionStats, ArtifactPaths), PrtError> {
    let input = input.as_ref();
    let output = convert(input, config).await?;
    let paths = ArtifactPaths::for_input(input, out_dir);
    output.write_to(&paths).await?;
    info!(
        "Wrote {} and {}",
        paths.primary.display(),
        paths.preview.display()
    );
    Ok((output.stats, paths))
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PrtError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PrtError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

/// Decode a PDF and report the geometry a conversion would use, without
/// synthesizing anything.
pub async fn inspect(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentInfo, PrtError> {
    let settings = config.settings();
    settings.validate()?;
    let resolved = input::resolve_input(input).await?;
    let decoder = decoder_for(config);
    let password = config.password.clone();

    let source = tokio::task::spawn_blocking(move || {
        decoder.decode_page(&resolved.bytes, password.as_deref(), &resolved.name)
    })
    .await
    .map_err(|e| PrtError::Internal(format!("Decode task panicked: {}", e)))??;

    let geometry = PageGeometry::from_source(&source, settings.dpi)?;
    Ok(DocumentInfo {
        source,
        geometry,
        preview_geometry: geometry.preview(settings.dpi),
        settings,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve and convert one path, firing document-level progress events.
pub(crate) async fn convert_path(
    input: &Path,
    config: &ConversionConfig,
    index: usize,
    total: usize,
) -> Result<ConversionOutput, PrtError> {
    info!("Starting conversion: {}", input.display());
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(index, total, &input.display().to_string());
    }
    let result = match input::resolve_input(input).await {
        Ok(resolved) => convert_resolved(resolved, config, index).await,
        Err(e) => Err(e),
    };
    report_outcome(config, index, total, &result);
    result
}

fn report_outcome(
    config: &ConversionConfig,
    index: usize,
    total: usize,
    result: &Result<ConversionOutput, PrtError>,
) {
    let Some(ref cb) = config.progress_callback else {
        return;
    };
    match result {
        Ok(output) => cb.on_document_complete(
            index,
            total,
            output.stats.primary_bytes + output.stats.preview_bytes,
        ),
        Err(e) => cb.on_document_error(index, total, &e.to_string()),
    }
}

/// Generator for amplitude jitter: seeded when the config asks for
/// reproducible output, OS entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn decoder_for(config: &ConversionConfig) -> Arc<dyn PageDecoder> {
    match config.decoder {
        Some(ref decoder) => Arc::clone(decoder),
        None => Arc::new(PdfiumDecoder),
    }
}

/// Decode and synthesize on a blocking worker.
async fn convert_resolved(
    resolved: ResolvedInput,
    config: &ConversionConfig,
    index: usize,
) -> Result<ConversionOutput, PrtError> {
    let total_start = Instant::now();
    let settings = config.settings();
    settings.validate()?;

    let decoder = decoder_for(config);
    let password = config.password.clone();
    let seed = config.seed;
    let callback = config.progress_callback.clone();

    let (source, artifacts, decode_ms, synthesis_ms) =
        tokio::task::spawn_blocking(move || -> Result<_, PrtError> {
            let mut on_stage = |stage: ConversionStage| {
                if let Some(ref cb) = callback {
                    cb.on_stage(index, stage);
                }
            };

            on_stage(ConversionStage::Decoding);
            let decode_start = Instant::now();
            let source = decoder.decode_page(&resolved.bytes, password.as_deref(), &resolved.name)?;
            let decode_ms = decode_start.elapsed().as_millis() as u64;

            let geometry = PageGeometry::from_source(&source, settings.dpi)?;
            debug!(
                "{}: {}x{} px × {} pages at {} DPI",
                resolved.name, geometry.width, geometry.height, geometry.page_count, settings.dpi
            );

            let synthesis_start = Instant::now();
            let mut rng = make_rng(seed);
            let artifacts =
                synthesize_artifacts_with(&geometry, &settings, &Utc::now(), &mut rng, &mut on_stage)?;
            let synthesis_ms = synthesis_start.elapsed().as_millis() as u64;

            Ok((source, artifacts, decode_ms, synthesis_ms))
        })
        .await
        .map_err(|e| PrtError::Internal(format!("Conversion task panicked: {}", e)))??;

    let stats = ConversionStats {
        decode_duration_ms: decode_ms,
        synthesis_duration_ms: synthesis_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        ..ConversionStats::from_artifacts(&artifacts)
    };

    info!(
        "Conversion complete: {} pages, primary {} bytes, preview {} bytes, {}ms",
        stats.page_count, stats.primary_bytes, stats.preview_bytes, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        source,
        artifacts,
        stats,
    })
}
