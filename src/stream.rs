//! Batch conversion API: emit documents as they complete.
//!
//! Documents share nothing, so a batch runs up to `config.concurrency`
//! conversions at once and yields each one as soon as it finishes. Items
//! arrive in completion order; use [`DocumentResult::index`] if input order
//! matters. A failing document yields a [`DocumentError`] and never stops the
//! rest of the batch.

use crate::config::ConversionConfig;
use crate::convert::convert_path;
use crate::error::{DocumentError, PrtError};
use crate::output::{ArtifactPaths, DocumentResult};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-document results.
pub type DocumentStream =
    Pin<Box<dyn Stream<Item = Result<DocumentResult, DocumentError>> + Send>>;

/// Convert several PDFs, keeping the artifacts in memory.
pub fn convert_stream(
    inputs: Vec<PathBuf>,
    config: &ConversionConfig,
) -> Result<DocumentStream, PrtError> {
    batch(inputs, config, None)
}

/// Convert several PDFs and write each one's `.prt` / `.prt.pvw` pair.
///
/// `out_dir` defaults to each input's own directory.
pub fn convert_stream_to_files(
    inputs: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    config: &ConversionConfig,
) -> Result<DocumentStream, PrtError> {
    batch(inputs, config, Some(out_dir))
}

/// `destination`: `None` keeps results in memory, `Some(dir)` writes files.
fn batch(
    inputs: Vec<PathBuf>,
    config: &ConversionConfig,
    destination: Option<Option<PathBuf>>,
) -> Result<DocumentStream, PrtError> {
    config.settings().validate()?;

    let total = inputs.len();
    info!(
        "Starting batch conversion: {} documents, concurrency {}",
        total, config.concurrency
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
        if total == 0 {
            cb.on_conversion_complete(0, 0);
        }
    }

    let finished = Arc::new(AtomicUsize::new(0));
    let succeeded = Arc::new(AtomicUsize::new(0));
    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let s = stream::iter(inputs.into_iter().enumerate().map(move |(index, path)| {
        let cfg = config.clone();
        let destination = destination.clone();
        let finished = Arc::clone(&finished);
        let succeeded = Arc::clone(&succeeded);
        async move {
            let result = convert_one(index, total, path, destination, &cfg).await;
            if result.is_ok() {
                succeeded.fetch_add(1, Ordering::SeqCst);
            }
            let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
            if done == total {
                if let Some(ref cb) = cfg.progress_callback {
                    cb.on_conversion_complete(total, succeeded.load(Ordering::SeqCst));
                }
            }
            result
        }
    }))
    .buffer_unordered(concurrency);

    Ok(Box::pin(s))
}

async fn convert_one(
    index: usize,
    total: usize,
    path: PathBuf,
    destination: Option<Option<PathBuf>>,
    config: &ConversionConfig,
) -> Result<DocumentResult, DocumentError> {
    let input = path.display().to_string();

    let output = convert_path(&path, config, index, total)
        .await
        .map_err(|e| {
            warn!("{}: {}", input, e);
            DocumentError::ConversionFailed {
                index,
                input: input.clone(),
                detail: e.to_string(),
            }
        })?;

    let paths = match destination {
        None => None,
        Some(out_dir) => {
            let paths = ArtifactPaths::for_input(&path, out_dir.as_deref());
            output
                .write_to(&paths)
                .await
                .map_err(|e| DocumentError::WriteFailed {
                    index,
                    input: input.clone(),
                    detail: e.to_string(),
                })?;
            Some(paths)
        }
    };

    Ok(DocumentResult {
        index,
        input,
        output,
        paths,
    })
}
