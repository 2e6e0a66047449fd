//! Progress-callback trait for per-document and per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`]. The
//! synthesizer itself reports nothing; events come from the orchestrator in
//! [`crate::convert`] and [`crate::stream`] between pipeline stages.
//!
//! # Example
//!
//! ```rust
//! use pdf2prt::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, bytes: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Document {}/{} done ({} bytes)", index + 1, total, bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pipeline stage of a single document conversion, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionStage {
    Decoding,
    Header,
    Payload,
    ControlData,
    Preview,
    Assembling,
}

impl ConversionStage {
    pub fn label(self) -> &'static str {
        match self {
            ConversionStage::Decoding => "decoding PDF",
            ConversionStage::Header => "building headers",
            ConversionStage::Payload => "synthesizing payload",
            ConversionStage::ControlData => "generating control data",
            ConversionStage::Preview => "resampling preview",
            ConversionStage::Assembling => "assembling artifacts",
        }
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the conversion orchestrator as it processes documents.
///
/// Implementations must be `Send + Sync`: stage events fire from the blocking
/// worker thread, and batch conversions run several documents at once. All
/// methods default to no-ops.
///
/// `index` is 0-based within the current batch; single conversions use
/// `index = 0, total = 1`.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any document is decoded.
    fn on_conversion_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document's input has been resolved.
    fn on_document_start(&self, index: usize, total: usize, input: &str) {
        let _ = (index, total, input);
    }

    /// Called as a document enters each pipeline stage.
    fn on_stage(&self, index: usize, stage: ConversionStage) {
        let _ = (index, stage);
    }

    /// Called when both artifacts for a document are ready.
    ///
    /// `bytes` is the combined length of the primary and preview buffers.
    fn on_document_complete(&self, index: usize, total: usize, bytes: usize) {
        let _ = (index, total, bytes);
    }

    /// Called when a document fails.
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every document has been attempted.
    fn on_conversion_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
