//! Output types: synthesized artifacts, per-document results and statistics.

use crate::config::ArtifactSettings;
use crate::error::PrtError;
use crate::pipeline::assemble::assemble;
use crate::pipeline::geometry::{PageGeometry, SourcePage};
use crate::pipeline::header::ArtifactKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One binary artifact: header, payload and (primary only) control data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
    pub control_data: Option<Vec<u8>>,
}

impl Artifact {
    /// Total length of the assembled buffer.
    pub fn len(&self) -> usize {
        self.header.len() + self.payload.len() + self.control_data.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The contiguous `header ++ payload ++ control` buffer written to disk.
    pub fn to_bytes(&self) -> Vec<u8> {
        assemble(&self.header, &self.payload, self.control_data.as_deref())
    }
}

/// Both artifacts for one document, with the snapshot they were built from.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub geometry: PageGeometry,
    pub preview_geometry: PageGeometry,
    pub settings: ArtifactSettings,
    pub timestamp: DateTime<Utc>,
    pub primary: Artifact,
    pub preview: Artifact,
}

/// Paths of the two files written for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub primary: PathBuf,
    pub preview: PathBuf,
}

impl ArtifactPaths {
    /// `<dir>/<basename>.prt` and `<dir>/<basename>.prt.pvw`.
    pub fn new(dir: &Path, basename: &str) -> Self {
        Self {
            primary: dir.join(format!("{basename}.{}", ArtifactKind::Primary.extension())),
            preview: dir.join(format!("{basename}.{}", ArtifactKind::Preview.extension())),
        }
    }

    /// Paths for an input file, named after its stem. `out_dir` defaults to
    /// the input's own directory.
    pub fn for_input(input: &Path, out_dir: Option<&Path>) -> Self {
        let basename = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string());
        let dir = out_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self::new(&dir, &basename)
    }
}

/// Timing and size statistics for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub page_count: u32,
    pub primary_bytes: usize,
    pub preview_bytes: usize,
    pub header_bytes: usize,
    pub payload_bytes: usize,
    pub control_bytes: usize,
    pub preview_payload_bytes: usize,
    pub decode_duration_ms: u64,
    pub synthesis_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// Size statistics for `artifacts`; durations are left at zero.
    pub fn from_artifacts(artifacts: &ArtifactSet) -> Self {
        Self {
            page_count: artifacts.geometry.page_count,
            primary_bytes: artifacts.primary.len(),
            preview_bytes: artifacts.preview.len(),
            header_bytes: artifacts.primary.header.len(),
            payload_bytes: artifacts.primary.payload.len(),
            control_bytes: artifacts.primary.control_data.as_ref().map_or(0, Vec::len),
            preview_payload_bytes: artifacts.preview.payload.len(),
            ..Self::default()
        }
    }
}

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub source: SourcePage,
    pub artifacts: ArtifactSet,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Serialisable view without the byte buffers.
    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            source: self.source,
            geometry: self.artifacts.geometry,
            preview_geometry: self.artifacts.preview_geometry,
            settings: self.artifacts.settings,
        }
    }

    /// Write both artifacts to `paths` (temp file + rename for each).
    pub async fn write_to(&self, paths: &ArtifactPaths) -> Result<(), PrtError> {
        write_atomic(&paths.primary, &self.artifacts.primary.to_bytes()).await?;
        write_atomic(&paths.preview, &self.artifacts.preview.to_bytes()).await?;
        Ok(())
    }
}

/// Decoded source geometry and the pixel geometry derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub source: SourcePage,
    pub geometry: PageGeometry,
    pub preview_geometry: PageGeometry,
    pub settings: ArtifactSettings,
}

/// One successfully converted document inside a batch.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    /// 0-based position of the input in the batch.
    pub index: usize,
    pub input: String,
    pub output: ConversionOutput,
    /// Set when the batch was asked to write files.
    pub paths: Option<ArtifactPaths>,
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PrtError> {
    let fail = |source| PrtError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await.map_err(fail)?;
    tokio::fs::rename(&tmp, path).await.map_err(fail)?;
    Ok(())
}
