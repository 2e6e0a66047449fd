//! Artifact assembly and the pure end-to-end synthesis entry point.
//!
//! [`synthesize_artifacts`] is the whole core: geometry and settings in, two
//! finished [`Artifact`]s out. It touches no files and shares no state; the
//! only side effect is drawing from the caller's generator.

use crate::config::ArtifactSettings;
use crate::error::PrtError;
use crate::output::{Artifact, ArtifactSet};
use crate::pipeline::control::synthesize_control_data;
use crate::pipeline::geometry::{preview_payload_len, primary_payload_len, PageGeometry};
use crate::pipeline::header::{build_header, ArtifactKind};
use crate::pipeline::payload::{resample_preview, synthesize_payload};
use crate::progress::ConversionStage;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

/// Concatenate `header ++ payload ++ control`.
///
/// The output is allocated once at its exact final length.
pub fn assemble(header: &[u8], payload: &[u8], control: Option<&[u8]>) -> Vec<u8> {
    let control = control.unwrap_or(&[]);
    let mut buf = Vec::with_capacity(header.len() + payload.len() + control.len());
    buf.extend_from_slice(header);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(control);
    buf
}

/// Synthesize the primary and preview artifacts.
///
/// Rejects degenerate geometry and out-of-range settings before any buffer
/// is sized.
pub fn synthesize_artifacts<R: Rng + ?Sized>(
    geometry: &PageGeometry,
    settings: &ArtifactSettings,
    timestamp: &DateTime<Utc>,
    rng: &mut R,
) -> Result<ArtifactSet, PrtError> {
    synthesize_artifacts_with(geometry, settings, timestamp, rng, &mut |_| {})
}

/// [`synthesize_artifacts`], reporting each stage to `on_stage` as it begins.
pub fn synthesize_artifacts_with<R: Rng + ?Sized>(
    geometry: &PageGeometry,
    settings: &ArtifactSettings,
    timestamp: &DateTime<Utc>,
    rng: &mut R,
    on_stage: &mut dyn FnMut(ConversionStage),
) -> Result<ArtifactSet, PrtError> {
    geometry.validate()?;
    settings.validate()?;

    let mode = settings.color_mode;
    let preview_geometry = geometry.preview(settings.dpi);
    let primary_len = primary_payload_len(geometry, settings)?;
    let preview_len = preview_payload_len(&preview_geometry, mode)?;
    debug!(
        "Sizing: primary {} bytes, preview {} bytes ({}x{} → {}x{})",
        primary_len,
        preview_len,
        geometry.width,
        geometry.height,
        preview_geometry.width,
        preview_geometry.height
    );

    on_stage(ConversionStage::Header);
    let primary_header = build_header(ArtifactKind::Primary, geometry, settings, timestamp);
    let preview_header = build_header(ArtifactKind::Preview, geometry, settings, timestamp);

    on_stage(ConversionStage::Payload);
    let primary_payload = synthesize_payload(primary_len, geometry, mode, rng);

    on_stage(ConversionStage::ControlData);
    let control = synthesize_control_data(primary_payload.len(), mode, rng);

    on_stage(ConversionStage::Preview);
    let preview_payload = resample_preview(&primary_payload, preview_len);

    on_stage(ConversionStage::Assembling);
    Ok(ArtifactSet {
        geometry: *geometry,
        preview_geometry,
        settings: *settings,
        timestamp: *timestamp,
        primary: Artifact {
            kind: ArtifactKind::Primary,
            header: primary_header,
            payload: primary_payload,
            control_data: Some(control),
        },
        preview: Artifact {
            kind: ArtifactKind::Preview,
            header: preview_header,
            payload: preview_payload,
            control_data: None,
        },
    })
}
