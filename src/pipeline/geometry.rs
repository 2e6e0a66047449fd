//! Page geometry and the size arithmetic shared by every artifact stage.
//!
//! Source pages arrive in PDF points (72 per inch). Pixel geometry is the
//! point size scaled by `dpi / 72` and rounded up, so a page never loses its
//! last partial row or column.
//!
//! Density factors are applied as integer percentages. A primary density of
//! `1 - c/100 + 0.3` is exactly `(130 - c) / 100`; computing it in `f64`
//! instead would land `c = 80` on `0.49999999999999994` and drop a byte.

use crate::config::{ArtifactSettings, ColorMode};
use crate::error::PrtError;
use serde::{Deserialize, Serialize};

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Previews are never rendered above this resolution.
pub const PREVIEW_MAX_DPI: u32 = 300;

/// Preview payload density, percent of the raw preview size.
pub const PREVIEW_DENSITY_PERCENT: u64 = 90;

/// Primary density is `PRIMARY_DENSITY_BASE_PERCENT - compression_level` percent.
pub const PRIMARY_DENSITY_BASE_PERCENT: u64 = 130;

/// Control data is this fraction (1/N) of the primary payload.
pub const CONTROL_DATA_DIVISOR: usize = 10;

/// What the decoder reports about a document: first-page size in points and
/// the total page count. Geometry is assumed uniform across pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourcePage {
    pub width_pts: f64,
    pub height_pts: f64,
    pub page_count: u32,
}

/// Pixel dimensions of one page at a target resolution plus total page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: u32,
    pub height: u32,
    pub page_count: u32,
}

impl PageGeometry {
    /// Create validated geometry.
    pub fn new(width: u32, height: u32, page_count: u32) -> Result<Self, PrtError> {
        let geometry = Self {
            width,
            height,
            page_count,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Reject zero dimensions or page counts.
    pub fn validate(&self) -> Result<(), PrtError> {
        let reason = if self.width == 0 {
            "page width must be positive"
        } else if self.height == 0 {
            "page height must be positive"
        } else if self.page_count == 0 {
            "page count must be positive"
        } else {
            return Ok(());
        };
        Err(self.invalid(reason))
    }

    /// Scale a decoded source page to pixels at `dpi`, rounding up.
    pub fn from_source(source: &SourcePage, dpi: u32) -> Result<Self, PrtError> {
        let width = scale_dimension(source.width_pts, dpi);
        let height = scale_dimension(source.height_pts, dpi);

        match (width, height) {
            (Some(width), Some(height)) => Self::new(width, height, source.page_count),
            _ => Err(PrtError::InvalidGeometry {
                width: 0,
                height: 0,
                page_count: u64::from(source.page_count),
                reason: format!(
                    "source page {}×{} pt does not scale to a positive pixel size at {dpi} DPI",
                    source.width_pts, source.height_pts
                ),
            }),
        }
    }

    /// Geometry of the preview artifact: dimensions rescaled by
    /// `preview_dpi(dpi) / dpi`, rounded up.
    pub fn preview(&self, dpi: u32) -> Self {
        let target = u64::from(preview_dpi(dpi));
        let dpi = u64::from(dpi.max(1));
        let rescale = |v: u32| -> u32 {
            let scaled = (u64::from(v) * target).div_ceil(dpi);
            u32::try_from(scaled).unwrap_or(u32::MAX)
        };
        Self {
            width: rescale(self.width),
            height: rescale(self.height),
            page_count: self.page_count,
        }
    }

    /// Uncompressed size of the whole document in `mode`:
    /// `width × height × bytes_per_pixel × page_count`.
    pub fn raw_len(&self, mode: ColorMode) -> Result<u128, PrtError> {
        self.validate()?;
        Ok(u128::from(self.width)
            * u128::from(self.height)
            * u128::from(mode.bytes_per_pixel())
            * u128::from(self.page_count))
    }

    fn invalid(&self, reason: &str) -> PrtError {
        PrtError::InvalidGeometry {
            width: u64::from(self.width),
            height: u64::from(self.height),
            page_count: u64::from(self.page_count),
            reason: reason.to_string(),
        }
    }
}

/// Preview resolution for a given primary resolution.
pub fn preview_dpi(dpi: u32) -> u32 {
    dpi.min(PREVIEW_MAX_DPI)
}

/// Primary payload length: `floor(raw × (130 - compression) / 100)`.
pub fn primary_payload_len(
    geometry: &PageGeometry,
    settings: &ArtifactSettings,
) -> Result<usize, PrtError> {
    settings.validate()?;
    let percent = PRIMARY_DENSITY_BASE_PERCENT - u64::from(settings.compression_level);
    scaled_len(geometry, settings.color_mode, percent)
}

/// Preview payload length: `floor(raw_preview × 0.9)`, independent of compression.
pub fn preview_payload_len(
    preview_geometry: &PageGeometry,
    mode: ColorMode,
) -> Result<usize, PrtError> {
    scaled_len(preview_geometry, mode, PREVIEW_DENSITY_PERCENT)
}

/// Control-data length: `floor(primary_len × 0.1)`.
pub fn control_data_len(primary_payload_len: usize) -> usize {
    primary_payload_len / CONTROL_DATA_DIVISOR
}

fn scaled_len(geometry: &PageGeometry, mode: ColorMode, percent: u64) -> Result<usize, PrtError> {
    let len = geometry.raw_len(mode)? * u128::from(percent) / 100;
    usize::try_from(len).map_err(|_| geometry.invalid("payload does not fit in memory"))
}

/// `ceil(points × dpi / 72)`, multiplied before dividing so whole-point
/// sizes land exactly (792 pt at 600 DPI is 6600 px).
fn scale_dimension(points: f64, dpi: u32) -> Option<u32> {
    let px = (points * f64::from(dpi) / POINTS_PER_INCH).ceil();
    if px.is_finite() && px >= 1.0 && px <= f64::from(u32::MAX) {
        Some(px as u32)
    } else {
        None
    }
}
