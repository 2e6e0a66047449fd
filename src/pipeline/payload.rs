//! Procedural payload synthesis and preview resampling.
//!
//! Each output byte is keyed only by its position and the colour mode; page
//! content is never consulted. For an index `i` in a payload of `n` bytes:
//!
//! ```text
//! page_span   = n / page_count          (real division)
//! page_offset = i mod page_span
//! row         = floor(page_offset / width)
//! col         = page_offset mod width   (fractional)
//! ```
//!
//! The page span is not rounded, so when `n` does not divide evenly by the
//! page count each page starts at a fractional offset and no page is shorter
//! than the others.
//!
//! CMYK and Grayscale scale a sine/cosine field by a fresh uniform draw per
//! byte; BlackWhite thresholds a higher-frequency field and draws nothing.

use crate::config::ColorMode;
use crate::pipeline::geometry::PageGeometry;
use rand::Rng;
use tracing::debug;

/// Where a payload index lands on the page grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPosition {
    pub page_offset: f64,
    pub row: usize,
    pub col: f64,
    /// `i mod bytes_per_pixel`: the CMYK plane for CMYK, always 0 otherwise.
    pub channel: usize,
}

/// Bytes per page as a real number: `byte_count / page_count`.
pub fn page_span(byte_count: usize, geometry: &PageGeometry) -> f64 {
    byte_count as f64 / f64::from(geometry.page_count.max(1))
}

/// Map payload index `i` onto the page grid.
///
/// A zero `page_span` (an empty payload) maps every index to offset 0.
pub fn locate(
    i: usize,
    page_span: f64,
    geometry: &PageGeometry,
    mode: ColorMode,
) -> PixelPosition {
    let width = f64::from(geometry.width.max(1));
    let page_offset = if page_span > 0.0 {
        i as f64 % page_span
    } else {
        0.0
    };
    PixelPosition {
        page_offset,
        row: (page_offset / width).floor() as usize,
        col: page_offset % width,
        channel: i % mode.bytes_per_pixel() as usize,
    }
}

/// `sin(row·f) · cos(col·f) · 127 + 128`, in `[1, 255]`.
fn wave(pos: &PixelPosition, frequency: f64) -> f64 {
    (pos.row as f64 * frequency).sin() * (pos.col * frequency).cos() * 127.0 + 128.0
}

fn jitter<R: Rng + ?Sized>(base: f64, floor: f64, span: f64, rng: &mut R) -> u8 {
    let r: f64 = rng.gen();
    (base * (floor + r * span)).floor().clamp(0.0, 255.0) as u8
}

/// Intensity byte for one position.
///
/// Draws exactly one value from `rng` for CMYK and Grayscale, none for
/// BlackWhite.
pub fn intensity<R: Rng + ?Sized>(pos: &PixelPosition, mode: ColorMode, rng: &mut R) -> u8 {
    match mode {
        ColorMode::Cmyk => jitter(wave(pos, 0.01), 0.8, 0.4, rng),
        ColorMode::Grayscale => jitter(wave(pos, 0.02), 0.7, 0.6, rng),
        ColorMode::BlackWhite => {
            if wave(pos, 0.1) > 128.0 {
                255
            } else {
                0
            }
        }
    }
}

/// Synthesize exactly `byte_count` payload bytes.
///
/// The buffer is allocated once at its final length and filled in place.
pub fn synthesize_payload<R: Rng + ?Sized>(
    byte_count: usize,
    geometry: &PageGeometry,
    mode: ColorMode,
    rng: &mut R,
) -> Vec<u8> {
    let span = page_span(byte_count, geometry);
    let mut payload = vec![0u8; byte_count];

    for (i, byte) in payload.iter_mut().enumerate() {
        let pos = locate(i, span, geometry, mode);
        *byte = intensity(&pos, mode, rng);
    }

    debug!(
        "Synthesized {} payload bytes ({}, {}x{} × {} pages)",
        byte_count, mode, geometry.width, geometry.height, geometry.page_count
    );
    payload
}

/// Primary index sampled for preview index `i`:
/// `floor(i / preview_len × primary_len)`.
///
/// Computed as `i × primary_len / preview_len` in integers. Evaluating the
/// quotient in floating point first can land one below the exact value
/// (`i = 7, preview_len = 10, primary_len = 90` gives 62 rather than 63);
/// the integer form is always exact and always lies in `[0, primary_len)`.
pub fn resample_index(i: usize, preview_len: usize, primary_len: usize) -> usize {
    if preview_len == 0 {
        return 0;
    }
    ((i as u128 * primary_len as u128) / preview_len as u128) as usize
}

/// Downsample `primary` to `preview_len` bytes by nearest-lower-index
/// sampling. Indices past the end of `primary` read as 0.
pub fn resample_preview(primary: &[u8], preview_len: usize) -> Vec<u8> {
    let mut preview = vec![0u8; preview_len];
    for (i, byte) in preview.iter_mut().enumerate() {
        let source = resample_index(i, preview_len, primary.len());
        *byte = primary.get(source).copied().unwrap_or(0);
    }
    debug!(
        "Resampled {} primary bytes → {} preview bytes",
        primary.len(),
        preview_len
    );
    preview
}
