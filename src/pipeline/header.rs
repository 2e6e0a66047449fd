//! ASCII artifact headers.
//!
//! A header is a run of `KEY:VALUE\n` lines closed by a sentinel line. The
//! controller scans for the sentinel and treats every byte after it as
//! payload, so the sentinel must never appear as a field line.
//!
//! ```text
//! FORMAT:INKJET_PRT_V1
//! FILE_TYPE:PRIMARY
//! CREATOR:pdf2prt
//! TIMESTAMP:2026-10-18T09:30:00.000Z
//! DPI:600
//! ...
//! DROPLET_PLACEMENT:VARIABLE
//! DROPLET_PLACEMENT_DATA_START
//! ```

use crate::config::ArtifactSettings;
use crate::pipeline::geometry::{preview_dpi, PageGeometry};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const FORMAT_ID: &str = "INKJET_PRT_V1";
pub const CREATOR_TAG: &str = "pdf2prt";

pub const PRIMARY_SENTINEL: &str = "DROPLET_PLACEMENT_DATA_START";
pub const PREVIEW_SENTINEL: &str = "PREVIEW_DATA_START";

/// Compression level stamped on every preview header.
pub const PREVIEW_COMPRESSION: u32 = 90;

/// Nozzles on the print head; also the period of the control-data pattern.
pub const NOZZLE_COUNT: usize = 1280;

/// Fixed print-head capabilities written to every primary header.
pub const DEVICE_CAPABILITIES: [(&str, &str); 11] = [
    ("PRINT_HEAD", "PIEZO_DOD"),
    ("NOZZLE_COUNT", "1280"),
    ("DROP_SIZE", "6PL"),
    ("FIRING_FREQUENCY", "40KHZ"),
    ("PASS_COUNT", "4"),
    ("INTERLEAVE", "ENABLED"),
    ("BIDIRECTIONAL", "ENABLED"),
    ("COLOR_SEPARATION", "ENABLED"),
    ("HALFTONE", "ERROR_DIFFUSION"),
    ("INK_DENSITY", "100"),
    ("DROPLET_PLACEMENT", "VARIABLE"),
];

/// Which of the two artifacts a header describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Primary,
    Preview,
}

impl ArtifactKind {
    pub fn sentinel(self) -> &'static str {
        match self {
            ArtifactKind::Primary => PRIMARY_SENTINEL,
            ArtifactKind::Preview => PREVIEW_SENTINEL,
        }
    }

    fn file_type(self) -> &'static str {
        match self {
            ArtifactKind::Primary => "PRIMARY",
            ArtifactKind::Preview => "PREVIEW",
        }
    }

    /// Conventional file extension appended to the document basename.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Primary => "prt",
            ArtifactKind::Preview => "prt.pvw",
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-18T09:30:00.000Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the header for `kind`.
///
/// `geometry` is always the primary geometry; the preview header derives its
/// own DPI and dimensions from it.
pub fn build_header(
    kind: ArtifactKind,
    geometry: &PageGeometry,
    settings: &ArtifactSettings,
    timestamp: &DateTime<Utc>,
) -> Vec<u8> {
    let (dpi, compression, dims) = match kind {
        ArtifactKind::Primary => (settings.dpi, settings.compression_level, *geometry),
        ArtifactKind::Preview => (
            preview_dpi(settings.dpi),
            PREVIEW_COMPRESSION,
            geometry.preview(settings.dpi),
        ),
    };

    let mut fields: Vec<(&str, String)> = vec![
        ("FORMAT", FORMAT_ID.to_string()),
        ("FILE_TYPE", kind.file_type().to_string()),
        ("CREATOR", CREATOR_TAG.to_string()),
        ("TIMESTAMP", format_timestamp(timestamp)),
        ("DPI", dpi.to_string()),
        ("COLOR_MODE", settings.color_mode.as_str().to_string()),
        ("COMPRESSION", compression.to_string()),
        ("PAGES", dims.page_count.to_string()),
        ("WIDTH", dims.width.to_string()),
        ("HEIGHT", dims.height.to_string()),
        (
            "BYTES_PER_PIXEL",
            settings.color_mode.bytes_per_pixel().to_string(),
        ),
    ];
    if kind == ArtifactKind::Primary {
        fields.extend(DEVICE_CAPABILITIES.iter().map(|(k, v)| (*k, v.to_string())));
    }

    let mut text = String::with_capacity(fields.len() * 24 + 32);
    for (key, value) in &fields {
        text.push_str(key);
        text.push(':');
        text.push_str(value);
        text.push('\n');
    }
    text.push_str(kind.sentinel());
    text.push('\n');
    text.into_bytes()
}

/// A header read back from an artifact buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub kind: ArtifactKind,
    pub fields: Vec<(String, String)>,
    /// Offset of the first payload byte.
    pub payload_offset: usize,
}

impl ParsedHeader {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Read header lines up to the first sentinel.
///
/// Returns `None` when no sentinel is found or a field line is not valid
/// `KEY:VALUE` ASCII.
pub fn parse_header(buf: &[u8]) -> Option<ParsedHeader> {
    let mut fields = Vec::new();
    let mut offset = 0;

    while offset < buf.len() {
        let end = offset + buf[offset..].iter().position(|&b| b == b'\n')?;
        let line = std::str::from_utf8(&buf[offset..end]).ok()?;
        let next = end + 1;

        let kind = match line {
            PRIMARY_SENTINEL => Some(ArtifactKind::Primary),
            PREVIEW_SENTINEL => Some(ArtifactKind::Preview),
            _ => None,
        };
        if let Some(kind) = kind {
            return Some(ParsedHeader {
                kind,
                fields,
                payload_offset: next,
            });
        }

        if !line.is_ascii() {
            return None;
        }
        let (key, value) = line.split_once(':')?;
        fields.push((key.to_string(), value.to_string()));
        offset = next;
    }

    None
}
