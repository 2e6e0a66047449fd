//! Configuration types for PDF-to-PRT conversion.
//!
//! Two layers:
//!
//! * [`ArtifactSettings`] — the immutable snapshot the synthesizer consumes
//!   (DPI, colour mode, compression level). Validated on construction.
//! * [`ConversionConfig`] — everything the orchestrator needs on top of that:
//!   password, jitter seed, batch concurrency, an injected decoder and a
//!   progress callback. Built via [`ConversionConfigBuilder`].
//!
//! Out-of-range settings are rejected, never clamped: a compression level of
//! 5 is a caller bug and must surface as [`PrtError::InvalidSettings`].

use crate::error::PrtError;
use crate::pipeline::decode::PageDecoder;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Lowest accepted compression level.
pub const MIN_COMPRESSION: u32 = 10;
/// Highest accepted compression level.
pub const MAX_COMPRESSION: u32 = 100;
/// DPI values the print head is calibrated for. Any positive DPI is legal.
pub const RECOMMENDED_DPI: [u32; 4] = [300, 600, 1200, 2400];

/// Colour mode of the synthesized payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Four interleaved channels per pixel.
    #[default]
    #[serde(rename = "CMYK")]
    Cmyk,
    /// One 8-bit intensity per pixel.
    Grayscale,
    /// One byte per pixel, each exactly 0 or 255.
    BlackWhite,
}

impl ColorMode {
    /// Bytes per pixel written to the header and used in size arithmetic.
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            ColorMode::Cmyk => 4,
            ColorMode::Grayscale | ColorMode::BlackWhite => 1,
        }
    }

    /// Header spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Cmyk => "CMYK",
            ColorMode::Grayscale => "Grayscale",
            ColorMode::BlackWhite => "BlackWhite",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = PrtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cmyk" => Ok(ColorMode::Cmyk),
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(ColorMode::Grayscale),
            "blackwhite" | "black-white" | "bw" | "mono" => Ok(ColorMode::BlackWhite),
            other => Err(PrtError::InvalidSettings(format!(
                "unrecognised colour mode '{other}' (expected cmyk, grayscale or bw)"
            ))),
        }
    }
}

/// The settings snapshot consumed by the header builder and synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSettings {
    pub dpi: u32,
    pub color_mode: ColorMode,
    /// Density knob in `[10, 100]`. Higher values shrink the primary payload.
    pub compression_level: u32,
}

impl ArtifactSettings {
    /// Create validated settings.
    pub fn new(dpi: u32, color_mode: ColorMode, compression_level: u32) -> Result<Self, PrtError> {
        let settings = Self {
            dpi,
            color_mode,
            compression_level,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check DPI and compression bounds.
    pub fn validate(&self) -> Result<(), PrtError> {
        if self.dpi == 0 {
            return Err(PrtError::InvalidSettings("DPI must be positive".into()));
        }
        if !(MIN_COMPRESSION..=MAX_COMPRESSION).contains(&self.compression_level) {
            return Err(PrtError::InvalidSettings(format!(
                "compression level must be {MIN_COMPRESSION}–{MAX_COMPRESSION}, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            dpi: 600,
            color_mode: ColorMode::default(),
            compression_level: 80,
        }
    }
}

/// Configuration for a PDF-to-PRT conversion.
///
/// # Example
/// ```rust
/// use pdf2prt::{ColorMode, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .dpi(1200)
///     .color_mode(ColorMode::Grayscale)
///     .compression_level(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.settings().dpi, 1200);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Target resolution. Default: 600.
    pub dpi: u32,

    /// Payload colour mode. Default: CMYK.
    pub color_mode: ColorMode,

    /// Density knob, 10–100. Default: 80.
    pub compression_level: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Seed for the amplitude-jitter generator.
    ///
    /// `None` draws from OS entropy, so CMYK/Grayscale payloads differ between
    /// runs. Set a seed to make every byte reproducible.
    pub seed: Option<u64>,

    /// Maximum documents converted at once by the batch API. Default: 4.
    pub concurrency: usize,

    /// Page decoder. `None` uses the pdfium-backed decoder.
    pub decoder: Option<Arc<dyn PageDecoder>>,

    /// Receives per-document and per-stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let settings = ArtifactSettings::default();
        Self {
            dpi: settings.dpi,
            color_mode: settings.color_mode,
            compression_level: settings.compression_level,
            password: None,
            seed: None,
            concurrency: 4,
            decoder: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("color_mode", &self.color_mode)
            .field("compression_level", &self.compression_level)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("seed", &self.seed)
            .field("concurrency", &self.concurrency)
            .field("decoder", &self.decoder.as_ref().map(|_| "<dyn PageDecoder>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The synthesizer-facing settings snapshot.
    pub fn settings(&self) -> ArtifactSettings {
        ArtifactSettings {
            dpi: self.dpi,
            color_mode: self.color_mode,
            compression_level: self.compression_level,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.config.color_mode = mode;
        self
    }

    pub fn compression_level(mut self, level: u32) -> Self {
        self.config.compression_level = level;
        self
    }

    pub fn settings(mut self, settings: ArtifactSettings) -> Self {
        self.config.dpi = settings.dpi;
        self.config.color_mode = settings.color_mode;
        self.config.compression_level = settings.compression_level;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn PageDecoder>) -> Self {
        self.config.decoder = Some(decoder);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, PrtError> {
        self.config.settings().validate()?;
        if self.config.concurrency == 0 {
            return Err(PrtError::InvalidSettings("concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}
