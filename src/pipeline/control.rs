//! Print-head control data, appended to the primary artifact only.
//!
//! One byte per slot, cycling over the head's nozzles:
//! `(firing_delay + droplet_size) mod 256`, where the firing delay ramps
//! linearly across the nozzle row and the droplet size is full-scale for
//! BlackWhite or jittered in `[128, 254]` otherwise.

use crate::config::ColorMode;
use crate::pipeline::geometry::control_data_len;
use crate::pipeline::header::NOZZLE_COUNT;
use rand::Rng;
use tracing::debug;

/// `floor(nozzle / 1280 × 255)`.
pub fn firing_delay(index: usize) -> u8 {
    let nozzle = index % NOZZLE_COUNT;
    (nozzle * 255 / NOZZLE_COUNT) as u8
}

fn droplet_size<R: Rng + ?Sized>(mode: ColorMode, rng: &mut R) -> u8 {
    match mode {
        ColorMode::BlackWhite => 255,
        ColorMode::Cmyk | ColorMode::Grayscale => {
            let r: f64 = rng.gen();
            (128.0 + r * 127.0).floor() as u8
        }
    }
}

/// Generate `floor(primary_payload_len / 10)` control bytes.
pub fn synthesize_control_data<R: Rng + ?Sized>(
    primary_payload_len: usize,
    mode: ColorMode,
    rng: &mut R,
) -> Vec<u8> {
    let len = control_data_len(primary_payload_len);
    let mut control = vec![0u8; len];
    for (i, byte) in control.iter_mut().enumerate() {
        let total = u16::from(firing_delay(i)) + u16::from(droplet_size(mode, rng));
        *byte = (total % 256) as u8;
    }
    debug!("Generated {} control bytes ({})", len, mode);
    control
}
