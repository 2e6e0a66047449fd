//! Pipeline stages for PDF-to-PRT conversion.
//!
//! Each submodule implements exactly one step. Everything from [`geometry`]
//! down is pure: no I/O, no shared state, only the caller's RNG.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ geometry ──▶ header ──┐
//! (bytes)   (pdfium)   (px sizes)            ├──▶ assemble ──▶ .prt / .prt.pvw
//!                                 payload ───┤
//!                                 control ───┘
//! ```
//!
//! 1. [`input`]    — read a local path or buffer and check the `%PDF` magic
//! 2. [`decode`]   — page count and first-page size via a [`decode::PageDecoder`]
//! 3. [`geometry`] — points → pixels, preview rescale, every byte-count formula
//! 4. [`header`]   — ASCII `KEY:VALUE` headers for both artifacts
//! 5. [`payload`]  — procedural intensity bytes and preview resampling
//! 6. [`control`]  — print-head firing data (primary only)
//! 7. [`assemble`] — exact-length concatenation and the pure synthesis entry point

pub mod assemble;
pub mod control;
pub mod decode;
pub mod geometry;
pub mod header;
pub mod input;
pub mod payload;
