//! CLI binary for pdf2prt.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2prt::pipeline::geometry::preview_dpi;
use pdf2prt::{
    convert_stream_to_files, inspect, ColorMode, ConversionConfig, ConversionProgressCallback,
    ConversionStage, ConversionStats, DocumentError, DocumentInfo, ProgressCallback,
};
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Render a byte count as B / KiB / MiB / GiB.
fn human_bytes(n: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the batch, one log line per
/// finished document. Documents may finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-document wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Input names by index, so stage messages can say which file.
    names: Mutex<HashMap<usize, String>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            names: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn name(&self, index: usize) -> String {
        self.names
            .lock()
            .ok()
            .and_then(|m| m.get(&index).cloned())
            .unwrap_or_default()
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_documents} document(s)…"))
        ));
    }

    fn on_document_start(&self, index: usize, _total: usize, input: &str) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        if let Ok(mut m) = self.names.lock() {
            m.insert(index, input.to_string());
        }
        self.bar.set_message(input.to_string());
    }

    fn on_stage(&self, index: usize, stage: ConversionStage) {
        self.bar
            .set_message(format!("{} {}", self.name(index), dim(stage.label())));
    }

    fn on_document_complete(&self, index: usize, total: usize, bytes_written: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            green("✓"),
            index + 1,
            total,
            self.name(index),
            dim(&human_bytes(bytes_written)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_documents: usize, success_count: usize) {
        let failed = total_documents.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} document(s) converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents converted  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Write document.prt and document.prt.pvw next to the input
  pdf2prt document.pdf

  # Grayscale at 1200 DPI into another directory
  pdf2prt --dpi 1200 --color-mode grayscale -o out/ document.pdf

  # Reproducible output for regression fixtures
  pdf2prt --seed 42 fixture.pdf

  # Several documents, four at a time, JSON summary on stdout
  pdf2prt -c 4 --json a.pdf b.pdf c.pdf > summary.json

  # Show the geometry a conversion would use, without writing anything
  pdf2prt --inspect-only document.pdf

COLOR MODES:
  cmyk        4 bytes/pixel (default)
  grayscale   1 byte/pixel
  bw          1 byte/pixel, values 0 or 255 only

SIZES:
  primary payload  = width × height × bpp × pages × (1.3 − compression/100)
  preview payload  = preview width × height × bpp × pages × 0.9
  control data     = primary payload / 10
  preview DPI      = min(DPI, 300)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory); system search path otherwise
  RUST_LOG          Override the log filter (e.g. pdf2prt=debug)
"#;

/// Convert PDF documents into inkjet .prt and .prt.pvw artifacts.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2prt",
    version,
    about = "Convert PDF documents into inkjet .prt and .prt.pvw artifacts",
    long_about = "Convert PDF documents into an inkjet print job (.prt) and a low-resolution \
preview (.prt.pvw). Each artifact is a KEY:VALUE header followed by binary droplet data sized \
from the first page's dimensions, the page count and the chosen DPI, color mode and compression.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// One or more local PDF files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the artifacts. Defaults to each input's directory.
    #[arg(short, long, env = "PDF2PRT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Target resolution in dots per inch.
    #[arg(long, env = "PDF2PRT_DPI", default_value_t = 600,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Color mode: cmyk, grayscale or bw.
    #[arg(long, env = "PDF2PRT_COLOR_MODE", value_enum, default_value = "cmyk")]
    color_mode: ColorModeArg,

    /// Compression level (10–100); higher means a smaller primary payload.
    #[arg(long, env = "PDF2PRT_COMPRESSION", default_value_t = 80,
          value_parser = clap::value_parser!(u32).range(10..=100))]
    compression: u32,

    /// Seed the jitter generator for byte-reproducible output.
    #[arg(long, env = "PDF2PRT_SEED")]
    seed: Option<u64>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PRT_PASSWORD")]
    password: Option<String>,

    /// Number of documents converted at once.
    #[arg(short, long, env = "PDF2PRT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Print decoded geometry only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON summary on stdout.
    #[arg(long, env = "PDF2PRT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PRT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PRT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PRT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ColorModeArg {
    Cmyk,
    Grayscale,
    #[value(alias = "blackwhite")]
    Bw,
}

impl From<ColorModeArg> for ColorMode {
    fn from(v: ColorModeArg) -> Self {
        match v {
            ColorModeArg::Cmyk => ColorMode::Cmyk,
            ColorModeArg::Grayscale => ColorMode::Grayscale,
            ColorModeArg::Bw => ColorMode::BlackWhite,
        }
    }
}

/// One line of the `--json` summary.
#[derive(Serialize)]
#[serde(untagged)]
enum DocumentSummary {
    Converted {
        input: String,
        primary: PathBuf,
        preview: PathBuf,
        stats: ConversionStats,
    },
    Failed {
        input: String,
        error: DocumentError,
    },
}

#[derive(Serialize)]
struct InspectSummary {
    input: String,
    #[serde(flatten)]
    info: DocumentInfo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs when it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        return run_inspect(&cli, &config).await;
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let mut stream = convert_stream_to_files(cli.inputs.clone(), cli.output_dir.clone(), &config)
        .context("Invalid conversion settings")?;

    let mut summaries: Vec<(usize, DocumentSummary)> = Vec::with_capacity(cli.inputs.len());
    let mut failed = 0usize;

    while let Some(item) = stream.next().await {
        match item {
            Ok(doc) => {
                if !cli.quiet && !show_progress && !cli.json {
                    let stats = &doc.output.stats;
                    eprintln!(
                        "{}  {}  {} pages  {}  {}ms",
                        green("✔"),
                        bold(&doc.input),
                        stats.page_count,
                        dim(&human_bytes(stats.primary_bytes + stats.preview_bytes)),
                        stats.total_duration_ms,
                    );
                }
                let (primary, preview) = match doc.paths {
                    Some(paths) => (paths.primary, paths.preview),
                    None => (PathBuf::new(), PathBuf::new()),
                };
                summaries.push((
                    doc.index,
                    DocumentSummary::Converted {
                        input: doc.input,
                        primary,
                        preview,
                        stats: doc.output.stats,
                    },
                ));
            }
            Err(error) => {
                failed += 1;
                if !show_progress {
                    eprintln!("{}  {}", red("✗"), error);
                }
                summaries.push((
                    error.index(),
                    DocumentSummary::Failed {
                        input: error.input().to_string(),
                        error,
                    },
                ));
            }
        }
    }

    if cli.json {
        summaries.sort_by_key(|(index, _)| *index);
        let docs: Vec<&DocumentSummary> = summaries.iter().map(|(_, s)| s).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&docs).context("Failed to serialise summary")?
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} document(s) failed", cli.inputs.len());
    }
    Ok(())
}

async fn run_inspect(cli: &Cli, config: &ConversionConfig) -> Result<()> {
    let mut reports = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        let info = inspect(input, config)
            .await
            .with_context(|| format!("Failed to inspect {}", input.display()))?;
        reports.push(InspectSummary {
            input: input.display().to_string(),
            info,
        });
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialize geometry")?
        );
        return Ok(());
    }

    for r in &reports {
        let i = &r.info;
        println!("File:         {}", r.input);
        println!("Pages:        {}", i.source.page_count);
        println!(
            "Page size:    {:.2} × {:.2} pt",
            i.source.width_pts, i.source.height_pts
        );
        println!(
            "Primary:      {} × {} px @ {} DPI, {}",
            i.geometry.width, i.geometry.height, i.settings.dpi, i.settings.color_mode
        );
        println!(
            "Preview:      {} × {} px @ {} DPI",
            i.preview_geometry.width,
            i.preview_geometry.height,
            preview_dpi(i.settings.dpi)
        );
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .color_mode(cli.color_mode.into())
        .compression_level(cli.compression)
        .concurrency(cli.concurrency);

    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
