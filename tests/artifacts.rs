//! Integration tests for the conversion API.
//!
//! Every test injects a fake [`PageDecoder`], so none of them need libpdfium.
//! Inputs are small files starting with the `%PDF` magic written to a temp
//! directory; the fake decoder ignores their content.

use futures::StreamExt;
use pdf2prt::{
    convert, convert_bytes, convert_stream, convert_stream_to_files, convert_sync,
    convert_to_files, inspect, parse_header, ArtifactKind, ColorMode, ConversionConfig,
    ConversionProgressCallback, ConversionStage, DocumentError, PageDecoder, PrtError, SourcePage,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// US Letter in points: 850 × 1100 px at 100 DPI.
const LETTER: SourcePage = SourcePage {
    width_pts: 612.0,
    height_pts: 792.0,
    page_count: 1,
};

struct FixedDecoder(SourcePage);

impl PageDecoder for FixedDecoder {
    fn decode_page(
        &self,
        _bytes: &[u8],
        _password: Option<&str>,
        _source_name: &str,
    ) -> Result<SourcePage, PrtError> {
        Ok(self.0)
    }
}

/// Demands a password unless `secret` is supplied.
struct LockedDecoder {
    secret: &'static str,
}

impl PageDecoder for LockedDecoder {
    fn decode_page(
        &self,
        _bytes: &[u8],
        password: Option<&str>,
        source_name: &str,
    ) -> Result<SourcePage, PrtError> {
        match password {
            None => Err(PrtError::PasswordRequired {
                source_name: source_name.to_string(),
            }),
            Some(p) if p == self.secret => Ok(LETTER),
            Some(_) => Err(PrtError::WrongPassword {
                source_name: source_name.to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
    stages: Mutex<Vec<ConversionStage>>,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl ConversionProgressCallback for RecordingCallback {
    fn on_conversion_start(&self, total: usize) {
        self.events.lock().unwrap().push(format!("start:{total}"));
    }

    fn on_stage(&self, _index: usize, stage: ConversionStage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_document_complete(&self, _index: usize, _total: usize, _bytes: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_document_error(&self, _index: usize, _total: usize, _error: &str) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_conversion_complete(&self, total: usize, success: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("complete:{total}:{success}"));
    }
}

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF\n").unwrap();
    path
}

fn config_with(page: SourcePage, dpi: u32, mode: ColorMode) -> ConversionConfig {
    ConversionConfig::builder()
        .dpi(dpi)
        .color_mode(mode)
        .compression_level(80)
        .seed(7)
        .decoder(Arc::new(FixedDecoder(page)))
        .build()
        .unwrap()
}

// ── Single document ──────────────────────────────────────────────────────────

#[tokio::test]
async fn letter_black_white_at_100_dpi_has_exact_sizes() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "letter.pdf");
    let config = config_with(LETTER, 100, ColorMode::BlackWhite);

    let (stats, paths) = convert_to_files(&input, None, &config).await.unwrap();

    assert_eq!(paths.primary, dir.path().join("letter.prt"));
    assert_eq!(paths.preview, dir.path().join("letter.prt.pvw"));
    assert_eq!(stats.payload_bytes, 467_500);
    assert_eq!(stats.control_bytes, 46_750);
    assert_eq!(stats.preview_payload_bytes, 841_500);

    let primary = std::fs::read(&paths.primary).unwrap();
    let header = parse_header(&primary).expect("primary header");
    assert_eq!(header.kind, ArtifactKind::Primary);
    assert_eq!(header.get("WIDTH"), Some("850"));
    assert_eq!(header.get("HEIGHT"), Some("1100"));
    assert_eq!(header.get("DPI"), Some("100"));
    assert_eq!(header.get("COLOR_MODE"), Some("BlackWhite"));
    assert_eq!(
        primary.len(),
        header.payload_offset + 467_500 + 46_750,
        "primary = header ++ payload ++ control"
    );
    let payload = &primary[header.payload_offset..header.payload_offset + 467_500];
    assert!(payload.iter().all(|&b| b == 0 || b == 255));

    let preview = std::fs::read(&paths.preview).unwrap();
    let header = parse_header(&preview).expect("preview header");
    assert_eq!(header.kind, ArtifactKind::Preview);
    assert_eq!(header.get("COMPRESSION"), Some("90"));
    assert_eq!(preview.len(), header.payload_offset + 841_500);
    assert_eq!(stats.primary_bytes, primary.len());
    assert_eq!(stats.preview_bytes, preview.len());
}

#[tokio::test]
async fn output_dir_overrides_input_directory() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let input = write_pdf(src.path(), "report.pdf");
    let small = SourcePage {
        width_pts: 72.0,
        height_pts: 72.0,
        page_count: 2,
    };
    let config = config_with(small, 100, ColorMode::Grayscale);

    let (_, paths) = convert_to_files(&input, Some(out.path()), &config)
        .await
        .unwrap();

    assert_eq!(paths.primary, out.path().join("report.prt"));
    assert!(paths.primary.exists());
    assert!(paths.preview.exists());
    assert!(!src.path().join("report.prt").exists());
}

#[tokio::test]
async fn seeded_conversions_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "a.pdf");
    let page = SourcePage {
        width_pts: 144.0,
        height_pts: 72.0,
        page_count: 3,
    };
    let config = config_with(page, 150, ColorMode::Cmyk);

    let a = convert(&input, &config).await.unwrap();
    let b = convert(&input, &config).await.unwrap();

    assert_eq!(a.artifacts.primary.payload, b.artifacts.primary.payload);
    assert_eq!(
        a.artifacts.primary.control_data,
        b.artifacts.primary.control_data
    );
    assert_eq!(a.artifacts.preview.payload, b.artifacts.preview.payload);
}

#[tokio::test]
async fn stages_fire_in_pipeline_order() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "staged.pdf");
    let cb = Arc::new(RecordingCallback::default());
    let mut config = config_with(LETTER, 72, ColorMode::Grayscale);
    config.progress_callback = Some(cb.clone());

    convert(&input, &config).await.unwrap();

    assert_eq!(
        *cb.stages.lock().unwrap(),
        vec![
            ConversionStage::Decoding,
            ConversionStage::Header,
            ConversionStage::Payload,
            ConversionStage::ControlData,
            ConversionStage::Preview,
            ConversionStage::Assembling,
        ]
    );
    assert_eq!(
        *cb.events.lock().unwrap(),
        vec!["start:1".to_string(), "complete:1:1".to_string()]
    );
    assert_eq!(cb.completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_input_is_reported_before_decoding() {
    let config = config_with(LETTER, 100, ColorMode::Cmyk);
    let err = convert("/no/such/dir/missing.pdf", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, PrtError::FileNotFound { .. }));
}

#[tokio::test]
async fn non_pdf_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"hello world").unwrap();
    let config = config_with(LETTER, 100, ColorMode::Cmyk);

    let err = convert(&path, &config).await.unwrap_err();
    assert!(matches!(err, PrtError::NotAPdf { .. }));
}

#[tokio::test]
async fn password_is_forwarded_to_the_decoder() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "locked.pdf");
    let base = ConversionConfig::builder()
        .dpi(72)
        .decoder(Arc::new(LockedDecoder { secret: "hunter2" }));

    let no_pwd = base.build().unwrap();
    let err = convert(&input, &no_pwd).await.unwrap_err();
    assert!(matches!(err, PrtError::PasswordRequired { .. }));

    let wrong = ConversionConfig {
        password: Some("nope".into()),
        ..no_pwd.clone()
    };
    let err = convert(&input, &wrong).await.unwrap_err();
    assert!(matches!(err, PrtError::WrongPassword { .. }));

    let right = ConversionConfig {
        password: Some("hunter2".into()),
        ..no_pwd
    };
    let out = convert(&input, &right).await.unwrap();
    assert_eq!(out.artifacts.geometry.width, 612);
}

#[tokio::test]
async fn degenerate_page_fails_without_writing() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "empty.pdf");
    let zero = SourcePage {
        width_pts: 0.0,
        height_pts: 792.0,
        page_count: 1,
    };
    let config = config_with(zero, 100, ColorMode::Cmyk);

    let err = convert_to_files(&input, None, &config).await.unwrap_err();
    assert!(matches!(err, PrtError::InvalidGeometry { .. }));
    assert!(!dir.path().join("empty.prt").exists());
    assert!(!dir.path().join("empty.prt.pvw").exists());
}

#[tokio::test]
async fn inspect_reports_geometry_without_synthesis() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "big.pdf");
    let config = config_with(LETTER, 600, ColorMode::Cmyk);

    let info = inspect(&input, &config).await.unwrap();
    assert_eq!((info.geometry.width, info.geometry.height), (5100, 6600));
    assert_eq!(
        (info.preview_geometry.width, info.preview_geometry.height),
        (2550, 3300)
    );
    assert_eq!(info.source, LETTER);
}

#[test]
fn convert_bytes_runs_on_a_test_runtime() {
    let config = config_with(LETTER, 36, ColorMode::BlackWhite);
    let out = tokio_test::block_on(convert_bytes(b"%PDF-1.4\n%%EOF\n", &config)).unwrap();
    assert_eq!((out.artifacts.geometry.width, out.artifacts.geometry.height), (306, 396));

    let err = tokio_test::block_on(convert_bytes(b"GIF89a", &config)).unwrap_err();
    assert!(matches!(err, PrtError::NotAPdf { .. }));
}

#[tokio::test]
async fn rejected_buffer_still_reports_progress() {
    let cb = Arc::new(RecordingCallback::default());
    let mut config = config_with(LETTER, 100, ColorMode::Cmyk);
    config.progress_callback = Some(cb.clone());

    let err = convert_bytes(b"PK\x03\x04", &config).await.unwrap_err();
    assert!(matches!(err, PrtError::NotAPdf { .. }));

    assert_eq!(cb.failed.load(Ordering::SeqCst), 1);
    assert_eq!(
        *cb.events.lock().unwrap(),
        vec!["start:1".to_string(), "complete:1:0".to_string()]
    );
}

#[test]
fn convert_sync_matches_async_sizes() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "sync.pdf");
    let config = config_with(LETTER, 100, ColorMode::BlackWhite);

    let out = convert_sync(&input, &config).unwrap();
    assert_eq!(out.stats.payload_bytes, 467_500);
}

// ── Batch ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_isolates_failures() {
    let dir = TempDir::new().unwrap();
    let good_a = write_pdf(dir.path(), "a.pdf");
    let good_b = write_pdf(dir.path(), "b.pdf");
    let bad = dir.path().join("c.pdf");
    std::fs::write(&bad, b"not really a pdf").unwrap();

    let cb = Arc::new(RecordingCallback::default());
    let mut config = config_with(LETTER, 50, ColorMode::Grayscale);
    config.concurrency = 2;
    config.progress_callback = Some(cb.clone());

    let results: Vec<_> = convert_stream(vec![good_a, bad.clone(), good_b], &config)
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    let mut ok_indices: Vec<usize> = results
        .iter()
        .filter_map(|r| r.as_ref().ok().map(|d| d.index))
        .collect();
    ok_indices.sort_unstable();
    assert_eq!(ok_indices, vec![0, 2]);

    let errors: Vec<&DocumentError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], DocumentError::ConversionFailed { .. }));
    assert_eq!(errors[0].input(), bad.display().to_string());
    assert_eq!(errors[0].index(), 1);

    assert_eq!(cb.completed.load(Ordering::SeqCst), 2);
    assert_eq!(cb.failed.load(Ordering::SeqCst), 1);
    assert_eq!(
        *cb.events.lock().unwrap(),
        vec!["start:3".to_string(), "complete:3:2".to_string()]
    );
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .all(|d| d.paths.is_none()));
}

#[tokio::test]
async fn repeated_failing_input_keeps_each_position() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("broken.pdf");
    std::fs::write(&bad, b"not really a pdf").unwrap();
    let good = write_pdf(dir.path(), "fine.pdf");
    let config = config_with(LETTER, 30, ColorMode::BlackWhite);

    let results: Vec<_> = convert_stream(vec![bad.clone(), good, bad], &config)
        .unwrap()
        .collect()
        .await;

    let mut failed: Vec<usize> = results
        .iter()
        .filter_map(|r| r.as_ref().err().map(DocumentError::index))
        .collect();
    failed.sort_unstable();
    assert_eq!(failed, vec![0, 2]);
}

#[tokio::test]
async fn batch_writes_every_pair() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = ["one.pdf", "two.pdf", "three.pdf"]
        .iter()
        .map(|n| write_pdf(src.path(), n))
        .collect();
    let config = config_with(LETTER, 30, ColorMode::Cmyk);

    let results: Vec<_> =
        convert_stream_to_files(inputs, Some(out.path().to_path_buf()), &config)
            .unwrap()
            .collect()
            .await;

    assert!(results.iter().all(Result::is_ok));
    for stem in ["one", "two", "three"] {
        assert!(out.path().join(format!("{stem}.prt")).exists());
        assert!(out.path().join(format!("{stem}.prt.pvw")).exists());
    }
}

#[tokio::test]
async fn empty_batch_completes_immediately() {
    let cb = Arc::new(RecordingCallback::default());
    let mut config = config_with(LETTER, 100, ColorMode::Cmyk);
    config.progress_callback = Some(cb.clone());

    let results: Vec<_> = convert_stream(Vec::new(), &config).unwrap().collect().await;
    assert!(results.is_empty());
    assert_eq!(
        *cb.events.lock().unwrap(),
        vec!["start:0".to_string(), "complete:0:0".to_string()]
    );
}

#[test]
fn batch_rejects_invalid_settings_up_front() {
    let mut config = config_with(LETTER, 100, ColorMode::Cmyk);
    config.compression_level = 5;
    assert!(matches!(
        convert_stream(vec![PathBuf::from("x.pdf")], &config),
        Err(PrtError::InvalidSettings(_))
    ));
}
