use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::{tempdir, TempDir};
use trackmap_core::columns::ColumnMapping;
use trackmap_core::timestamps::parse_timestamp;
use trackmap_core::{execute, Config, RunError, RunParameters, RunRequest, SourceError};
use trackmap_parser::ParserError;

fn ts(value: &str) -> NaiveDateTime {
    parse_timestamp(value).expect("timestamp")
}

fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write source");
    path
}

fn request(source: &Path, output: &Path, start: &str, end: &str) -> Result<RunRequest, RunError> {
    let parameters = RunParameters::new("key", 500, "13800138000", ts(start), ts(end))?;
    Ok(RunRequest {
        source_path: source.to_path_buf(),
        output_path: output.to_path_buf(),
        parameters,
    })
}

const SOURCE: &str = "\
imsi,start_time,longitude,latitude
4600,2024-09-01 09:10:00,116.41,39.93
4600,2024-09-01 09:00:00,116.39,39.91
4600,2024-09-01 09:05:00,0,0
4600,garbage,116.40,39.92
4600,2024-09-01 09:20:00,116.39,39.91
4600,2024-09-02 09:00:00,116.50,39.99
";

#[test]
fn successful_run_writes_artifact_and_reports_counts() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(&dir, "samples.csv", SOURCE);
    let output = dir.path().join("track_map.html");

    let request =
        request(&source, &output, "2024-09-01 09:00:00", "2024-09-01 10:00:00").expect("request");
    let summary = execute(&request, &Config::default()).expect("run");

    assert_eq!(summary.point_count, 3);
    assert_eq!(summary.output_path, output);
    assert_eq!(summary.source_hash.len(), 64);
    assert_eq!(summary.report.total_rows, 6);
    assert_eq!(summary.report.unparseable_timestamps, 1);
    assert_eq!(summary.report.outside_window, 1);
    assert_eq!(summary.report.invalid_coordinates, 1);

    let document = std::fs::read_to_string(&output).expect("artifact");
    assert!(document.contains("\"startTime\":\"2024-09-01 09:00:00\""));
    assert!(document.contains("\"duplicateRank\":1"));
    assert!(document.contains("center: [116.39, 39.91]"));
}

#[test]
fn reversed_window_is_rejected_before_any_work() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(&dir, "samples.csv", SOURCE);
    let output = dir.path().join("track_map.html");

    let err = request(&source, &output, "2024-09-01 10:00:00", "2024-09-01 09:00:00")
        .expect_err("reversed window");
    assert!(matches!(err, RunError::InvalidWindow { .. }));
    assert!(err.is_recoverable());

    let err = request(&source, &output, "2024-09-01 09:00:00", "2024-09-01 09:00:00")
        .expect_err("equal bounds");
    assert!(matches!(err, RunError::InvalidWindow { .. }));
    assert!(!output.exists());
}

#[test]
fn interval_bounds_are_exclusive() {
    let start = ts("2024-09-01 09:00:00");
    let end = ts("2024-09-01 10:00:00");

    for bad in [0, 10_000, 20_000] {
        let err = RunParameters::new("", bad, "", start, end).expect_err("bad interval");
        let err = RunError::from(err);
        assert!(matches!(err, RunError::InvalidInterval { interval_ms } if interval_ms == bad));
    }
    assert!(RunParameters::new("", 1, "", start, end).is_ok());
    assert!(RunParameters::new("", 9_999, "", start, end).is_ok());
}

#[test]
fn window_without_points_is_empty_result_and_keeps_previous_artifact() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(&dir, "samples.csv", SOURCE);
    let output = dir.path().join("track_map.html");
    std::fs::write(&output, "previous run").expect("seed previous artifact");

    let request =
        request(&source, &output, "2024-08-01 00:00:00", "2024-08-02 00:00:00").expect("request");
    let err = execute(&request, &Config::default()).expect_err("empty");

    match &err {
        RunError::EmptyResult { start, end } => {
            assert_eq!(*start, ts("2024-08-01 00:00:00"));
            assert_eq!(*end, ts("2024-08-02 00:00:00"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("2024-08-01 00:00:00"));
    assert_eq!(
        std::fs::read_to_string(&output).expect("artifact"),
        "previous run"
    );
}

#[test]
fn missing_source_file_is_source_read_error() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("track_map.html");

    let request = request(
        &dir.path().join("absent.csv"),
        &output,
        "2024-09-01 09:00:00",
        "2024-09-01 10:00:00",
    )
    .expect("request");
    let err = execute(&request, &Config::default()).expect_err("missing file");

    assert!(matches!(err, RunError::SourceRead(SourceError::Io { .. })));
    assert!(!err.is_recoverable());
    assert!(!output.exists());
}

#[test]
fn unmapped_column_lists_available_columns() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(&dir, "samples.csv", SOURCE);
    let output = dir.path().join("track_map.html");

    let config = Config {
        columns: ColumnMapping {
            start_time: "开始时间".to_string(),
            ..ColumnMapping::default()
        },
        ..Config::default()
    };
    let request =
        request(&source, &output, "2024-09-01 09:00:00", "2024-09-01 10:00:00").expect("request");
    let err = execute(&request, &config).expect_err("missing column");

    match err {
        RunError::SourceRead(SourceError::MissingColumn { column, available }) => {
            assert_eq!(column, "开始时间");
            assert!(available.contains(&"start_time".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn configured_column_names_are_used() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(
        &dir,
        "samples.csv",
        "\u{feff}开始时间,经度,纬度\n2024-9-1 9:00:00,114.0579,22.5431\n",
    );
    let output = dir.path().join("out.html");

    let config = cjk_columns();
    let request =
        request(&source, &output, "2024-09-01 00:00:00", "2024-09-30 00:00:00").expect("request");
    let summary = execute(&request, &config).expect("run");

    assert_eq!(summary.point_count, 1);
    assert!(output.exists());
}

fn workbook_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../trackmap-parser/tests/data/samples_cjk.xlsx")
}

fn cjk_columns() -> Config {
    Config::from_toml_str(
        "[columns]\nstart_time = \"开始时间\"\nlongitude = \"经度\"\nlatitude = \"纬度\"\n",
    )
    .expect("config")
}

#[test]
fn xlsx_workbook_renders_like_delimited_text() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("track_map.html");

    let request = request(
        &workbook_fixture(),
        &output,
        "2024-09-01 00:00:00",
        "2024-09-02 00:00:00",
    )
    .expect("request");
    let summary = execute(&request, &cjk_columns()).expect("run");

    assert_eq!(summary.point_count, 3);
    assert_eq!(summary.report.total_rows, 4);
    assert_eq!(summary.report.unparseable_timestamps, 1);

    let document = std::fs::read_to_string(&output).expect("artifact");
    assert!(document.contains("\"startTime\":\"2024-09-01 09:05:00\""));
    assert!(document.contains("\"duplicateRank\":1"));
}

#[test]
fn xlsx_extension_without_workbook_content_is_parse_error() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(&dir, "samples.xlsx", SOURCE);
    let output = dir.path().join("track_map.html");

    let request =
        request(&source, &output, "2024-09-01 09:00:00", "2024-09-01 10:00:00").expect("request");
    let err = execute(&request, &Config::default()).expect_err("not a workbook");

    assert!(matches!(
        err,
        RunError::SourceRead(SourceError::Parse(ParserError::FormatMismatch { .. }))
    ));
    assert!(!output.exists());
}

#[test]
fn non_numeric_coordinate_fails_the_run() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(
        &dir,
        "samples.csv",
        "start_time,longitude,latitude\n2024-09-01 09:00:00,east,39.9\n",
    );
    let output = dir.path().join("track_map.html");

    let request =
        request(&source, &output, "2024-09-01 09:00:00", "2024-09-01 10:00:00").expect("request");
    let err = execute(&request, &Config::default()).expect_err("bad coordinate");

    assert!(matches!(
        err,
        RunError::SourceRead(SourceError::InvalidCoordinate { row_index: 0, .. })
    ));
    assert!(!output.exists());
}

#[test]
fn non_utf8_source_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("samples.csv");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).expect("write");
    let output = dir.path().join("track_map.html");

    let request =
        request(&path, &output, "2024-09-01 09:00:00", "2024-09-01 10:00:00").expect("request");
    let err = execute(&request, &Config::default()).expect_err("not utf8");
    assert!(matches!(err, RunError::SourceRead(SourceError::NotUtf8 { .. })));
}

#[test]
fn runs_are_independent() {
    let dir = tempdir().expect("tempdir");
    let source = write_source(&dir, "samples.csv", SOURCE);
    let output = dir.path().join("track_map.html");
    let config = Config::default();

    let empty =
        request(&source, &output, "2024-08-01 00:00:00", "2024-08-02 00:00:00").expect("request");
    assert!(execute(&empty, &config).is_err());

    let good =
        request(&source, &output, "2024-09-01 09:00:00", "2024-09-01 10:00:00").expect("request");
    let first = execute(&good, &config).expect("first run");
    let first_doc = std::fs::read_to_string(&output).expect("first artifact");

    let second = execute(&good, &config).expect("second run");
    let second_doc = std::fs::read_to_string(&output).expect("second artifact");

    assert_eq!(first.point_count, second.point_count);
    assert_eq!(first_doc, second_doc);
}
