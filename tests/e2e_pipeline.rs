// ipsift - tests/e2e_pipeline.rs
//
// End-to-end tests for the extraction pipeline.
//
// These tests read real fixture files from disk and write real output files
// into temporary directories. They cover the path from a raw input file to
// the sorted, deduplicated record file.

use ipsift::app::pipeline::{self, RunOptions, SourceKind};
use ipsift::core::model::{ColumnType, ExtractMode};
use ipsift::core::template::TemplateSpec;
use ipsift::util::error::IpSiftError;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to an on-disk fixture file.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn options(mode: ExtractMode, port: Option<&str>) -> RunOptions {
    RunOptions {
        mode,
        default_port: port.map(str::to_string),
    }
}

// =============================================================================
// Quick mode
// =============================================================================

/// A link list yields one record per distinct endpoint, remarks decoded.
#[test]
fn e2e_protocol_links_with_remarks() {
    let outcome = pipeline::run_quick(
        &fixture("links.txt"),
        &options(ExtractMode::IpPortRemark, Some("443")),
    )
    .unwrap();

    assert_eq!(outcome.kind, SourceKind::ProtocolLinks);
    assert_eq!(
        outcome.records,
        vec![
            "192.0.2.44:10086",
            "198.51.100.9:8388#SG Node",
            "203.0.113.7:8443#JP-Tokyo",
            "hk.example.net:443#香港 01",
        ]
    );
    // The endpoint-less ss link and the plain text line.
    assert_eq!(outcome.skipped, 2);
}

#[test]
fn e2e_protocol_links_space_mode_drops_remarks() {
    let outcome = pipeline::run_quick(
        &fixture("links.txt"),
        &options(ExtractMode::IpSpacePort, None),
    )
    .unwrap();
    assert_eq!(
        outcome.records,
        vec![
            "192.0.2.44 10086",
            "198.51.100.9 8388",
            "203.0.113.7 8443",
            "hk.example.net 443",
        ]
    );
}

/// Free text: group separators are ignored and portless addresses are
/// dropped unless a default port is given.
#[test]
fn e2e_mixed_text_default_port_policy() {
    let without = pipeline::run_quick(
        &fixture("mixed.txt"),
        &options(ExtractMode::IpSpacePort, None),
    )
    .unwrap();
    assert_eq!(without.kind, SourceKind::Text);
    assert_eq!(
        without.records,
        vec!["192.0.2.10 443", "192.0.2.11 8080", "198.51.100.20 22"]
    );
    assert_eq!(without.skipped, 2);

    let with = pipeline::run_quick(
        &fixture("mixed.txt"),
        &options(ExtractMode::IpPortRemark, Some("443")),
    )
    .unwrap();
    assert_eq!(
        with.records,
        vec![
            "192.0.2.10:443",
            "192.0.2.11:8080",
            "192.0.2.12:443",
            "198.51.100.20:22",
        ]
    );
}

/// CSV: the port column is found by header; bad or empty ports fall back
/// to the default port.
#[test]
fn e2e_csv_port_column_and_default() {
    let outcome = pipeline::run_quick(
        &fixture("table.csv"),
        &options(ExtractMode::IpPortRemark, Some("443")),
    )
    .unwrap();
    assert_eq!(outcome.kind, SourceKind::Tabular);
    assert_eq!(
        outcome.records,
        vec!["192.0.2.30:443", "192.0.2.31:443", "192.0.2.32:443"]
    );

    let strict = pipeline::run_quick(
        &fixture("table.csv"),
        &options(ExtractMode::IpSpacePort, None),
    )
    .unwrap();
    assert_eq!(strict.records, vec!["192.0.2.30 443"]);
    assert_eq!(strict.skipped, 2);
}

/// Headerless tab-separated rows go through table inference with the
/// address:port field sub-split.
#[test]
fn e2e_inferred_table_quick_mode() {
    let outcome = pipeline::run_quick(
        &fixture("tab_table.tsv"),
        &options(ExtractMode::IpSpacePort, None),
    )
    .unwrap();
    assert_eq!(
        outcome.records,
        vec!["192.0.2.40 443", "192.0.2.41 8443", "192.0.2.42 80"]
    );
}

#[test]
fn e2e_inspect_reports_shape() {
    let table = pipeline::inspect(&fixture("tab_table.tsv")).unwrap().unwrap();
    assert_eq!(table.delimiter, "\t");
    assert_eq!(table.field_count, 3);
    assert_eq!(
        table.columns,
        vec![
            ColumnType::IpOnly,
            ColumnType::Port,
            ColumnType::Text,
            ColumnType::Port
        ]
    );
    assert_eq!(table.header(0), "column 1 (IP_ONLY)");
}

// =============================================================================
// Custom template mode
// =============================================================================

#[test]
fn e2e_custom_preset_sorted_by_port() {
    let spec = TemplateSpec {
        columns: vec![1, 2, 3],
        sort_by: Some(2),
        ..TemplateSpec::default()
    };
    let records = pipeline::run_custom(&fixture("tab_table.tsv"), &spec).unwrap();
    assert_eq!(
        records,
        vec!["192.0.2.42:80#US", "192.0.2.40:443#HK", "192.0.2.41:8443#JP"]
    );
}

#[test]
fn e2e_custom_format_with_and_without_dedupe() {
    let mut spec = TemplateSpec {
        columns: vec![1, 3],
        format: Some("[2] [1]".into()),
        ..TemplateSpec::default()
    };
    let records = pipeline::run_custom(&fixture("table.csv"), &spec).unwrap();
    assert_eq!(
        records,
        vec!["HK 192.0.2.30", "JP 192.0.2.31", "US 192.0.2.32"]
    );

    spec.dedupe = false;
    let records = pipeline::run_custom(&fixture("table.csv"), &spec).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0], records[1]);
}

#[test]
fn e2e_custom_without_structure_is_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.txt");
    std::fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();
    let err = pipeline::run_custom(
        &path,
        &TemplateSpec {
            columns: vec![1],
            ..TemplateSpec::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, IpSiftError::Source(_)), "got {err:?}");
}

// =============================================================================
// Output
// =============================================================================

/// Records are written one per line, newline-terminated, with `.txt` added.
#[test]
fn e2e_write_output_file() {
    let outcome = pipeline::run_quick(
        &fixture("mixed.txt"),
        &options(ExtractMode::IpOnly, None),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("ips");
    let path = pipeline::write_output(&outcome.records, name.to_str().unwrap()).unwrap();

    assert_eq!(path, dir.path().join("ips.txt"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "192.0.2.10\n192.0.2.11\n192.0.2.12\n198.51.100.20\n"
    );
}

#[test]
fn e2e_missing_input_reports_path() {
    let err = pipeline::run_quick(&fixture("absent.txt"), &RunOptions::default()).unwrap_err();
    assert!(err.to_string().contains("absent.txt"));
}
