use indoc::indoc;
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;
use typedupe::duplicates::{DuplicateFinder, FinderConfig, FinderError, GroupKey};
use typedupe::scanner::UnitError;

#[test]
fn test_parse_errors_do_not_stop_the_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "type Id = string;\n").unwrap();
    fs::write(
        dir.path().join("broken.ts"),
        indoc! {"
            type Fine = number;
            interface Broken {
              id: string
        "},
    )
    .unwrap();
    fs::write(dir.path().join("c.ts"), "type Id = string;\n").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.summary.units_discovered, 3);
    assert_eq!(report.summary.units_analyzed, 2);
    assert_eq!(report.summary.units_failed, 1);
    assert!(report.summary.has_errors());

    // The broken unit contributes nothing, not even its valid alias
    assert!(report.records.iter().all(|r| r.name != "Fine"));
    assert_eq!(report.groups(GroupKey::Name).unwrap()[0].key, "Id");

    match &report.unit_errors[0] {
        UnitError::Parse { unit_id, line, .. } => {
            assert!(unit_id.ends_with("broken.ts"));
            assert!(*line >= 2);
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_unreadable_unit_is_recorded() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "type Id = string;\n").unwrap();
    // Not valid UTF-8
    fs::write(dir.path().join("binary.ts"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
    fs::write(dir.path().join("c.ts"), "type Id = string;\n").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.summary.units_failed, 1);
    assert_eq!(report.unit_errors[0].kind(), "read");
    assert!(report.unit_errors[0].unit_id().ends_with("binary.ts"));
    assert_eq!(report.summary.name_groups, 1);
}

#[test]
fn test_errors_reported_in_unit_order() {
    let units = (0..6)
        .map(|i| {
            let source = if i % 2 == 0 {
                format!("interface {{ broken{i}")
            } else {
                format!("type T{i} = string;")
            };
            (format!("u{i}.ts"), source)
        })
        .collect();

    let report = DuplicateFinder::new(FinderConfig::default().with_io_threads(3))
        .find_duplicates_in_sources(units)
        .unwrap();

    let ids: Vec<_> = report.unit_errors.iter().map(UnitError::unit_id).collect();
    assert_eq!(ids, vec!["u0.ts", "u2.ts", "u4.ts"]);
    assert_eq!(report.summary.shape_groups, 1);
}

#[test]
fn test_every_unit_failing_still_completes() {
    let units = vec![
        ("a.ts".to_string(), "interface {".to_string()),
        ("b.ts".to_string(), "type = ;".to_string()),
    ];

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_sources(units)
        .unwrap();

    assert_eq!(report.summary.units_failed, 2);
    assert_eq!(report.summary.units_analyzed, 0);
    assert!(!report.has_duplicates());
    assert!((report.summary.failure_rate() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let result = DuplicateFinder::with_defaults().find_duplicates(&[dir.path().to_path_buf(), missing.clone()]);

    match result {
        Err(FinderError::PathNotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected PathNotFound, got {other:?}"),
    }
}

#[test]
fn test_shutdown_discards_partial_results() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "type Id = string;\n").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    assert!(matches!(
        finder.find_duplicates(&[dir.path().to_path_buf()]),
        Err(FinderError::Interrupted)
    ));
}
