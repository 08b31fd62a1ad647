use clap::Parser;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use typedupe::cli::Cli;
use typedupe::error::ExitCode;

fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.ts"), "export type Id = string;\nexport type Dir = 'up' | 'down';\n").unwrap();
    fs::write(src.join("b.ts"), "export type Id = string;\n").unwrap();
    fs::write(src.join("c.ts"), "type Way = 'up' | 'down';\n").unwrap();
    fs::write(src.join("bad.ts"), "interface {\n").unwrap();
    dir
}

fn run(root: &Path, output: &str, report: &Path, extra: &[&str]) -> ExitCode {
    let mut args = vec![
        "typedupe".to_string(),
        "-q".to_string(),
        "scan".to_string(),
        root.to_string_lossy().to_string(),
        "--output".to_string(),
        output.to_string(),
        "--output-file".to_string(),
        report.to_string_lossy().to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    let cli = Cli::try_parse_from(args).unwrap();
    typedupe::run_app(cli).unwrap()
}

#[test]
fn test_json_report_file() {
    let dir = fixture();
    let report_path = dir.path().join("report.json");

    let code = run(&dir.path().join("src"), "json", &report_path, &[]);
    assert_eq!(code, ExitCode::PartialSuccess);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(value["mode"], "both");
    assert_eq!(value["summary"]["units_discovered"], 4);
    assert_eq!(value["summary"]["units_failed"], 1);

    let names = value["name_groups"].as_array().unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0]["key"], "Id");

    // Equal counts, key order decides
    let shapes = value["shape_groups"].as_array().unwrap();
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0]["key"], "type __NAME__ = 'up' | 'down'");
    assert_eq!(shapes[1]["key"], "type __NAME__ = string");

    let errors = value["unit_errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["unit_id"].as_str().unwrap().ends_with("bad.ts"));
}

#[test]
fn test_markdown_report_file() {
    let dir = fixture();
    let report_path = dir.path().join("report.md");

    run(&dir.path().join("src"), "markdown", &report_path, &["--mode", "shape"]);

    let out = fs::read_to_string(&report_path).unwrap();
    assert!(out.contains("## Shape duplicates"));
    assert!(!out.contains("## Name duplicates"));
    assert!(out.contains("| `type __NAME__ = string` | 2 |"));
    assert!(out.contains("## Skipped units"));
}

#[test]
fn test_text_report_file_has_no_color() {
    let dir = fixture();
    let report_path = dir.path().join("report.txt");

    run(&dir.path().join("src"), "text", &report_path, &["--max-errors", "0"]);

    let out = fs::read_to_string(&report_path).unwrap();
    assert!(out.contains("Name duplicates: 1 group"));
    assert!(out.contains("Id (2)"));
    assert!(out.contains("Skipped units: 1"));
    assert!(out.contains("... and 1 more"));
    assert!(!out.contains('\x1b'));
}

#[test]
fn test_include_reexports_flag() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "export interface Shape { x: number; }\n").unwrap();
    fs::write(dir.path().join("index.ts"), "export { Shape } from './a';\n").unwrap();
    let report_path = dir.path().join("report.json");

    let code = run(dir.path(), "json", &report_path, &["--mode", "name"]);
    assert_eq!(code, ExitCode::NoDuplicates);

    let code = run(
        dir.path(),
        "json",
        &report_path,
        &["--mode", "name", "--include-reexports"],
    );
    assert_eq!(code, ExitCode::Success);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    let members = value["name_groups"][0]["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().any(|m| m["kind"] == "reexport"));
}
