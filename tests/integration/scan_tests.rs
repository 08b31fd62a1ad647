use indoc::indoc;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use typedupe::declarations::DeclarationKind;
use typedupe::duplicates::{DetectionMode, DuplicateFinder, DuplicateReport, FinderConfig, GroupKey};
use typedupe::scanner::WalkerConfig;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const USER_INTERFACE: &str = indoc! {"
    export interface User {
      id: string;
      name: string;
    }
"};

const USER_ALIAS: &str = indoc! {"
    // Copy kept for the API layer
    export type User = {
      id: string;
      name: string;
    };
"};

const PERSON_INTERFACE: &str = indoc! {"
    /* Same members, different name */
    export interface Person {
        id: string;   name: string;
    }
"};

fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/models/user.ts", USER_INTERFACE);
    write(dir.path(), "src/api/user.ts", USER_ALIAS);
    write(dir.path(), "src/people.ts", PERSON_INTERFACE);
    dir
}

fn scan(root: &Path, config: FinderConfig) -> DuplicateReport {
    DuplicateFinder::new(config)
        .find_duplicates(&[root.to_path_buf()])
        .unwrap()
}

fn unit_names(report: &DuplicateReport, key: GroupKey, group: usize) -> Vec<String> {
    report.groups(key).unwrap()[group]
        .members
        .iter()
        .map(|m| {
            let file = PathBuf::from(&m.location.unit_id);
            let parent = file.parent().unwrap().file_name().unwrap().to_string_lossy().to_string();
            format!("{}/{}", parent, file.file_name().unwrap().to_string_lossy())
        })
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let report = scan(dir.path(), FinderConfig::default());

    assert_eq!(report.summary.units_discovered, 0);
    assert!(report.records.is_empty());
    assert!(!report.has_duplicates());
    assert_eq!(report.groups(GroupKey::Name).unwrap().len(), 0);
}

#[test]
fn test_scan_name_and_shape_groups() {
    let dir = project();
    let report = scan(dir.path(), FinderConfig::default());

    assert_eq!(report.summary.units_discovered, 3);
    assert_eq!(report.summary.units_analyzed, 3);
    assert_eq!(report.records.len(), 3);

    let names = report.groups(GroupKey::Name).unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].key, "User");
    assert_eq!(unit_names(&report, GroupKey::Name, 0), vec!["api/user.ts", "models/user.ts"]);
    assert_eq!(names[0].members[0].kind, DeclarationKind::TypeAlias);
    assert_eq!(names[0].members[0].location.line, 2);
    assert_eq!(names[0].members[1].kind, DeclarationKind::Interface);
    assert_eq!(names[0].members[1].location.line, 1);

    let shapes = report.groups(GroupKey::Shape).unwrap();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].key, "interface __NAME__ { id: string; name: string; }");
    assert_eq!(unit_names(&report, GroupKey::Shape, 0), vec!["models/user.ts", "src/people.ts"]);
}

#[test]
fn test_mode_selects_passes() {
    let dir = project();

    let name_only = scan(dir.path(), FinderConfig::default().with_mode(DetectionMode::Name));
    assert!(name_only.groups(GroupKey::Name).is_some());
    assert!(name_only.groups(GroupKey::Shape).is_none());
    assert_eq!(name_only.summary.shape_groups, 0);

    let shape_only = scan(dir.path(), FinderConfig::default().with_mode(DetectionMode::Shape));
    assert!(shape_only.groups(GroupKey::Name).is_none());
    assert_eq!(shape_only.summary.shape_groups, 1);
}

#[test]
fn test_excluded_directories_are_not_scanned() {
    let dir = project();
    write(dir.path(), "node_modules/pkg/index.d.ts", USER_INTERFACE);
    write(dir.path(), "dist/user.ts", USER_INTERFACE);

    let report = scan(dir.path(), FinderConfig::default());

    assert_eq!(report.summary.units_discovered, 3);
    assert!(report
        .records
        .iter()
        .all(|r| !r.location.unit_id.contains("node_modules") && !r.location.unit_id.contains("dist")));
}

#[test]
fn test_gitignore_and_ignore_patterns() {
    let dir = project();
    write(dir.path(), ".gitignore", "generated/\n");
    write(dir.path(), "generated/user.ts", USER_INTERFACE);
    write(dir.path(), "legacy/user.ts", USER_INTERFACE);

    let walker_config = WalkerConfig {
        ignore_patterns: vec!["legacy/".to_string()],
        ..WalkerConfig::default()
    };
    let report = scan(
        dir.path(),
        FinderConfig::default().with_walker_config(walker_config),
    );

    assert_eq!(report.summary.units_discovered, 3);
}

#[test]
fn test_reexports_skipped_unless_requested() {
    let dir = project();
    write(
        dir.path(),
        "src/index.ts",
        indoc! {r#"
            export { User } from "./models/user";
            export { User as ApiUser } from "./api/user";
            export * from "./people";
        "#},
    );

    let skipped = scan(dir.path(), FinderConfig::default());
    assert_eq!(skipped.summary.reexports_skipped, 2);
    assert!(skipped.records.iter().all(|r| !r.is_reexport));
    assert_eq!(skipped.groups(GroupKey::Name).unwrap()[0].count(), 2);

    let included = scan(dir.path(), FinderConfig::default().with_skip_reexports(false));
    assert_eq!(included.summary.reexports_skipped, 0);
    let user = &included.groups(GroupKey::Name).unwrap()[0];
    assert_eq!(user.key, "User");
    assert_eq!(user.count(), 3);
    assert!(included
        .records
        .iter()
        .any(|r| r.name == "ApiUser" && r.kind == DeclarationKind::Reexport));
}

#[test]
fn test_enums_can_be_excluded() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ts", "export enum Color { Red, Green }\n");
    write(dir.path(), "b.ts", "export const enum Color { Red, Green }\n");

    let with_enums = scan(dir.path(), FinderConfig::default());
    assert_eq!(with_enums.summary.name_groups, 1);
    // const enum and enum share a fingerprint
    assert_eq!(with_enums.summary.shape_groups, 1);
    assert_eq!(with_enums.records[0].property_names, vec!["Green", "Red"]);

    let without = scan(dir.path(), FinderConfig::default().with_include_enums(false));
    assert!(without.records.is_empty());
    assert!(!without.has_duplicates());
}

#[test]
fn test_tsx_and_module_extensions() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "view.tsx",
        indoc! {"
            export interface Props { title: string; }
            export const View = (p: Props) => <div>{p.title}</div>;
        "},
    );
    write(dir.path(), "props.mts", "export interface Props { title: string; }\n");
    write(dir.path(), "legacy.cts", "interface Props { title: string; }\n");
    write(dir.path(), "notes.md", "interface Props { title: string; }\n");

    let report = scan(dir.path(), FinderConfig::default());

    assert_eq!(report.summary.units_discovered, 3);
    assert!(report.unit_errors.is_empty());
    let names = report.groups(GroupKey::Name).unwrap();
    assert_eq!(names[0].key, "Props");
    assert_eq!(names[0].count(), 3);
}

#[test]
fn test_nested_declarations() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "global.d.ts",
        indoc! {"
            declare module 'express' {
              interface Request { user: string; }
            }
            declare namespace App {
              namespace Models {
                interface Request { user: string; }
              }
            }
        "},
    );

    let report = scan(dir.path(), FinderConfig::default());

    let names = report.groups(GroupKey::Name).unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].key, "Request");
    assert_eq!(names[0].members[0].location.line, 2);
    assert_eq!(names[0].members[1].location.line, 6);
}

#[test]
fn test_min_group_size() {
    let dir = tempdir().unwrap();
    for name in ["a.ts", "b.ts", "c.ts"] {
        write(dir.path(), name, "type Id = string;\n");
    }
    write(dir.path(), "d.ts", "type Key = number;\ntype Key = number;\n");

    let report = scan(dir.path(), FinderConfig::default().with_min_group_size(3));

    let names = report.groups(GroupKey::Name).unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].key, "Id");
    assert_eq!(names[0].count(), 3);
}

#[test]
fn test_multiple_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write(first.path(), "user.ts", USER_INTERFACE);
    write(second.path(), "user.ts", USER_INTERFACE);

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[first.path().to_path_buf(), second.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.summary.units_discovered, 2);
    assert_eq!(report.summary.name_groups, 1);
    assert_eq!(report.summary.shape_groups, 1);
}

#[test]
fn test_single_file_root() {
    let dir = tempdir().unwrap();
    write(dir.path(), "types.ts", "type A = string;\ntype A = string;\n");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().join("types.ts")])
        .unwrap();

    assert_eq!(report.summary.units_discovered, 1);
    let names = report.groups(GroupKey::Name).unwrap();
    assert_eq!(names[0].members[0].location.line, 1);
    assert_eq!(names[0].members[1].location.line, 2);
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = project();
    let config = FinderConfig::default().with_io_threads(3);

    let first = scan(dir.path(), config.clone());
    let second = scan(dir.path(), config);

    assert_eq!(first.records, second.records);
    assert_eq!(first.name_groups, second.name_groups);
    assert_eq!(first.shape_groups, second.shape_groups);
}
