//! Configuration layering: defaults, files, environment and flags.
//!
//! Every test runs inside a `figment::Jail`, which serializes the tests and
//! restores the working directory and environment afterwards.

use clap::Parser;
use figment::Jail;
use typedupe::cli::{Cli, Commands};
use typedupe::config::{Config, ConfigError};
use typedupe::duplicates::DetectionMode;

fn load(explicit: Option<&std::path::Path>) -> Result<Config, figment::Error> {
    Config::load(explicit).map_err(|e| figment::Error::from(e.to_string()))
}

#[test]
fn test_defaults_without_files() {
    Jail::expect_with(|jail| {
        let xdg = jail.directory().display().to_string();
        jail.set_env("XDG_CONFIG_HOME", xdg);
        let config = load(None)?;
        assert_eq!(config, Config::default());
        Ok(())
    });
}

#[test]
fn test_project_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "typedupe.toml",
            r#"
                mode = "shape"
                min_group_size = 3
                include_enums = false
                exclude_dirs = ["vendor"]
            "#,
        )?;

        let config = load(None)?;
        assert_eq!(config.mode, "shape");
        assert_eq!(config.min_group_size, 3);
        assert!(!config.include_enums);
        assert_eq!(config.exclude_dirs, vec!["vendor"]);
        // Unset keys keep their defaults
        assert_eq!(config.io_threads, 4);
        assert!(config.skip_reexports);
        Ok(())
    });
}

#[test]
fn test_explicit_file_replaces_project_file() {
    Jail::expect_with(|jail| {
        jail.create_file("typedupe.toml", "min_group_size = 5")?;
        jail.create_file("ci.toml", "mode = \"name\"")?;

        let config = load(Some(std::path::Path::new("ci.toml")))?;
        assert_eq!(config.mode, "name");
        assert_eq!(config.min_group_size, 2);
        Ok(())
    });
}

#[test]
fn test_environment_beats_file() {
    Jail::expect_with(|jail| {
        jail.create_file("typedupe.toml", "min_group_size = 3\nio_threads = 2")?;
        jail.set_env("TYPEDUPE_MIN_GROUP_SIZE", "4");
        jail.set_env("TYPEDUPE_EXTENSIONS", "[\"ts\", \"mts\"]");

        let config = load(None)?;
        assert_eq!(config.min_group_size, 4);
        assert_eq!(config.io_threads, 2);
        assert_eq!(config.extensions, vec!["ts", "mts"]);
        Ok(())
    });
}

#[test]
fn test_flags_beat_environment() {
    Jail::expect_with(|jail| {
        jail.set_env("TYPEDUPE_MODE", "name");
        jail.set_env("TYPEDUPE_IGNORE_PATTERNS", "[\"gen/\"]");

        let mut config = load(None)?;
        let Commands::Scan(args) = Cli::try_parse_from([
            "typedupe", "scan", "--mode", "shape", "--ignore", "tmp/",
        ])
        .map_err(|e| e.to_string())?
        .command;
        config.apply_scan_args(&args);

        let validated = config.validate().map_err(|e| e.to_string())?;
        assert_eq!(validated.mode, DetectionMode::Shape);
        assert_eq!(validated.walker_config.ignore_patterns, vec!["gen/", "tmp/"]);
        Ok(())
    });
}

#[cfg(target_os = "linux")]
#[test]
fn test_user_file_is_lowest_file_layer() {
    Jail::expect_with(|jail| {
        let home = jail.directory().join("xdg");
        jail.set_env("XDG_CONFIG_HOME", home.display().to_string());
        std::fs::create_dir_all(home.join("typedupe")).map_err(|e| e.to_string())?;
        jail.create_file("xdg/typedupe/config.toml", "min_group_size = 6\nio_threads = 8")?;
        jail.create_file("typedupe.toml", "min_group_size = 3")?;

        assert_eq!(
            Config::user_config_path(),
            Some(home.join("typedupe").join("config.toml"))
        );

        let config = load(None)?;
        assert_eq!(config.min_group_size, 3);
        assert_eq!(config.io_threads, 8);
        Ok(())
    });
}

#[test]
fn test_malformed_environment_value() {
    Jail::expect_with(|jail| {
        jail.set_env("TYPEDUPE_IO_THREADS", "lots");

        assert!(matches!(Config::load(None), Err(ConfigError::Load(_))));
        Ok(())
    });
}

#[test]
fn test_invalid_value_from_file_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_file("typedupe.toml", "mode = \"bothh\"")?;

        let config = load(None)?;
        match config.validate() {
            Err(ConfigError::UnknownMode { suggestion, .. }) => {
                assert_eq!(suggestion, Some("both"));
            }
            other => panic!("Expected UnknownMode, got {other:?}"),
        }
        Ok(())
    });
}
