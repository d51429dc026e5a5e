//! Configuration loading and resolution tests against real files.
//!
//! Covers:
//! - Loading and validating JSON config files
//! - Resolution order (CLI > env > defaults)
//! - Error reporting for malformed files

use bva_config::analysis::{BinSpec, BoundaryPolicy};
use bva_config::resolve::{load_config, resolve_config_path, ConfigError, ConfigSource};
use bva_config::validate::ValidationError;
use bva_config::{AnalysisConfig, PresetName};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let saved = keys.iter().map(|k| env::var(k).ok()).collect();
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.keys.iter().zip(self.saved.iter()) {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

fn write_config(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("write config");
    path
}

#[test]
fn loads_explicit_file() {
    let _lock = env_lock();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.json",
        r#"{"window_size": 4, "threshold": 10,
            "bins": {"kind": "edges", "edges": [0.0, 0.25, 0.5, 0.75, 1.0]},
            "boundary_policy": "clamp"}"#,
    );

    let loaded = load_config(Some(&path), None).unwrap();
    assert_eq!(loaded.source, ConfigSource::CliArgument);
    assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.config.window_size, 4);
    assert_eq!(loaded.config.threshold, 10);
    assert_eq!(loaded.config.boundary_policy, BoundaryPolicy::Clamp);
    assert_eq!(loaded.config.bin_edges().unwrap().len(), 5);
}

#[test]
fn rejects_zero_window_size_in_file() {
    let _lock = env_lock();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.json", r#"{"window_size": 0}"#);

    let err = load_config(Some(&path), None).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::ValidationError(ValidationError::InvalidWindowSize(0))
    ));
}

#[test]
fn rejects_unsorted_edges_in_file() {
    let _lock = env_lock();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "bad_edges.json",
        r#"{"bins": {"kind": "edges", "edges": [0.0, 1.0, 0.5]}}"#,
    );

    let err = load_config(Some(&path), None).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::ValidationError(ValidationError::MalformedBinEdges(_))
    ));
}

#[test]
fn reports_parse_errors_with_path() {
    let _lock = env_lock();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.json", "{ not json");

    let err = load_config(Some(&path), None).unwrap_err();
    match err {
        ConfigError::ParseError { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn env_var_path_is_used_when_no_cli_path() {
    let _lock = env_lock();
    let _guard = EnvGuard::new(&["BVA_CONFIG", "BVA_CONFIG_DIR"]);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "env.json", r#"{"threshold": 5}"#);
    env::set_var("BVA_CONFIG", &path);
    env::remove_var("BVA_CONFIG_DIR");

    let (resolved, source) = resolve_config_path(None).unwrap();
    assert_eq!(resolved.as_deref(), Some(path.as_path()));
    assert_eq!(source, ConfigSource::Environment);

    let loaded = load_config(None, None).unwrap();
    assert_eq!(loaded.config.threshold, 5);
}

#[test]
fn config_dir_env_var_is_used() {
    let _lock = env_lock();
    let _guard = EnvGuard::new(&["BVA_CONFIG", "BVA_CONFIG_DIR"]);
    let dir = TempDir::new().unwrap();
    write_config(&dir, "bva.json", r#"{"window_size": 9}"#);
    env::remove_var("BVA_CONFIG");
    env::set_var("BVA_CONFIG_DIR", dir.path());

    let loaded = load_config(None, None).unwrap();
    assert_eq!(loaded.source, ConfigSource::Environment);
    assert_eq!(loaded.config.window_size, 9);
}

#[test]
fn cli_path_beats_env() {
    let _lock = env_lock();
    let _guard = EnvGuard::new(&["BVA_CONFIG"]);
    let dir = TempDir::new().unwrap();
    let env_path = write_config(&dir, "env.json", r#"{"threshold": 1}"#);
    let cli_path = write_config(&dir, "cli.json", r#"{"threshold": 2}"#);
    env::set_var("BVA_CONFIG", &env_path);

    let loaded = load_config(Some(&cli_path), None).unwrap();
    assert_eq!(loaded.source, ConfigSource::CliArgument);
    assert_eq!(loaded.config.threshold, 2);
}

#[test]
fn preset_ignores_files() {
    let _lock = env_lock();
    let _guard = EnvGuard::new(&["BVA_CONFIG"]);
    let dir = TempDir::new().unwrap();
    let env_path = write_config(&dir, "env.json", r#"{"window_size": 0}"#);
    env::set_var("BVA_CONFIG", &env_path);

    let loaded = load_config(None, Some(PresetName::Fine)).unwrap();
    assert_eq!(loaded.source, ConfigSource::Preset(PresetName::Fine));
    assert_eq!(loaded.config.bins, BinSpec::unit_interval(0.025));
}

#[test]
fn serialized_config_reloads_identically() {
    let config = AnalysisConfig::default()
        .with_window_size(3)
        .with_bins(BinSpec::Edges {
            edges: vec![0.0, 0.3, 0.6, 1.0],
        });
    let json = config.to_json_pretty().unwrap();
    let reloaded = AnalysisConfig::from_json_str(&json).unwrap();
    assert_eq!(reloaded, config);
}
