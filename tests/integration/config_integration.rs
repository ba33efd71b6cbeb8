//! Layered configuration: global file, explicit file, environment

use asset_manifest::config::ConfigLoader;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes environment mutation across the tests in this binary
static ENV_MUTEX: Mutex<()> = Mutex::new(());

struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture(keys: &[&'static str]) -> Self {
        Self {
            vars: keys.iter().map(|k| (*k, std::env::var(k).ok())).collect(),
        }
    }

    fn restore(self) {
        for (k, v) in self.vars {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        }
    }
}

const KEYS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "BUILD_MANIFEST__PATTERNS__PATTERN_FILE",
    "BUILD_MANIFEST__OUTPUT__ARCHIVE_NAME",
];

#[test]
fn test_home_fallback_path() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let state = EnvState::capture(KEYS);
    let temp_dir = TempDir::new().unwrap();
    std::env::remove_var("XDG_CONFIG_HOME");
    std::env::set_var("HOME", temp_dir.path());

    let global_dir = temp_dir.path().join(".config").join("build-manifest");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        "[patterns]\nignore = [\"scratch\"]\n[digest]\nchunk_size = 4096\n",
    )
    .unwrap();

    let result = ConfigLoader::load();
    state.restore();

    let config = result.unwrap();
    assert_eq!(config.patterns.ignore, vec!["scratch"]);
    assert_eq!(config.digest.chunk_size, 4096);
}

#[test]
fn test_explicit_file_replaces_global() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let state = EnvState::capture(KEYS);
    let temp_dir = TempDir::new().unwrap();
    let xdg = temp_dir.path().join("xdg");
    fs::create_dir_all(xdg.join("build-manifest")).unwrap();
    fs::write(
        xdg.join("build-manifest").join("config.toml"),
        "[output]\nmanifest_name = \"global.patch\"\n",
    )
    .unwrap();
    std::env::set_var("XDG_CONFIG_HOME", &xdg);

    let explicit = temp_dir.path().join("explicit.toml");
    fs::write(&explicit, "[output]\narchive_name = \"explicit.tar\"\n").unwrap();

    let result = ConfigLoader::load_from_file(&explicit);
    state.restore();

    let config = result.unwrap();
    assert_eq!(config.output.manifest_name, "mv.patch");
    assert_eq!(config.output.archive_name, "explicit.tar");
}

#[test]
fn test_environment_overlay() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let state = EnvState::capture(KEYS);
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    std::env::set_var("BUILD_MANIFEST__OUTPUT__ARCHIVE_NAME", "env.tar");
    std::env::set_var("BUILD_MANIFEST__PATTERNS__PATTERN_FILE", "/etc/rules");

    let result = ConfigLoader::load();
    state.restore();

    let config = result.unwrap();
    assert_eq!(config.output.archive_name, "env.tar");
    assert_eq!(
        config.patterns.pattern_file.as_deref(),
        Some(std::path::Path::new("/etc/rules"))
    );
}

#[test]
fn test_invalid_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let bad = temp_dir.path().join("bad.toml");
    fs::write(&bad, "[digest]\njobs = \"many\"\n").unwrap();
    assert!(ConfigLoader::load_from_file(&bad).is_err());
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}
