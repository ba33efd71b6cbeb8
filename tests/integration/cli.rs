//! End-to-end runs of the build-manifest binary

use super::test_utils::sample_tree;
use asset_manifest::manifest::Manifest;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary with an isolated config home
fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_build-manifest"))
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("BUILD_MANIFEST_LOG")
        .env_remove("BUILD_MANIFEST_LOG_OUTPUT")
        .env_remove("BUILD_MANIFEST_LOG_FORMAT")
        .env_remove("BUILD_MANIFEST__OUTPUT__ARCHIVE_NAME")
        .env_remove("BUILD_MANIFEST__PATTERNS__PATTERN_FILE")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_builds_manifest_and_archive() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);

    let output = run(
        temp_dir.path(),
        &[
            source.to_str().unwrap(),
            "http://patch.example/",
            "42",
            "--output-dir",
            out.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("revision 42"));
    assert!(stdout.contains("Files: 2"));

    let manifest = Manifest::load(&out.join("mv.patch")).unwrap();
    assert_eq!(manifest.revision, "42");
    assert_eq!(manifest.url, "http://patch.example/");
    assert!(out.join("mv.tar").is_file());
}

#[test]
fn test_notar_writes_manifest_only() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);

    let output = run(
        temp_dir.path(),
        &[source.to_str().unwrap(), "--notar", "--output-dir", out.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert!(out.join("mv.patch").is_file());
    assert!(!out.join("mv.tar").exists());

    // No version given and no oracle: timestamp revision, empty URL
    let manifest = Manifest::load(&out.join("mv.patch")).unwrap();
    assert_eq!(manifest.revision.len(), 14);
    assert!(manifest.revision.bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(manifest.url, "");
}

#[test]
fn test_missing_source_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    let missing = temp_dir.path().join("missing");

    let output = run(
        temp_dir.path(),
        &[missing.to_str().unwrap(), "--output-dir", out.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
    assert!(!out.join("mv.patch").exists());
}

#[test]
fn test_bad_pattern_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    fs::create_dir_all(&source).unwrap();

    let output = run(
        temp_dir.path(),
        &[source.to_str().unwrap(), "--ignore", "[unclosed", "--notar"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid ignore pattern"));
}

#[test]
fn test_compare_reports_changes() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);

    let base = [source.to_str().unwrap(), "", "1", "--notar", "--output-dir", out.to_str().unwrap()];
    assert!(run(temp_dir.path(), &base).status.success());
    let old = temp_dir.path().join("old.patch");
    fs::copy(out.join("mv.patch"), &old).unwrap();

    fs::write(source.join("a.txt"), "hello again").unwrap();
    fs::write(source.join("new.txt"), "new").unwrap();
    let mut args = base.to_vec();
    args.extend_from_slice(&["--compare", old.to_str().unwrap()]);
    let output = run(temp_dir.path(), &args);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 added, 1 changed, 0 removed, 1 unchanged files; 14 bytes to fetch"));
    assert!(stdout.contains("  + new.txt"));
    assert!(stdout.contains("  * a.txt"));
}

#[test]
fn test_config_file_sets_output_names() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);
    let config = temp_dir.path().join("build.toml");
    fs::write(
        &config,
        format!(
            "[output]\ndir = {:?}\nmanifest_name = \"assets.patch\"\narchive_name = \"assets.tar\"\ncompress = true\n",
            out.to_str().unwrap()
        ),
    )
    .unwrap();

    let output = run(
        temp_dir.path(),
        &[source.to_str().unwrap(), "--config", config.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(out.join("assets.patch").is_file());
    assert!(out.join("assets.tar.gz").is_file());
}

#[cfg(unix)]
#[test]
fn test_version_oracle_supplies_revision() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);
    let config = temp_dir.path().join("build.toml");
    fs::write(
        &config,
        "[version]\noracle = \"sh\"\noracle_args = [\"-c\", \"echo r977\"]\n",
    )
    .unwrap();

    let output = run(
        temp_dir.path(),
        &[
            source.to_str().unwrap(),
            "--notar",
            "--config",
            config.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(Manifest::load(&out.join("mv.patch")).unwrap().revision, "r977");
}

#[cfg(unix)]
#[test]
fn test_skipped_entries_reported_with_success_exit() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);
    std::os::unix::fs::symlink(source.join("nowhere"), source.join("dangling")).unwrap();

    let output = run(
        temp_dir.path(),
        &[source.to_str().unwrap(), "", "3", "--output-dir", out.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Files: 2"));
    assert!(stdout.contains("Skipped 1 path(s):"));
    assert!(stdout.contains("  dangling: "));

    let manifest = Manifest::load(&out.join("mv.patch")).unwrap();
    assert!(manifest.entries.iter().all(|e| e.name() != "dangling"));
    assert!(out.join("mv.tar").is_file());
}

#[cfg(unix)]
#[test]
fn test_unlistable_source_exits_nonzero() {
    use std::os::unix::fs::PermissionsExt;
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("assets");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);

    fs::set_permissions(&source, fs::Permissions::from_mode(0o311)).unwrap();
    if fs::read_dir(&source).is_ok() {
        // Running as root: permissions are not enforced
        fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let output = run(
        temp_dir.path(),
        &[source.to_str().unwrap(), "--output-dir", out.to_str().unwrap()],
    );
    fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not readable"));
    assert!(!out.join("mv.patch").exists());
    assert!(!out.join("mv.tar").exists());
}
