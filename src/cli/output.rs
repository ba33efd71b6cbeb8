//! CLI output: build summary text and error mapping to a stable CLI surface.

use crate::error::BuildError;
use crate::manifest::PatchPlan;
use crate::tree::builder::BuildReport;
use std::fmt::Write;
use std::path::Path;

/// Everything the summary reports about one build
pub struct BuildSummary<'a> {
    pub revision: &'a str,
    pub manifest_path: &'a Path,
    /// `None` when the archive was suppressed
    pub archive_path: Option<&'a Path>,
    pub report: &'a BuildReport,
    pub comparison: Option<(&'a Path, &'a PatchPlan)>,
}

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &BuildError) -> String {
    let mut message = format!("error: {}", e);
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            let _ = write!(message, "\n  caused by: {}", cause_text);
        }
        source = cause.source();
    }
    message
}

/// Human-readable summary printed on success
pub fn format_build_summary(summary: &BuildSummary<'_>) -> String {
    let report = summary.report;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Manifest: {} (revision {})",
        summary.manifest_path.display(),
        summary.revision
    );
    match summary.archive_path {
        Some(path) => {
            let _ = writeln!(out, "Archive: {}", path.display());
        }
        None => out.push_str("Archive: skipped (--notar)\n"),
    }
    let _ = writeln!(
        out,
        "Directories: {}  Files: {}  Bytes: {}",
        report.directories, report.files, report.total_bytes
    );

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Skipped {} path(s):", report.skipped.len());
        for skipped in &report.skipped {
            let _ = writeln!(out, "  {}: {}", skipped.path, skipped.reason);
        }
    }

    if let Some((old_path, plan)) = summary.comparison {
        out.push_str(&format_patch_plan(old_path, plan));
    }

    out.trim_end().to_string()
}

/// Comparison against a previous manifest
pub fn format_patch_plan(old_path: &Path, plan: &PatchPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Compared with {}:", old_path.display());
    if plan.is_empty() {
        let _ = writeln!(out, "  up to date ({} unchanged files)", plan.unchanged_files);
        return out;
    }
    let _ = writeln!(
        out,
        "  {} added, {} changed, {} removed, {} unchanged files; {} bytes to fetch",
        plan.added_files.len(),
        plan.changed_files.len(),
        plan.removed_files.len(),
        plan.unchanged_files,
        plan.download_bytes
    );
    for name in &plan.added_files {
        let _ = writeln!(out, "  + {}", name);
    }
    for name in &plan.changed_files {
        let _ = writeln!(out, "  * {}", name);
    }
    for name in &plan.removed_files {
        let _ = writeln!(out, "  - {}", name);
    }
    for name in &plan.added_directories {
        let _ = writeln!(out, "  + {}/", name);
    }
    for name in &plan.removed_directories {
        let _ = writeln!(out, "  - {}/", name);
    }
    out
}
