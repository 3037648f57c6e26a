//! Structural tests for the layering boundaries.
//!
//! These tests scan source files to verify the layer rules stated in the
//! module docs: domain stays pure, workflow services reach the outside
//! world only through the ports, and the production runner is constructed
//! only at the composition root.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

fn violations_in(dir: &Path, forbidden: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            for pat in forbidden {
                if line.contains(pat) {
                    violations.push(format!("{rel}:{}: {line}", i + 1));
                }
            }
        }
    }
    violations
}

#[test]
fn domain_imports_no_outer_layer() {
    let domain = Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join("domain");
    let violations = violations_in(
        &domain,
        &[
            "crate::application",
            "crate::infra",
            "crate::commands",
            "crate::output",
            "tokio::",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure (no outer-layer or async imports):\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_reaches_the_world_only_through_ports() {
    let application = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("application");
    let violations = violations_in(
        &application,
        &["crate::infra", "crate::commands", "crate::output"],
    );
    assert!(
        violations.is_empty(),
        "application/ must not import infra, commands, or output:\n{}",
        violations.join("\n")
    );
}

#[test]
fn production_runner_is_constructed_only_at_the_composition_root() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");

    let mut violations = Vec::new();
    for file in collect_rs_files(&src) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .to_string_lossy()
            .replace('\\', "/");
        if rel.contains("/infra/") || rel.contains("/commands/") {
            continue;
        }
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if line.contains("TokioCommandRunner") {
                violations.push(format!("{rel}:{}: {line}", i + 1));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "TokioCommandRunner must only appear in infra/ and the command handlers:\n{}",
        violations.join("\n")
    );
}
