//! Build script for matmap-api
//!
//! Exposes build identification to the binary and `/health`:
//! `GIT_HASH` (short commit, `-dirty` when the tree has local changes),
//! `BUILD_TIMESTAMP` (UTC, RFC 3339) and `BUILD_PROFILE`.

use std::process::Command;

/// Trimmed stdout of a successful git invocation
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn git_hash() -> String {
    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };

    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

fn main() {
    let built = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    for (name, value) in [
        ("GIT_HASH", git_hash()),
        ("BUILD_TIMESTAMP", built),
        ("BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={}={}", name, value);
    }
}
