//! Stamps `EXPENSE_PERIOD_BUILD_*` variables read by `expense_period_cli version`.

use std::env;
use std::process::Command;

use chrono::SecondsFormat;

/// Revision override for builds from a source tarball, where `.git` is absent.
const REVISION_OVERRIDE: &str = "EXPENSE_PERIOD_GIT_REV";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");
    println!("cargo:rerun-if-env-changed={REVISION_OVERRIDE}");

    let hash = env::var(REVISION_OVERRIDE)
        .ok()
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
        .or_else(|| git(&["rev-parse", "--short", "HEAD"]).filter(|rev| !rev.is_empty()))
        .unwrap_or_else(|| "unknown".to_string());

    // Untracked files such as local catalogs or expense dumps do not make a build dirty.
    let status = match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => "dirty",
        Some(_) => "clean",
        None if env::var(REVISION_OVERRIDE).is_ok() => "release",
        None => "unknown",
    };

    emit("HASH", &hash);
    emit("STATUS", status);
    emit(
        "TIMESTAMP",
        &chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    emit("TARGET", &cargo_var("TARGET"));
    emit("PROFILE", &cargo_var("PROFILE"));
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env=EXPENSE_PERIOD_BUILD_{key}={value}");
}

fn cargo_var(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| format!("unknown-{}", key.to_lowercase()))
}

/// Trimmed stdout of a successful git invocation.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|out| out.trim().to_string())
}
