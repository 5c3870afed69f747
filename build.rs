//! Build script for blest-batch
//!
//! Exports `BLEST_BUILD_TIME`, `BLEST_GIT_HASH` and `BLEST_RUST_VERSION`,
//! which make up `blest_batch::LONG_VERSION` and `blest --version`.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    let build_time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string());

    // docs.rs builds without a git checkout
    let git_hash = if std::env::var_os("DOCS_RS").is_some() {
        Some("docs-rs-build".to_string())
    } else {
        command_output("git", &["rev-parse", "--short", "HEAD"])
    };

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rust_version = command_output(&rustc, &["--version"]);

    export("BLEST_BUILD_TIME", Some(build_time));
    export("BLEST_GIT_HASH", git_hash);
    export("BLEST_RUST_VERSION", rust_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=Cargo.toml");
}

fn export(key: &str, value: Option<String>) {
    let value = value.filter(|v| !v.is_empty());
    println!(
        "cargo:rustc-env={}={}",
        key,
        value.as_deref().unwrap_or(UNKNOWN)
    );
}

/// Trimmed stdout of a successful command
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
