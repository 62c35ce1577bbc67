//! Build script for kubectl-captain
//! Stamps the git revision and build time into the version output

use chrono::Utc;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let out = String::from_utf8(output.stdout).ok()?;
    Some(out.trim().to_string()).filter(|s| !s.is_empty())
}

fn main() {
    // Release pipelines build from a tarball and pass the hash in
    let git_hash = std::env::var("CAPTAIN_GIT_HASH")
        .ok()
        .or_else(|| git(&["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    println!("cargo:rerun-if-env-changed=CAPTAIN_GIT_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
