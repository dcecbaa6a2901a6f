//! Embeds the commit and build date reported by `dokku-dash --version`

use std::process::Command;

use chrono::{SecondsFormat, Utc};

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}

fn main() {
    // `<hash>-dirty` when tracked files have local edits
    let commit = match git(&["rev-parse", "--short=10", "HEAD"]).filter(|h| !h.is_empty()) {
        Some(hash) => match git(&["status", "--porcelain", "--untracked-files=no"]) {
            Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
            _ => hash,
        },
        None => "unknown".to_string(),
    };

    println!("cargo:rustc-env=DOKKU_DASH_COMMIT={}", commit);
    println!(
        "cargo:rustc-env=DOKKU_DASH_BUILT_AT={}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
}
