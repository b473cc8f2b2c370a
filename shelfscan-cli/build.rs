use std::env;
use std::path::Path;
use std::process::Command;

const VERSION_ENV: &str = "SHELFSCAN_BUILD_SHA";

/// `git describe` for the workspace, `None` outside a checkout or without git.
fn describe_checkout(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["describe", "--always", "--dirty", "--abbrev=10"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let tag = String::from_utf8(out.stdout).ok()?;
    let tag = tag.trim();
    (!tag.is_empty()).then(|| tag.to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed={VERSION_ENV}");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
    let workspace = Path::new(&manifest_dir).join("..");

    // Packagers building from a tarball set the version string themselves.
    let build_id = env::var(VERSION_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| describe_checkout(&workspace))
        .unwrap_or_else(|| "unknown".to_string());

    let head = workspace.join(".git").join("HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }
    println!("cargo:rustc-env={VERSION_ENV}={build_id}");
}
