use std::process::Command;

fn main() {
    // Re-run when HEAD changes (new commit, branch switch, etc.)
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    // Git commit hash (short, 10 chars)
    let hash = Command::new("git")
        .args(["rev-parse", "--short=10", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    let version = env!("CARGO_PKG_VERSION");
    let long_version = if hash.is_empty() {
        version.to_string()
    } else {
        format!("{version} ({hash})")
    };
    println!("cargo:rustc-env=SLIDENAV_LONG_VERSION={long_version}");
}
