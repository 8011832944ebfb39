use std::env;
use std::path::Path;
use std::process::Command;

#[allow(dead_code)]
#[path = "src/resolve.rs"]
mod resolve;

fn main() {
    // Packagers pass the identifier explicitly, e.g.
    // `THINGS_VERSION=d2c4b46 cargo build --release`. Local builds fall back
    // to the short git revision and then to the crate version.
    let from_env = env::var("THINGS_VERSION").ok();
    let (version, source) = resolve::resolve_version(
        from_env.as_deref(),
        git_short_sha,
        env!("CARGO_PKG_VERSION"),
    );

    println!("cargo:rustc-env=THINGS_BUILD_VERSION={version}");
    println!("cargo:rustc-env=THINGS_BUILD_VERSION_SOURCE={source}");
    println!("cargo:rerun-if-env-changed=THINGS_VERSION");
    println!("cargo:rerun-if-changed=src/resolve.rs");

    // Only watch HEAD when it exists; a missing path would force a rebuild
    // on every invocation.
    let head = Path::new(env!("CARGO_MANIFEST_DIR")).join("../.git/HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }
}

fn git_short_sha() -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
