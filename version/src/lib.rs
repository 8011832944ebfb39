//! Compile-time embedded build identifier for the `things` binary.
//!
//! The value is fixed by `build.rs`: `THINGS_VERSION` when the packager sets
//! it, otherwise the short git revision, otherwise the crate version.

mod resolve;

pub use crate::resolve::VersionSource;

/// Build identifier baked into the binary.
pub const THINGS_VERSION: &str = env!("THINGS_BUILD_VERSION");

const THINGS_VERSION_SOURCE: &str = env!("THINGS_BUILD_VERSION_SOURCE");

#[inline]
pub fn version() -> &'static str {
    THINGS_VERSION
}

/// Where [`THINGS_VERSION`] came from at build time.
pub fn version_source() -> VersionSource {
    VersionSource::from_build(THINGS_VERSION_SOURCE)
}

/// The single line printed by `things --version`.
pub fn version_line(bin_name: &str) -> String {
    format!("{bin_name} {}", version())
}
