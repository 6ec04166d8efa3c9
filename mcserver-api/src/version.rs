// Version information module

use std::fs;

/// Version from a VERSION file next to the binary or in the working
/// directory, falling back to the crate version.
pub fn get_backend_version() -> String {
    for path in ["VERSION", "../VERSION"] {
        if let Ok(contents) = fs::read_to_string(path) {
            let v = contents.trim();
            if !v.is_empty() {
                return v.to_string();
            }
        }
    }
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Debug, serde::Serialize)]
pub struct VersionInfo {
    pub backend_version: String,
    pub package: &'static str,
}

pub fn get_version_info() -> VersionInfo {
    VersionInfo {
        backend_version: get_backend_version(),
        package: env!("CARGO_PKG_NAME"),
    }
}
