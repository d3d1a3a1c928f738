use std::io;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Bundles produced by a build, as URLs relative to the site root.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct AssetManifest {
    pub build_id: String,
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
}

impl AssetManifest {
    pub fn read(public_dir: &Path) -> io::Result<AssetManifest> {
        let raw = std::fs::read_to_string(public_dir.join(MANIFEST_FILE))?;
        serde_json::from_str(&raw)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error parsing {}: {}", MANIFEST_FILE, e)))
    }

    pub fn to_json(&self) -> io::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))
    }
}
