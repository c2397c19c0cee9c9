use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Origin of the detection service; `png_url`s are resolved against it.
    pub api_base_url: String,
    pub max_file_size_bytes: u64,
    /// Extensions accepted for upload, lower-case with the leading dot.
    pub supported_extensions: Vec<String>,
    /// Extensions that get an inline thumbnail preview.
    pub preview_extensions: Vec<String>,
    pub preview_max_edge: u32,
    pub duplicate_notice_ms: u64,
    pub banner_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            max_file_size_bytes: 50 * MIB,
            supported_extensions: vec![".dcm".into(), ".rvg".into()],
            preview_extensions: vec![".png".into(), ".jpg".into(), ".jpeg".into()],
            preview_max_edge: 256,
            duplicate_notice_ms: 1000,
            banner_ms: 6000,
            request_timeout_secs: 120,
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Missing keys take their defaults; a file
    /// that does not parse is reported and replaced by the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                log::warn!(
                    "Ignoring unparsable settings in {}: {err}; using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_bytes / MIB
    }

    pub fn is_supported(&self, extension: &str) -> bool {
        contains_ignore_case(&self.supported_extensions, extension)
    }

    pub fn is_previewable(&self, extension: &str) -> bool {
        contains_ignore_case(&self.preview_extensions, extension)
    }

    /// Accepted extensions as shown to the user, e.g. `.dcm, .rvg`.
    pub fn supported_list(&self) -> String {
        self.supported_extensions.join(", ")
    }

    pub fn duplicate_notice_ttl(&self) -> Duration {
        Duration::from_millis(self.duplicate_notice_ms)
    }

    pub fn banner_ttl(&self) -> Duration {
        Duration::from_millis(self.banner_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn contains_ignore_case(list: &[String], extension: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(extension))
}
