//! Settings configuration: parse/write `settings.conf`.
//!
//! Holds where records come from and where exports go:
//! - `endpoint`: URL of the JSON user list
//! - `export_dir`: directory `users.csv` / `users.pdf` are written to
//! - `timeout_secs`: HTTP request timeout
//!
//! Command-line flags and environment variables override these values
//! after the file is loaded (see `crate::cli`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::remote::DEFAULT_ENDPOINT;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub export_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            export_dir: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Load settings from a file, or write the defaults there if it is missing.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let cfg = Self::default();
        if let Err(e) = cfg.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default settings");
        }
        cfg
    }

    /// Parse `key = value` lines; comments and unknown keys are skipped.
    ///
    /// Returns `None` if the file cannot be read.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut cfg = Self::default();
        for (key, val) in key_values(&contents) {
            match key {
                "endpoint" | "url" => cfg.endpoint = val.to_string(),
                "export_dir" => cfg.export_dir = PathBuf::from(val),
                "timeout_secs" | "timeout" => {
                    if let Ok(secs) = val.parse::<u64>() {
                        cfg.timeout_secs = secs;
                    }
                }
                _ => {}
            }
        }
        Some(cfg)
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# usertable settings\n");
        buf.push_str("# endpoint: URL returning a JSON array of users\n");
        buf.push_str("# export_dir: where users.csv / users.pdf are saved\n\n");
        let _ = writeln!(&mut buf, "endpoint = {}", self.endpoint);
        let _ = writeln!(&mut buf, "export_dir = {}", self.export_dir.display());
        let _ = writeln!(&mut buf, "timeout_secs = {}", self.timeout_secs);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, buf)
    }
}

/// Iterate the non-empty `key = value` pairs of a config file body,
/// skipping blank lines and `#` comments. Shared by all `.conf` files.
pub fn key_values(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    contents.lines().filter_map(|raw| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (lhs, rhs) = line.split_once('=')?;
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        if lhs.is_empty() || rhs.is_empty() {
            None
        } else {
            Some((lhs, rhs))
        }
    })
}
