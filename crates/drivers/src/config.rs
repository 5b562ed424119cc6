use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use retouch_domain::{BrushColor, BrushState};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "RETOUCH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "retouch.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub export_dir: PathBuf,
    pub window_width: usize,
    pub window_height: usize,
    pub canvas_padding: u32,
    pub brush_size: u32,
    pub brush_color: BrushColor,
}

impl Default for AppConfig {
    fn default() -> Self {
        let brush = BrushState::default();
        Self {
            export_dir: PathBuf::from("exports"),
            window_width: 1120,
            window_height: 700,
            canvas_padding: 48,
            brush_size: brush.size,
            brush_color: brush.color,
        }
    }
}

impl AppConfig {
    /// Reads the file named by `RETOUCH_CONFIG`, else `retouch.json` in the
    /// working directory. A missing file yields the defaults.
    pub fn load() -> Result<Self, String> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|error| format!("invalid config {}: {error}", path.display())),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(format!("failed to read config {}: {error}", path.display())),
        }
    }

    pub fn brush(&self) -> BrushState {
        let mut brush = BrushState::default();
        brush.set_size(self.brush_size);
        brush.set_color(self.brush_color);
        brush
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = AppConfig::load_from(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("retouch.json");
        fs::write(&path, r##"{"export_dir": "out", "brush_color": "#1e90ff", "brush_size": 90}"##)
            .expect("write");

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.export_dir, PathBuf::from("out"));
        assert_eq!(config.brush_color, BrushColor::rgb(0x1e, 0x90, 0xff));
        assert_eq!(config.window_width, 1120);
        assert_eq!(config.brush().size, 50);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("retouch.json");
        fs::write(&path, r#"{"brush_color": "blue"}"#).expect("write");
        assert!(AppConfig::load_from(&path).is_err());
    }
}
