use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CanvasSize, DomainError};

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const EXPORT_FILE_STEM: &str = "edited-image";
pub const JPEG_QUALITY: u8 = 90;

/// Media type of a selected file, as reported by the file source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaType(String);

impl MediaType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_image(&self) -> bool {
        self.0.starts_with("image/")
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn media_type_for_path(path: &Path) -> MediaType {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return MediaType::new(OCTET_STREAM);
    };

    let value = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        _ => OCTET_STREAM,
    };
    MediaType::new(value)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    pub fn file_name(self) -> String {
        format!("{EXPORT_FILE_STEM}.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(DomainError::UnknownExportFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub file_name: String,
    pub media_type: MediaType,
    pub size: CanvasSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_detection_works() {
        assert_eq!(
            media_type_for_path(Path::new("a.JPG")).as_str(),
            "image/jpeg"
        );
        assert!(media_type_for_path(Path::new("b.webp")).is_image());
        assert!(!media_type_for_path(Path::new("notes.txt")).is_image());
        assert!(!media_type_for_path(Path::new("no-extension")).is_image());
    }

    #[test]
    fn media_type_is_normalized() {
        assert!(MediaType::new(" Image/PNG ").is_image());
    }

    #[test]
    fn export_file_names_use_the_fixed_stem() {
        assert_eq!(ExportFormat::Jpeg.file_name(), "edited-image.jpeg");
        assert_eq!(ExportFormat::Png.file_name(), "edited-image.png");
        assert_eq!("JPG".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert!("gif".parse::<ExportFormat>().is_err());
    }
}
