use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageOutputFormat, RgbImage, RgbaImage};
use retouch_application::{ApplicationError, ExportSink, ImageEncoder};
use retouch_domain::{ExportFormat, Raster, JPEG_QUALITY};
use tracing::debug;

#[derive(Debug, Default)]
pub struct ImageCrateEncoder;

impl ImageEncoder for ImageCrateEncoder {
    fn encode(&self, raster: &Raster, format: ExportFormat) -> Result<Vec<u8>, ApplicationError> {
        let image = match format {
            ExportFormat::Png => DynamicImage::ImageRgba8(rgba_image(raster)?),
            // JPEG has no alpha channel; transparent areas come out black.
            ExportFormat::Jpeg => DynamicImage::ImageRgb8(composite_over_black(raster)?),
        };
        let output = match format {
            ExportFormat::Png => ImageOutputFormat::Png,
            ExportFormat::Jpeg => ImageOutputFormat::Jpeg(JPEG_QUALITY),
        };

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), output)
            .map_err(|error| ApplicationError::Encode(error.to_string()))?;
        Ok(bytes)
    }
}

fn rgba_image(raster: &Raster) -> Result<RgbaImage, ApplicationError> {
    RgbaImage::from_raw(raster.width(), raster.height(), raster.pixels().to_vec())
        .ok_or_else(|| ApplicationError::Encode("raster buffer does not match its size".to_string()))
}

fn composite_over_black(raster: &Raster) -> Result<RgbImage, ApplicationError> {
    let rgb = raster
        .pixels()
        .chunks_exact(4)
        .flat_map(|pixel| {
            let alpha = u32::from(pixel[3]);
            let over_black = |channel: u8| ((u32::from(channel) * alpha + 127) / 255) as u8;
            [over_black(pixel[0]), over_black(pixel[1]), over_black(pixel[2])]
        })
        .collect();
    RgbImage::from_raw(raster.width(), raster.height(), rgb)
        .ok_or_else(|| ApplicationError::Encode("raster buffer does not match its size".to_string()))
}

/// Writes exports into one directory, replacing any earlier file of the
/// same name.
#[derive(Debug, Clone)]
pub struct FsExportSink {
    directory: PathBuf,
}

impl FsExportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ExportSink for FsExportSink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ApplicationError> {
        fs::create_dir_all(&self.directory)
            .map_err(|error| ApplicationError::Io(error.to_string()))?;
        let path = self.directory.join(file_name);
        fs::write(&path, bytes).map_err(|error| ApplicationError::Io(error.to_string()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "export written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use retouch_domain::CanvasSize;
    use tempfile::TempDir;

    use super::*;

    fn half_transparent_red() -> Raster {
        Raster::filled(CanvasSize::new(4, 3), [255, 0, 0, 128]).expect("raster")
    }

    #[test]
    fn png_keeps_alpha() {
        let bytes = ImageCrateEncoder
            .encode(&half_transparent_red(), ExportFormat::Png)
            .expect("encode");
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(1, 1).0, [255, 0, 0, 128]);
    }

    #[test]
    fn jpeg_flattens_onto_black() {
        let bytes = ImageCrateEncoder
            .encode(&half_transparent_red(), ExportFormat::Jpeg)
            .expect("encode");
        assert!(bytes.starts_with(&[0xFF, 0xD8]));

        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgb8();
        let [red, green, blue] = decoded.get_pixel(2, 1).0;
        assert!((118..=138).contains(&red), "red was {red}");
        assert!(green < 12 && blue < 12);
    }

    #[test]
    fn sink_writes_into_its_directory_and_overwrites() {
        let dir = TempDir::new().expect("tempdir");
        let sink = FsExportSink::new(dir.path().join("out"));

        let first = sink.deliver("edited-image.png", b"one").expect("deliver");
        let second = sink.deliver("edited-image.png", b"two").expect("deliver");

        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("out").join("edited-image.png"));
        assert_eq!(fs::read(&first).expect("read"), b"two");
    }
}
