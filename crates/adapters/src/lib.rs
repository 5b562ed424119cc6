pub mod brush;
pub mod export;
pub mod fs;
pub mod presenters;
pub mod render;

pub use brush::RoundBrushPainter;
pub use export::{FsExportSink, ImageCrateEncoder};
pub use fs::{
    read_load_command, BackgroundImageLoader, CandidateFile, LoadRequest, LoadedFile,
    WalkdirImageScanner,
};
pub use presenters::{
    present_brush, present_decoded, present_export, present_filter_slider, present_filters,
    present_history, present_transform,
};
pub use render::CpuCanvasRenderer;

use retouch_application::{ApplicationError, ImageDecoder};
use retouch_domain::{MediaType, Raster};

#[derive(Debug, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8], media_type: &MediaType) -> Result<Raster, ApplicationError> {
        if bytes.is_empty() {
            return Err(ApplicationError::Decode(format!(
                "empty {media_type} payload"
            )));
        }

        let image = image::load_from_memory(bytes)
            .map_err(|error| ApplicationError::Decode(error.to_string()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Raster::new(width, height, image.into_raw())?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageBuffer, ImageOutputFormat, Rgba};

    use super::*;

    #[test]
    fn decodes_png_into_rgba_raster() {
        let source = ImageBuffer::from_pixel(3, 2, Rgba([10_u8, 20, 30, 128]));
        let mut bytes = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode png");

        let raster = ImageCrateDecoder
            .decode(&bytes, &MediaType::new("image/png"))
            .expect("decode");

        assert_eq!((raster.width(), raster.height()), (3, 2));
        assert_eq!(raster.pixel(2, 1), Some([10, 20, 30, 128]));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let result = ImageCrateDecoder.decode(b"not an image", &MediaType::new("image/png"));
        assert!(matches!(result, Err(ApplicationError::Decode(_))));
    }
}
