use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const BYTES_PER_PIXEL: usize = 4;

/// Straight-alpha RGBA8 pixel buffer, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::EmptyRaster { width, height });
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(DomainError::RasterSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A fully transparent raster, the state of a freshly cleared canvas.
    pub fn transparent(size: CanvasSize) -> Result<Self, DomainError> {
        let len = size.width as usize * size.height as usize * BYTES_PER_PIXEL;
        Self::new(size.width, size.height, vec![0; len])
    }

    pub fn filled(size: CanvasSize, rgba: [u8; 4]) -> Result<Self, DomainError> {
        let count = size.width as usize * size.height as usize;
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(count * BYTES_PER_PIXEL)
            .collect();
        Self::new(size.width, size.height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut out = [0_u8; 4];
        out.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(out)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Largest canvas with the image's aspect ratio that fits inside `container`
/// after removing `padding` on each axis.
pub fn fit_canvas(image: CanvasSize, container: CanvasSize, padding: u32) -> CanvasSize {
    let max_width = container.width.saturating_sub(padding).max(1) as f64;
    let max_height = container.height.saturating_sub(padding).max(1) as f64;
    if image.is_empty() {
        return CanvasSize::new(max_width as u32, max_height as u32);
    }

    let image_ratio = image.width as f64 / image.height as f64;
    let container_ratio = max_width / max_height;

    let (width, height) = if image_ratio > container_ratio {
        (max_width, max_width / image_ratio)
    } else {
        (max_height * image_ratio, max_height)
    };

    // Truncate like a canvas backing store, tolerating ratio round-off.
    CanvasSize::new(
        ((width + 1e-6).floor() as u32).max(1),
        ((height + 1e-6).floor() as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(
            Raster::new(0, 4, Vec::new()),
            Err(DomainError::EmptyRaster {
                width: 0,
                height: 4
            })
        ));
    }

    #[test]
    fn new_rejects_mismatched_buffer() {
        assert!(matches!(
            Raster::new(2, 2, vec![0; 15]),
            Err(DomainError::RasterSizeMismatch {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn put_and_read_pixel() {
        let mut raster = Raster::transparent(CanvasSize::new(3, 2)).expect("raster");
        raster.put_pixel(2, 1, [1, 2, 3, 4]);
        assert_eq!(raster.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(raster.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(raster.pixel(3, 0), None);
    }

    #[test]
    fn fit_canvas_keeps_wide_images_inside_width() {
        let canvas = fit_canvas(
            CanvasSize::new(1600, 800),
            CanvasSize::new(848, 648),
            48,
        );
        assert_eq!(canvas, CanvasSize::new(800, 400));
    }

    #[test]
    fn fit_canvas_keeps_tall_images_inside_height() {
        let canvas = fit_canvas(
            CanvasSize::new(500, 1000),
            CanvasSize::new(848, 648),
            48,
        );
        assert_eq!(canvas, CanvasSize::new(300, 600));
    }
}
