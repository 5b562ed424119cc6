mod filters;

pub use filters::FilterChain;

use rayon::prelude::*;
use retouch_application::{ApplicationError, CanvasRenderer};
use retouch_domain::{CanvasSize, FilterState, Raster, TransformState, BYTES_PER_PIXEL};

/// Software renderer: the source is stretched to the canvas, rotated and
/// mirrored about the canvas centre, then run through the filter chain.
/// Canvas pixels the transformed image does not cover stay transparent.
#[derive(Debug, Default)]
pub struct CpuCanvasRenderer;

impl CanvasRenderer for CpuCanvasRenderer {
    fn render(
        &self,
        source: &Raster,
        filters: &FilterState,
        transform: &TransformState,
        canvas: CanvasSize,
    ) -> Result<Raster, ApplicationError> {
        if canvas.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "canvas dimensions must be non-zero".to_string(),
            ));
        }

        let chain = FilterChain::new(filters);
        if chain.is_identity() && transform.is_identity() && source.size() == canvas {
            return Ok(source.clone());
        }

        let mut out = Raster::transparent(canvas)?;
        let mapping = InverseMapping::new(transform, canvas);
        let stretch_x = f64::from(source.width()) / f64::from(canvas.width);
        let stretch_y = f64::from(source.height()) / f64::from(canvas.height);

        let row_bytes = canvas.width as usize * BYTES_PER_PIXEL;

        out.pixels_mut()
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f64 + 0.5;
                for (x, pixel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                    let Some((u, v)) = mapping.to_image(x as f64 + 0.5, py) else {
                        continue;
                    };
                    let sample = sample_bilinear(source, u * stretch_x - 0.5, v * stretch_y - 0.5);
                    pixel.copy_from_slice(&chain.apply(sample));
                }
            });
        Ok(out)
    }
}

/// Maps a canvas point back into the unrotated, unmirrored image rectangle.
struct InverseMapping {
    centre: (f64, f64),
    sin: f64,
    cos: f64,
    scale: (f64, f64),
    extent: (f64, f64),
}

impl InverseMapping {
    fn new(transform: &TransformState, canvas: CanvasSize) -> Self {
        let (sin, cos) = match transform.normalized_degrees() {
            0 => (0.0, 1.0),
            90 => (1.0, 0.0),
            180 => (0.0, -1.0),
            270 => (-1.0, 0.0),
            _ => transform.radians().sin_cos(),
        };
        let width = f64::from(canvas.width);
        let height = f64::from(canvas.height);
        Self {
            centre: (width / 2.0, height / 2.0),
            sin,
            cos,
            scale: transform.scale(),
            extent: (width, height),
        }
    }

    fn to_image(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dx = x - self.centre.0;
        let dy = y - self.centre.1;
        let rotated_x = dx * self.cos + dy * self.sin;
        let rotated_y = dy * self.cos - dx * self.sin;
        // Mirroring is its own inverse.
        let u = rotated_x * self.scale.0 + self.extent.0 / 2.0;
        let v = rotated_y * self.scale.1 + self.extent.1 / 2.0;

        let inside = (0.0..self.extent.0).contains(&u) && (0.0..self.extent.1).contains(&v);
        inside.then_some((u, v))
    }
}

fn sample_bilinear(source: &Raster, x: f64, y: f64) -> [u8; 4] {
    let max_x = f64::from(source.width() - 1);
    let max_y = f64::from(source.height() - 1);
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;
    let x1 = (x0 + 1.0).min(max_x);
    let y1 = (y0 + 1.0).min(max_y);

    let texel = |px: f64, py: f64| source.pixel(px as u32, py as u32).unwrap_or([0; 4]);
    let top_left = texel(x0, y0);
    let top_right = texel(x1, y0);
    let bottom_left = texel(x0, y1);
    let bottom_right = texel(x1, y1);

    let mut out = [0_u8; 4];
    for channel in 0..4 {
        let top = lerp(top_left[channel], top_right[channel], tx);
        let bottom = lerp(bottom_left[channel], bottom_right[channel], tx);
        out[channel] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn lerp(from: u8, to: u8, t: f64) -> f64 {
    let from = f64::from(from);
    from + (f64::from(to) - from) * t
}

#[cfg(test)]
mod tests {
    use retouch_domain::{FlipAxis, RotateDirection};

    use super::*;

    const A: [u8; 4] = [255, 0, 0, 255];
    const B: [u8; 4] = [0, 255, 0, 255];
    const C: [u8; 4] = [0, 0, 255, 255];
    const D: [u8; 4] = [255, 255, 255, 255];

    fn raster(width: u32, height: u32, pixels: &[[u8; 4]]) -> Raster {
        Raster::new(width, height, pixels.concat()).expect("raster")
    }

    fn quad() -> Raster {
        raster(2, 2, &[A, B, C, D])
    }

    fn render(source: &Raster, filters: FilterState, transform: TransformState) -> Raster {
        CpuCanvasRenderer
            .render(source, &filters, &transform, source.size())
            .expect("render")
    }

    fn rotated(turns: i32) -> TransformState {
        let mut transform = TransformState::default();
        for _ in 0..turns.unsigned_abs() {
            transform.rotate(if turns > 0 {
                RotateDirection::Right
            } else {
                RotateDirection::Left
            });
        }
        transform
    }

    #[test]
    fn neutral_render_at_native_size_is_exact() {
        let source = quad();
        let out = render(&source, FilterState::default(), TransformState::default());
        assert_eq!(out, source);
    }

    #[test]
    fn rotate_right_turns_clockwise() {
        let out = render(&quad(), FilterState::default(), rotated(1));
        assert_eq!(out, raster(2, 2, &[C, A, D, B]));
    }

    #[test]
    fn rotate_left_turns_counter_clockwise() {
        let out = render(&quad(), FilterState::default(), rotated(-1));
        assert_eq!(out, raster(2, 2, &[B, D, A, C]));
    }

    #[test]
    fn four_turns_match_no_rotation() {
        let source = quad();
        let out = render(&source, FilterState::default(), rotated(4));
        assert_eq!(out, source);
    }

    #[test]
    fn flips_mirror_about_the_centre() {
        let mut transform = TransformState::default();
        transform.flip(FlipAxis::Horizontal);
        let out = render(&quad(), FilterState::default(), transform);
        assert_eq!(out, raster(2, 2, &[B, A, D, C]));

        let mut transform = TransformState::default();
        transform.flip(FlipAxis::Vertical);
        let out = render(&quad(), FilterState::default(), transform);
        assert_eq!(out, raster(2, 2, &[C, D, A, B]));
    }

    #[test]
    fn quarter_turn_on_wide_canvas_leaves_corners_transparent() {
        let source = Raster::filled(CanvasSize::new(4, 2), A).expect("raster");
        let out = render(&source, FilterState::default(), rotated(1));
        assert_eq!(out.pixel(0, 0).map(|pixel| pixel[3]), Some(0));
        assert_eq!(out.pixel(3, 1).map(|pixel| pixel[3]), Some(0));
        assert_eq!(out.pixel(1, 0), Some(A));
        assert_eq!(out.pixel(2, 1), Some(A));
    }

    #[test]
    fn source_is_stretched_to_canvas() {
        let source = Raster::filled(CanvasSize::new(3, 5), B).expect("raster");
        let out = CpuCanvasRenderer
            .render(
                &source,
                &FilterState::default(),
                &TransformState::default(),
                CanvasSize::new(7, 2),
            )
            .expect("render");
        assert_eq!(out.size(), CanvasSize::new(7, 2));
        assert!(out.pixels().chunks_exact(4).all(|pixel| pixel == B));
    }

    #[test]
    fn filters_apply_after_transform() {
        let filters = FilterState {
            inversion: 100,
            ..FilterState::default()
        };
        let out = render(&quad(), filters, rotated(2));
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(out.pixel(1, 1), Some([0, 255, 255, 255]));
    }

    #[test]
    fn render_leaves_source_untouched_and_is_repeatable() {
        let source = quad();
        let filters = FilterState {
            brightness: 150,
            grayscale: 40,
            ..FilterState::default()
        };
        let first = render(&source, filters, rotated(3));
        let second = render(&source, filters, rotated(3));
        assert_eq!(first, second);
        assert_eq!(source, quad());
    }

    #[test]
    fn empty_canvas_is_rejected() {
        let result = CpuCanvasRenderer.render(
            &quad(),
            &FilterState::default(),
            &TransformState::default(),
            CanvasSize::new(0, 3),
        );
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }
}
