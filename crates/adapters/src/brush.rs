use retouch_application::StrokePainter;
use retouch_domain::{BrushState, CanvasPoint, Raster, StrokeSegment};

/// Paints each segment as a round-capped line of the brush diameter with a
/// one pixel anti-aliased edge, composited source-over.
#[derive(Debug, Default)]
pub struct RoundBrushPainter;

impl StrokePainter for RoundBrushPainter {
    fn paint_segment(&self, canvas: &mut Raster, segment: StrokeSegment, brush: &BrushState) {
        let radius = brush.size.max(1) as f32 / 2.0;
        let reach = radius + 1.0;
        let StrokeSegment { from, to } = segment;

        let left = (from.x.min(to.x) - reach).floor().max(0.0) as u32;
        let top = (from.y.min(to.y) - reach).floor().max(0.0) as u32;
        let right = ((from.x.max(to.x) + reach).ceil().max(0.0) as u32).min(canvas.width());
        let bottom = ((from.y.max(to.y) + reach).ceil().max(0.0) as u32).min(canvas.height());

        let [red, green, blue, _] = brush.color.rgba();
        for y in top..bottom {
            for x in left..right {
                let centre = CanvasPoint::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - distance_to_segment(centre, from, to)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                if let Some(under) = canvas.pixel(x, y) {
                    canvas.put_pixel(x, y, source_over([red, green, blue], coverage, under));
                }
            }
        }
    }
}

fn distance_to_segment(point: CanvasPoint, from: CanvasPoint, to: CanvasPoint) -> f32 {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        (((point.x - from.x) * dx + (point.y - from.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let nearest_x = from.x + dx * t;
    let nearest_y = from.y + dy * t;
    ((point.x - nearest_x).powi(2) + (point.y - nearest_y).powi(2)).sqrt()
}

fn source_over(color: [u8; 3], alpha: f32, under: [u8; 4]) -> [u8; 4] {
    let under_alpha = f32::from(under[3]) / 255.0;
    let out_alpha = alpha + under_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        return [0; 4];
    }

    let blend = |top: u8, bottom: u8| {
        let value = (f32::from(top) * alpha + f32::from(bottom) * under_alpha * (1.0 - alpha))
            / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    [
        blend(color[0], under[0]),
        blend(color[1], under[1]),
        blend(color[2], under[2]),
        (out_alpha * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use retouch_domain::{BrushColor, CanvasSize};

    use super::*;

    const RED: BrushColor = BrushColor::rgb(255, 0, 0);

    fn paint(canvas: &mut Raster, from: (f32, f32), to: (f32, f32), size: u32) {
        RoundBrushPainter.paint_segment(
            canvas,
            StrokeSegment {
                from: CanvasPoint::new(from.0, from.1),
                to: CanvasPoint::new(to.0, to.1),
            },
            &BrushState { size, color: RED },
        );
    }

    #[test]
    fn horizontal_segment_covers_its_core_only() {
        let mut canvas = Raster::filled(CanvasSize::new(12, 12), [0, 0, 0, 255]).expect("raster");
        paint(&mut canvas, (2.0, 6.0), (9.0, 6.0), 3);

        assert_eq!(canvas.pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(5, 6), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(5, 1), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(11, 11), Some([0, 0, 0, 255]));
    }

    #[test]
    fn end_caps_are_round() {
        let mut canvas = Raster::transparent(CanvasSize::new(20, 20)).expect("raster");
        paint(&mut canvas, (10.0, 10.0), (10.0, 10.0), 10);

        assert_eq!(canvas.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(13, 10), Some([255, 0, 0, 255]));
        // The square's corner lies outside the circle.
        assert_eq!(canvas.pixel(14, 14), Some([0, 0, 0, 0]));
    }

    #[test]
    fn edges_blend_with_what_is_underneath() {
        let mut canvas = Raster::filled(CanvasSize::new(10, 10), [0, 0, 255, 255]).expect("raster");
        paint(&mut canvas, (0.0, 5.5), (10.0, 5.5), 2);

        // Row 4 straddles the edge of a two pixel line centred on row 5.
        let [red, _, blue, alpha] = canvas.pixel(4, 4).expect("pixel");
        assert!(red > 0 && red < 255);
        assert!(blue > 0 && blue < 255);
        assert_eq!(alpha, 255);
    }

    #[test]
    fn segments_near_the_border_are_clipped() {
        let mut canvas = Raster::transparent(CanvasSize::new(4, 4)).expect("raster");
        paint(&mut canvas, (-5.0, -5.0), (1.0, 1.0), 50);
        assert!(canvas.pixels().chunks_exact(4).all(|pixel| pixel == [255, 0, 0, 255]));
    }
}
