use serde::{Deserialize, Serialize};

use crate::CanvasSize;

/// A position in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where the canvas is shown on screen, in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// One input sample. Touch samples carry every active touch point; the first
/// one drives the brush.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerSample {
    Mouse { x: f32, y: f32 },
    Touch { points: Vec<(f32, f32)> },
}

impl PointerSample {
    pub fn client_position(&self) -> Option<(f32, f32)> {
        match self {
            Self::Mouse { x, y } => Some((*x, *y)),
            Self::Touch { points } => points.first().copied(),
        }
    }

    /// Maps the sample into canvas pixels using the ratio between the canvas
    /// backing size and its displayed size.
    pub fn to_canvas(&self, display: DisplayRect, canvas: CanvasSize) -> Option<CanvasPoint> {
        if display.width <= 0.0 || display.height <= 0.0 {
            return None;
        }
        let (client_x, client_y) = self.client_position()?;
        let scale_x = canvas.width as f32 / display.width;
        let scale_y = canvas.height as f32 / display.height;
        Some(CanvasPoint::new(
            (client_x - display.left) * scale_x,
            (client_y - display.top) * scale_y,
        ))
    }
}

/// A line segment to paint, from the previous pointer position to the current one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub from: CanvasPoint,
    pub to: CanvasPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokePhase {
    #[default]
    Idle,
    Stroking {
        last: CanvasPoint,
        painted: bool,
    },
}

/// What ending a stroke produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeEnd {
    /// Pointer released while idle.
    NotStroking,
    /// Stroke ended without any segment being painted.
    Empty,
    /// Stroke ended after painting at least one segment.
    Painted,
}

/// Idle/Stroking state machine driven by pointer down, move, up and leave.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokeTracker {
    phase: StrokePhase,
}

impl StrokeTracker {
    pub fn is_stroking(&self) -> bool {
        matches!(self.phase, StrokePhase::Stroking { .. })
    }

    pub fn pointer_down(&mut self, at: CanvasPoint) {
        self.phase = StrokePhase::Stroking {
            last: at,
            painted: false,
        };
    }

    pub fn pointer_move(&mut self, to: CanvasPoint) -> Option<StrokeSegment> {
        let StrokePhase::Stroking { last, .. } = self.phase else {
            return None;
        };
        self.phase = StrokePhase::Stroking {
            last: to,
            painted: true,
        };
        Some(StrokeSegment { from: last, to })
    }

    /// Pointer released or left the surface.
    pub fn pointer_up(&mut self) -> StrokeEnd {
        let ended = match self.phase {
            StrokePhase::Idle => StrokeEnd::NotStroking,
            StrokePhase::Stroking { painted: false, .. } => StrokeEnd::Empty,
            StrokePhase::Stroking { painted: true, .. } => StrokeEnd::Painted,
        };
        self.phase = StrokePhase::Idle;
        ended
    }

    pub fn cancel(&mut self) {
        self.phase = StrokePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY: DisplayRect = DisplayRect {
        left: 100.0,
        top: 50.0,
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn maps_display_to_backing_resolution() {
        let sample = PointerSample::Mouse { x: 150.0, y: 75.0 };
        let point = sample
            .to_canvas(DISPLAY, CanvasSize::new(800, 400))
            .expect("point");
        assert_eq!(point, CanvasPoint::new(200.0, 100.0));
    }

    #[test]
    fn touch_uses_first_point_like_mouse() {
        let mouse = PointerSample::Mouse { x: 120.0, y: 60.0 };
        let touch = PointerSample::Touch {
            points: vec![(120.0, 60.0), (10.0, 10.0)],
        };
        let canvas = CanvasSize::new(400, 200);
        assert_eq!(
            mouse.to_canvas(DISPLAY, canvas),
            touch.to_canvas(DISPLAY, canvas)
        );
        assert_eq!(
            PointerSample::Touch { points: vec![] }.to_canvas(DISPLAY, canvas),
            None
        );
    }

    #[test]
    fn moves_while_idle_paint_nothing() {
        let mut tracker = StrokeTracker::default();
        assert_eq!(tracker.pointer_move(CanvasPoint::new(1.0, 1.0)), None);
        assert_eq!(tracker.pointer_up(), StrokeEnd::NotStroking);
    }

    #[test]
    fn segments_chain_from_last_point() {
        let mut tracker = StrokeTracker::default();
        tracker.pointer_down(CanvasPoint::new(0.0, 0.0));
        let first = tracker
            .pointer_move(CanvasPoint::new(5.0, 0.0))
            .expect("segment");
        let second = tracker
            .pointer_move(CanvasPoint::new(5.0, 5.0))
            .expect("segment");
        assert_eq!(first.from, CanvasPoint::new(0.0, 0.0));
        assert_eq!(second.from, CanvasPoint::new(5.0, 0.0));
        assert_eq!(tracker.pointer_up(), StrokeEnd::Painted);
        assert!(!tracker.is_stroking());
    }

    #[test]
    fn click_without_move_is_an_empty_stroke() {
        let mut tracker = StrokeTracker::default();
        tracker.pointer_down(CanvasPoint::new(3.0, 3.0));
        assert_eq!(tracker.pointer_up(), StrokeEnd::Empty);
    }
}
