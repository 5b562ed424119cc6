use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FlipSign {
    #[default]
    Positive,
    Negative,
}

impl FlipSign {
    pub fn toggled(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Rotation and mirroring applied around the canvas centre. The rotation is
/// stored as accumulated, so four right turns read back as 360.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct TransformState {
    pub rotation_degrees: i32,
    pub flip_horizontal: FlipSign,
    pub flip_vertical: FlipSign,
}

impl TransformState {
    pub fn rotate(&mut self, direction: RotateDirection) {
        match direction {
            RotateDirection::Left => self.rotation_degrees -= 90,
            RotateDirection::Right => self.rotation_degrees += 90,
        }
    }

    pub fn flip(&mut self, axis: FlipAxis) {
        match axis {
            FlipAxis::Horizontal => self.flip_horizontal = self.flip_horizontal.toggled(),
            FlipAxis::Vertical => self.flip_vertical = self.flip_vertical.toggled(),
        }
    }

    pub fn normalized_degrees(&self) -> i32 {
        self.rotation_degrees.rem_euclid(360)
    }

    pub fn radians(&self) -> f64 {
        f64::from(self.rotation_degrees).to_radians()
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.flip_horizontal.factor(), self.flip_vertical.factor())
    }

    /// True when rendering with this transform leaves every pixel in place.
    pub fn is_identity(&self) -> bool {
        self.normalized_degrees() == 0
            && self.flip_horizontal == FlipSign::Positive
            && self.flip_vertical == FlipSign::Positive
    }
}
