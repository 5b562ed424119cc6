use retouch_domain::FilterState;

type Matrix = [[f32; 3]; 3];

/// Per-pixel colour pipeline: brightness, saturate, invert, grayscale, in
/// that order, each clamped to the unit range before the next. Alpha passes
/// through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterChain {
    brightness: Option<f32>,
    saturate: Option<Matrix>,
    invert: Option<f32>,
    grayscale: Option<Matrix>,
}

impl FilterChain {
    pub fn new(filters: &FilterState) -> Self {
        let brightness = (filters.brightness != 100).then(|| f32::from(filters.brightness) / 100.0);
        let saturate =
            (filters.saturation != 100).then(|| saturate_matrix(f32::from(filters.saturation) / 100.0));
        let invert = (filters.inversion != 0).then(|| f32::from(filters.inversion.min(100)) / 100.0);
        let grayscale =
            (filters.grayscale != 0).then(|| grayscale_matrix(f32::from(filters.grayscale.min(100)) / 100.0));

        Self {
            brightness,
            saturate,
            invert,
            grayscale,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.brightness.is_none()
            && self.saturate.is_none()
            && self.invert.is_none()
            && self.grayscale.is_none()
    }

    pub fn apply(&self, rgba: [u8; 4]) -> [u8; 4] {
        if self.is_identity() {
            return rgba;
        }

        let [red, green, blue, alpha] = rgba;
        let mut rgb = [to_unit(red), to_unit(green), to_unit(blue)];

        if let Some(amount) = self.brightness {
            rgb = rgb.map(|channel| (channel * amount).clamp(0.0, 1.0));
        }
        if let Some(matrix) = &self.saturate {
            rgb = multiply(matrix, rgb);
        }
        if let Some(amount) = self.invert {
            rgb = rgb.map(|channel| (amount + channel * (1.0 - 2.0 * amount)).clamp(0.0, 1.0));
        }
        if let Some(matrix) = &self.grayscale {
            rgb = multiply(matrix, rgb);
        }

        [to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2]), alpha]
    }
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let a = 1.0 - amount;
    [
        [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
    ]
}

fn multiply(matrix: &Matrix, rgb: [f32; 3]) -> [f32; 3] {
    matrix.map(|row| (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 1.0))
}

fn to_unit(channel: u8) -> f32 {
    f32::from(channel) / 255.0
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
