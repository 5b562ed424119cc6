use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 50;

/// Swatches offered next to the colour picker.
pub const BRUSH_PALETTE: [BrushColor; 6] = [
    BrushColor::rgb(0x33, 0x33, 0x33),
    BrushColor::rgb(0xFF, 0xFF, 0xFF),
    BrushColor::rgb(0xFF, 0x47, 0x57),
    BrushColor::rgb(0x2E, 0xD5, 0x73),
    BrushColor::rgb(0x1E, 0x90, 0xFF),
    BrushColor::rgb(0xFF, 0xA5, 0x02),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct BrushColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl BrushColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, 255]
    }

    pub fn to_u32(self) -> u32 {
        (u32::from(self.red) << 16) | (u32::from(self.green) << 8) | u32::from(self.blue)
    }
}

impl Default for BrushColor {
    fn default() -> Self {
        BRUSH_PALETTE[0]
    }
}

impl Display for BrushColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for BrushColor {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidBrushColor(value.to_string());
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for BrushColor {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BrushColor> for String {
    fn from(value: BrushColor) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrushState {
    pub size: u32,
    pub color: BrushColor,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            size: 5,
            color: BrushColor::default(),
        }
    }
}

impl BrushState {
    pub fn set_size(&mut self, size: u32) -> u32 {
        self.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        self.size
    }

    pub fn set_color(&mut self, color: BrushColor) {
        self.color = color;
    }
}
