use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// The four adjustable filters, declared in the order the render pipeline
/// applies them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Brightness,
    Saturation,
    Inversion,
    Grayscale,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Brightness,
        FilterKind::Saturation,
        FilterKind::Inversion,
        FilterKind::Grayscale,
    ];

    pub fn descriptor(self) -> FilterDescriptor {
        match self {
            Self::Brightness => FilterDescriptor {
                kind: self,
                label: "Brightness",
                min: 0,
                max: 200,
                default: 100,
                unit: "%",
            },
            Self::Saturation => FilterDescriptor {
                kind: self,
                label: "Saturation",
                min: 0,
                max: 200,
                default: 100,
                unit: "%",
            },
            Self::Inversion => FilterDescriptor {
                kind: self,
                label: "Inversion",
                min: 0,
                max: 100,
                default: 0,
                unit: "%",
            },
            Self::Grayscale => FilterDescriptor {
                kind: self,
                label: "Grayscale",
                min: 0,
                max: 100,
                default: 0,
                unit: "%",
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Saturation => "saturation",
            Self::Inversion => "inversion",
            Self::Grayscale => "grayscale",
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| DomainError::UnknownFilter(value.to_string()))
    }
}

/// Bounds and presentation of one filter, used to bind the shared slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub kind: FilterKind,
    pub label: &'static str,
    pub min: u16,
    pub max: u16,
    pub default: u16,
    pub unit: &'static str,
}

impl FilterDescriptor {
    pub fn clamp(&self, value: i32) -> u16 {
        value.clamp(i32::from(self.min), i32::from(self.max)) as u16
    }

    pub fn get(&self, state: &FilterState) -> u16 {
        state.get(self.kind)
    }
}

/// Filter percentages. Brightness and saturation are multipliers (100 is
/// neutral); inversion and grayscale are amounts (0 is neutral).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub brightness: u16,
    pub saturation: u16,
    pub inversion: u16,
    pub grayscale: u16,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            brightness: 100,
            saturation: 100,
            inversion: 0,
            grayscale: 0,
        }
    }
}

impl FilterState {
    pub fn get(&self, kind: FilterKind) -> u16 {
        match kind {
            FilterKind::Brightness => self.brightness,
            FilterKind::Saturation => self.saturation,
            FilterKind::Inversion => self.inversion,
            FilterKind::Grayscale => self.grayscale,
        }
    }

    /// Stores `value` clamped to the filter's range and returns what was stored.
    pub fn set(&mut self, kind: FilterKind, value: i32) -> u16 {
        let clamped = kind.descriptor().clamp(value);
        let slot = match kind {
            FilterKind::Brightness => &mut self.brightness,
            FilterKind::Saturation => &mut self.saturation,
            FilterKind::Inversion => &mut self.inversion,
            FilterKind::Grayscale => &mut self.grayscale,
        };
        *slot = clamped;
        clamped
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

/// Which filter the shared slider currently edits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FilterControl {
    selected: FilterKind,
}

impl FilterControl {
    pub fn selected(&self) -> FilterKind {
        self.selected
    }

    pub fn select(&mut self, kind: FilterKind) -> FilterDescriptor {
        self.selected = kind;
        kind.descriptor()
    }

    pub fn descriptor(&self) -> FilterDescriptor {
        self.selected.descriptor()
    }

    pub fn slider(&self, state: &FilterState) -> FilterSlider {
        let descriptor = self.descriptor();
        FilterSlider {
            value: descriptor.get(state),
            descriptor,
        }
    }
}

/// What the shared slider shows: bounds, label and the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSlider {
    pub descriptor: FilterDescriptor,
    pub value: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_neutral() {
        let state = FilterState::default();
        assert_eq!(state.brightness, 100);
        assert_eq!(state.saturation, 100);
        assert_eq!(state.inversion, 0);
        assert_eq!(state.grayscale, 0);
        assert!(state.is_neutral());
    }

    #[test]
    fn set_clamps_to_each_range() {
        let mut state = FilterState::default();
        assert_eq!(state.set(FilterKind::Brightness, 250), 200);
        assert_eq!(state.set(FilterKind::Saturation, -3), 0);
        assert_eq!(state.set(FilterKind::Inversion, 140), 100);
        assert_eq!(state.set(FilterKind::Grayscale, 55), 55);
        assert_eq!(
            state,
            FilterState {
                brightness: 200,
                saturation: 0,
                inversion: 100,
                grayscale: 55,
            }
        );
    }

    #[test]
    fn selecting_rebinds_slider_bounds() {
        let mut control = FilterControl::default();
        assert_eq!(control.selected(), FilterKind::Brightness);

        let descriptor = control.select(FilterKind::Inversion);
        assert_eq!((descriptor.min, descriptor.max), (0, 100));
        assert_eq!(descriptor.label, "Inversion");

        let state = FilterState {
            inversion: 40,
            ..FilterState::default()
        };
        assert_eq!(control.slider(&state).value, 40);
    }

    #[test]
    fn parses_filter_names() {
        assert_eq!("Grayscale".parse::<FilterKind>(), Ok(FilterKind::Grayscale));
        assert!(matches!(
            "sepia".parse::<FilterKind>(),
            Err(DomainError::UnknownFilter(_))
        ));
    }

    #[test]
    fn serializes_with_lowercase_kind_names() {
        let json = serde_json::to_string(&FilterKind::Saturation).expect("json");
        assert_eq!(json, "\"saturation\"");
    }
}
