//! Named one-click filter presets.
//!
//! A preset is a partial override: fields it names are written into the
//! current [`FilterSettings`], everything else is left as the user set it.
//!
//! ```
//! use photobooth_compositor::{FilterPreset, FilterSettings, PresetSelector};
//!
//! let mut settings = FilterSettings::default();
//! let mut selector = PresetSelector::default();
//!
//! selector.select(FilterPreset::Vintage, &mut settings);
//! assert!(settings.vintage);
//!
//! // Picking the active preset again clears it.
//! selector.select(FilterPreset::Vintage, &mut settings);
//! assert_eq!(settings, FilterSettings::default());
//! assert_eq!(selector.active(), None);
//! ```

use serde::{Deserialize, Serialize};

use super::FilterSettings;

/// Fields a preset may set. `None` leaves the current value alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterOverrides {
    pub mirror: Option<bool>,
    pub black_and_white: Option<bool>,
    pub vintage: Option<bool>,
    pub vhs: Option<bool>,
    pub fisheye: Option<bool>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub blur: Option<f32>,
    pub pixelate: Option<f32>,
    pub beauty: Option<f32>,
    pub saturation: Option<f32>,
}

impl FilterOverrides {
    pub fn apply_to(&self, settings: &mut FilterSettings) {
        fn set<T: Copy>(field: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *field = value;
            }
        }

        set(&mut settings.mirror, self.mirror);
        set(&mut settings.black_and_white, self.black_and_white);
        set(&mut settings.vintage, self.vintage);
        set(&mut settings.vhs, self.vhs);
        set(&mut settings.fisheye, self.fisheye);
        set(&mut settings.brightness, self.brightness);
        set(&mut settings.contrast, self.contrast);
        set(&mut settings.blur, self.blur);
        set(&mut settings.pixelate, self.pixelate);
        set(&mut settings.beauty, self.beauty);
        set(&mut settings.saturation, self.saturation);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPreset {
    Normal,
    BlackAndWhite,
    Vintage,
    Vhs,
    Mirror,
    Pixel,
    Fisheye,
    Beauty,
    Warm,
    Cool,
    Dramatic,
    Soft,
}

impl FilterPreset {
    /// Presets in palette order.
    pub const ALL: [FilterPreset; 12] = [
        Self::Normal,
        Self::BlackAndWhite,
        Self::Vintage,
        Self::Vhs,
        Self::Mirror,
        Self::Pixel,
        Self::Fisheye,
        Self::Beauty,
        Self::Warm,
        Self::Cool,
        Self::Dramatic,
        Self::Soft,
    ];

    /// Label shown on the preset button.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::BlackAndWhite => "B&W",
            Self::Vintage => "Vintage",
            Self::Vhs => "VHS",
            Self::Mirror => "Mirror",
            Self::Pixel => "Pixel",
            Self::Fisheye => "Fisheye",
            Self::Beauty => "Beauty",
            Self::Warm => "Warm",
            Self::Cool => "Cool",
            Self::Dramatic => "Dramatic",
            Self::Soft => "Soft",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    pub fn overrides(self) -> FilterOverrides {
        let none = FilterOverrides::default();
        match self {
            Self::Normal => FilterOverrides {
                black_and_white: Some(false),
                vintage: Some(false),
                vhs: Some(false),
                mirror: Some(false),
                brightness: Some(100.0),
                contrast: Some(100.0),
                saturation: Some(100.0),
                blur: Some(0.0),
                ..none
            },
            Self::BlackAndWhite => FilterOverrides {
                black_and_white: Some(true),
                vintage: Some(false),
                vhs: Some(false),
                brightness: Some(100.0),
                contrast: Some(110.0),
                ..none
            },
            Self::Vintage => FilterOverrides {
                vintage: Some(true),
                brightness: Some(115.0),
                contrast: Some(85.0),
                saturation: Some(80.0),
                ..none
            },
            Self::Vhs => FilterOverrides {
                vhs: Some(true),
                brightness: Some(105.0),
                contrast: Some(95.0),
                saturation: Some(120.0),
                ..none
            },
            Self::Mirror => FilterOverrides {
                mirror: Some(true),
                ..none
            },
            Self::Pixel => FilterOverrides {
                pixelate: Some(8.0),
                ..none
            },
            Self::Fisheye => FilterOverrides {
                fisheye: Some(true),
                ..none
            },
            Self::Beauty => FilterOverrides {
                beauty: Some(60.0),
                brightness: Some(108.0),
                contrast: Some(95.0),
                blur: Some(1.0),
                ..none
            },
            Self::Warm => FilterOverrides {
                vintage: Some(true),
                brightness: Some(110.0),
                contrast: Some(100.0),
                saturation: Some(110.0),
                ..none
            },
            Self::Cool => FilterOverrides {
                brightness: Some(105.0),
                contrast: Some(105.0),
                saturation: Some(90.0),
                ..none
            },
            Self::Dramatic => FilterOverrides {
                contrast: Some(130.0),
                brightness: Some(90.0),
                ..none
            },
            Self::Soft => FilterOverrides {
                blur: Some(2.0),
                brightness: Some(105.0),
                contrast: Some(90.0),
                ..none
            },
        }
    }
}

// ============================================================================
// PresetSelector
// ============================================================================

/// Tracks the highlighted preset and applies the toggle rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresetSelector {
    active: Option<FilterPreset>,
}

impl PresetSelector {
    pub fn active(&self) -> Option<FilterPreset> {
        self.active
    }

    /// Applies `preset` to `settings`, or resets `settings` to defaults if
    /// `preset` is already active.
    pub fn select(&mut self, preset: FilterPreset, settings: &mut FilterSettings) {
        if self.active == Some(preset) {
            self.active = None;
            *settings = FilterSettings::default();
        } else {
            self.active = Some(preset);
            preset.overrides().apply_to(settings);
        }
    }

    /// Forgets the highlighted preset without touching settings, e.g. after a
    /// manual slider change.
    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_merge_onto_current_settings() {
        let mut settings = FilterSettings {
            mirror: true,
            ..FilterSettings::default()
        };
        let mut selector = PresetSelector::default();
        selector.select(FilterPreset::Dramatic, &mut settings);

        assert!(settings.mirror, "unrelated fields are kept");
        assert_eq!(settings.contrast, 130.0);
        assert_eq!(settings.brightness, 90.0);
        assert_eq!(selector.active(), Some(FilterPreset::Dramatic));
    }

    #[test]
    fn switching_presets_accumulates() {
        let mut settings = FilterSettings::default();
        let mut selector = PresetSelector::default();
        selector.select(FilterPreset::Pixel, &mut settings);
        selector.select(FilterPreset::Soft, &mut settings);

        assert_eq!(settings.pixelate, 8.0);
        assert_eq!(settings.blur, 2.0);
        assert_eq!(selector.active(), Some(FilterPreset::Soft));
    }

    #[test]
    fn normal_does_not_clear_pixelate() {
        let mut settings = FilterSettings::default();
        FilterPreset::Pixel.overrides().apply_to(&mut settings);
        FilterPreset::Normal.overrides().apply_to(&mut settings);
        assert_eq!(settings.pixelate, 8.0);
        assert!(!settings.vintage);
    }

    #[test]
    fn reselecting_resets_everything() {
        let mut settings = FilterSettings::default();
        let mut selector = PresetSelector::default();
        selector.select(FilterPreset::Mirror, &mut settings);
        selector.select(FilterPreset::Beauty, &mut settings);
        selector.select(FilterPreset::Beauty, &mut settings);

        assert_eq!(settings, FilterSettings::default());
        assert_eq!(selector.active(), None);
    }

    #[test]
    fn labels_round_trip() {
        for preset in FilterPreset::ALL {
            assert_eq!(FilterPreset::from_label(preset.label()), Some(preset));
        }
        assert_eq!(FilterPreset::from_label("Sepia"), None);
    }
}
