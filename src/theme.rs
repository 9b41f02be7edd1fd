//! Dark/light palettes shared by particle initialisation and theme switches.

use std::fmt;
use std::str::FromStr;

use crate::error::SceneError;

/// `localStorage` key holding the persisted preference.
pub const STORAGE_KEY: &str = "portfolio-theme";
/// Attribute on `<html>` mirroring the active theme.
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Cumulative thresholds for the three particle colour slots (40/35/25).
const SLOT_THRESHOLDS: [f32; 2] = [0.4, 0.75];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Reads a `data-theme` attribute value. Anything other than `"light"`
    /// (including a missing attribute) is dark.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                particle: [
                    Rgb::from_hex(0x00d4ff),
                    Rgb::from_hex(0xa855f7),
                    Rgb::from_hex(0xf472b6),
                ],
                wireframe: Rgb::from_hex(0x00d4ff),
                ambient: Rgb::from_hex(0x111128),
            },
            Theme::Light => Palette {
                particle: [
                    Rgb::from_hex(0x0066ff),
                    Rgb::from_hex(0x7c3aed),
                    Rgb::from_hex(0xec4899),
                ],
                wireframe: Rgb::from_hex(0x0066ff),
                ambient: Rgb::from_hex(0xe2e5ef),
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(SceneError::UnknownTheme(other.to_owned())),
        }
    }
}

/// Linear RGB in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Colour slot a wireframe solid is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSlot {
    Wireframe,
    Particle1,
    Particle2,
    Particle3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub particle: [Rgb; 3],
    pub wireframe: Rgb,
    pub ambient: Rgb,
}

impl Palette {
    pub fn color(&self, slot: ColorSlot) -> Rgb {
        match slot {
            ColorSlot::Wireframe => self.wireframe,
            ColorSlot::Particle1 => self.particle[0],
            ColorSlot::Particle2 => self.particle[1],
            ColorSlot::Particle3 => self.particle[2],
        }
    }

    /// Maps a uniform sample in `[0, 1)` to a particle colour slot index.
    pub fn weighted_slot(sample: f32) -> usize {
        if sample < SLOT_THRESHOLDS[0] {
            0
        } else if sample < SLOT_THRESHOLDS[1] {
            1
        } else {
            2
        }
    }

    pub fn weighted_particle_color(&self, sample: f32) -> Rgb {
        self.particle[Self::weighted_slot(sample)]
    }
}

/// Receiver of theme-change notifications. The theme toggle holds one of
/// these and calls it after the new mode has been applied to the document.
pub trait ThemeObserver {
    fn theme_changed(&mut self, theme: Theme);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_attribute_is_dark() {
        assert_eq!(Theme::from_attribute(None), Theme::Dark);
        assert_eq!(Theme::from_attribute(Some("sepia")), Theme::Dark);
        assert_eq!(Theme::from_attribute(Some("light")), Theme::Light);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("light".parse::<Theme>().ok(), Some(Theme::Light));
        assert!("Light".parse::<Theme>().is_err());
    }

    #[test]
    fn hex_decodes_channels() {
        let c = Rgb::from_hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn slot_thresholds() {
        assert_eq!(Palette::weighted_slot(0.0), 0);
        assert_eq!(Palette::weighted_slot(0.3999), 0);
        assert_eq!(Palette::weighted_slot(0.4), 1);
        assert_eq!(Palette::weighted_slot(0.7499), 1);
        assert_eq!(Palette::weighted_slot(0.75), 2);
    }
}
