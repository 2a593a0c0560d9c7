//! Light/dark theme passed explicitly into every renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::surface::Rgba;

/// Key under which the theme store persists the current mode.
pub const STORAGE_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_light(self) -> bool {
        self == Theme::Light
    }

    pub fn palette(self) -> Palette {
        Palette {
            ink: match self {
                Theme::Light => Rgba::rgb(0, 0, 0),
                Theme::Dark => Rgba::rgb(255, 255, 255),
            },
            brand: BRAND,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::UnknownTheme(other.to_string())),
        }
    }
}

/// Purple, indigo and blue accents shared by the brand-coloured variants.
pub const BRAND: [Rgba; 3] = [
    Rgba::rgb(147, 51, 234),
    Rgba::rgb(79, 70, 229),
    Rgba::rgb(59, 130, 246),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Star colour: black on the light page, white on the dark one.
    pub ink: Rgba,
    pub brand: [Rgba; 3],
}

/// Which themes a variant animates in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeGate {
    #[default]
    Any,
    LightOnly,
    DarkOnly,
}

impl ThemeGate {
    pub fn allows(self, theme: Theme) -> bool {
        match self {
            ThemeGate::Any => true,
            ThemeGate::LightOnly => theme == Theme::Light,
            ThemeGate::DarkOnly => theme == Theme::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_toggles() {
        assert_eq!("Light".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!(" dark ".parse::<Theme>().unwrap(), Theme::Dark);
        assert!(matches!("sepia".parse::<Theme>(), Err(Error::UnknownTheme(_))));
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }

    #[test]
    fn ink_follows_theme() {
        assert_eq!(Theme::Light.palette().ink, Rgba::rgb(0, 0, 0));
        assert_eq!(Theme::Dark.palette().ink, Rgba::rgb(255, 255, 255));
    }

    #[test]
    fn gates() {
        assert!(ThemeGate::Any.allows(Theme::Dark));
        assert!(ThemeGate::LightOnly.allows(Theme::Light));
        assert!(!ThemeGate::LightOnly.allows(Theme::Dark));
        assert!(!ThemeGate::DarkOnly.allows(Theme::Light));
    }
}
