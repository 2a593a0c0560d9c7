//! Per-canvas configuration read from page markup.
//!
//! A canvas names its variant in `data-backdrop` and may carry overrides as JSON
//! in `data-config`, e.g. `{"gate": "any", "population": {"fixed": 40}}`. The
//! `image` variant takes its picture from `{"src": "..."}`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::particles::Population;
use crate::theme::{Theme, ThemeGate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Starfield,
    Glitter,
    ShootingStars,
    Shapes,
    LightSpots,
    Network,
    Sparkle,
    Landscape,
    TabletRays,
    Image,
}

impl Variant {
    pub const ALL: [Variant; 10] = [
        Variant::Starfield,
        Variant::Glitter,
        Variant::ShootingStars,
        Variant::Shapes,
        Variant::LightSpots,
        Variant::Network,
        Variant::Sparkle,
        Variant::Landscape,
        Variant::TabletRays,
        Variant::Image,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Starfield => "starfield",
            Variant::Glitter => "glitter",
            Variant::ShootingStars => "shooting-stars",
            Variant::Shapes => "shapes",
            Variant::LightSpots => "light-spots",
            Variant::Network => "network",
            Variant::Sparkle => "sparkle",
            Variant::Landscape => "landscape",
            Variant::TabletRays => "tablet-rays",
            Variant::Image => "image",
        }
    }

    /// Themes the variant animates in unless the page overrides it.
    pub fn default_gate(self) -> ThemeGate {
        match self {
            Variant::Starfield | Variant::Sparkle | Variant::Landscape | Variant::Image => {
                ThemeGate::Any
            }
            Variant::Glitter
            | Variant::ShootingStars
            | Variant::Shapes
            | Variant::LightSpots
            | Variant::Network
            | Variant::TabletRays => ThemeGate::LightOnly,
        }
    }

    /// Canvas opacity applied through CSS.
    pub fn default_opacity(self, theme: Theme) -> f64 {
        match self {
            Variant::Starfield if theme.is_light() => 0.8,
            Variant::Starfield => 0.9,
            Variant::Glitter | Variant::LightSpots => 0.7,
            Variant::ShootingStars | Variant::Shapes => 0.8,
            Variant::Network => 0.6,
            Variant::Sparkle | Variant::Landscape | Variant::TabletRays | Variant::Image => 1.0,
        }
    }

    /// Most entities a `population` override may ask for. Network links every
    /// pair, so it stays at its default of 100.
    pub fn population_limit(self) -> usize {
        match self {
            Variant::Starfield => 1000,
            Variant::Glitter => 600,
            Variant::Network => 100,
            Variant::Shapes | Variant::Sparkle => 60,
            Variant::LightSpots | Variant::TabletRays => 40,
            // Fixed casts; overrides are ignored.
            Variant::ShootingStars | Variant::Landscape | Variant::Image => 0,
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| Error::UnknownVariant(s.to_string()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    pub variant: Variant,
    /// Overrides [`Variant::default_gate`].
    pub gate: Option<ThemeGate>,
    /// Overrides the variant's own entity count.
    pub population: Option<Population>,
    pub opacity: Option<f64>,
    /// Picture URL for the `image` variant.
    pub src: Option<String>,
    /// CSS blur in pixels applied to the canvas element.
    pub blur: Option<f64>,
}

impl BackdropConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Combine the two canvas attributes; the variant attribute wins over JSON.
    pub fn from_attributes(variant: Option<&str>, json: Option<&str>) -> Result<Self> {
        let mut config = match json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => Self::from_json(json)?,
            None => Self::default(),
        };
        if let Some(name) = variant.map(str::trim).filter(|s| !s.is_empty()) {
            config.variant = name.parse()?;
        }
        Ok(config)
    }

    pub fn gate(&self) -> ThemeGate {
        self.gate.unwrap_or_else(|| self.variant.default_gate())
    }

    /// The page's population override bounded by the variant's limit, or `default`.
    pub fn population_or(&self, default: Population) -> Population {
        let Some(wanted) = self.population else {
            return default;
        };
        let limit = self.variant.population_limit();
        let capped = wanted.capped(limit);
        if capped != wanted {
            log::warn!(
                "{}: population override capped at {limit}",
                self.variant.name()
            );
        }
        capped
    }

    /// Blur radius for the canvas CSS filter; `None` when there is nothing to blur.
    pub fn blur(&self) -> Option<f64> {
        self.blur.filter(|b| b.is_finite() && *b > 0.0)
    }

    pub fn opacity(&self, theme: Theme) -> f64 {
        self.opacity
            .unwrap_or_else(|| self.variant.default_opacity(theme))
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Bounds;

    #[test]
    fn variant_names_round_trip_through_from_str() {
        for v in Variant::ALL {
            assert_eq!(v.name().parse::<Variant>().unwrap(), v);
        }
        assert_eq!("Light_Spots".parse::<Variant>().unwrap(), Variant::LightSpots);
        assert!(matches!("aurora".parse::<Variant>(), Err(Error::UnknownVariant(_))));
    }

    #[test]
    fn json_overrides() {
        let c = BackdropConfig::from_json(
            r#"{"variant":"network","gate":"any","population":{"density":{"area_per_particle":20000.0,"cap":80}},"opacity":0.5}"#,
        )
        .unwrap();
        assert_eq!(c.variant, Variant::Network);
        assert_eq!(c.gate(), ThemeGate::Any);
        assert_eq!(
            c.population,
            Some(Population::Density {
                area_per_particle: 20000.0,
                cap: 80
            })
        );
        assert_eq!(c.opacity(Theme::Dark), 0.5);
    }

    #[test]
    fn attribute_beats_json_and_defaults_fill_in() {
        let c = BackdropConfig::from_attributes(Some("shapes"), Some(r#"{"variant":"glitter"}"#))
            .unwrap();
        assert_eq!(c.variant, Variant::Shapes);
        assert_eq!(c.gate(), ThemeGate::LightOnly);
        assert_eq!(c.opacity(Theme::Light), 0.8);

        let c = BackdropConfig::from_attributes(None, Some("  ")).unwrap();
        assert_eq!(c, BackdropConfig::default());
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = BackdropConfig::from_attributes(Some("starfield"), Some("{gate:")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn population_override_is_capped() {
        let c = BackdropConfig::from_attributes(
            Some("network"),
            Some(r#"{"population":{"fixed":20000}}"#),
        )
        .unwrap();
        let resolved = c.population_or(Population::Fixed(100));
        assert_eq!(resolved, Population::Fixed(100));
        assert!(resolved.resolve(Bounds::new(3840.0, 2160.0)) <= 100);

        let c = BackdropConfig::from_json(
            r#"{"variant":"glitter","population":{"density":{"area_per_particle":1.0,"cap":1000000}}}"#,
        )
        .unwrap();
        assert_eq!(
            c.population_or(Population::Fixed(300))
                .resolve(Bounds::new(3840.0, 2160.0)),
            600
        );

        let c = BackdropConfig::for_variant(Variant::Network);
        assert_eq!(c.population_or(Population::Fixed(7)), Population::Fixed(7));
        let small = BackdropConfig {
            population: Some(Population::Fixed(20)),
            ..c
        };
        assert_eq!(small.population_or(Population::Fixed(7)), Population::Fixed(20));
    }

    #[test]
    fn image_reads_src_and_blur() {
        let c = BackdropConfig::from_attributes(
            Some("image"),
            Some(r#"{"src":"/hero.jpg","blur":4}"#),
        )
        .unwrap();
        assert_eq!(c.variant, Variant::Image);
        assert_eq!(c.src.as_deref(), Some("/hero.jpg"));
        assert_eq!(c.blur(), Some(4.0));
        assert_eq!(c.gate(), ThemeGate::Any);

        let c = BackdropConfig::from_json(r#"{"blur":-2}"#).unwrap();
        assert_eq!(c.blur(), None);
    }

    #[test]
    fn starfield_opacity_depends_on_theme() {
        let c = BackdropConfig::for_variant(Variant::Starfield);
        assert_eq!(c.opacity(Theme::Light), 0.8);
        assert_eq!(c.opacity(Theme::Dark), 0.9);
    }
}
