//! Render options, as persisted by the host application.
//!
//! Field names follow the persisted camelCase form. Every field has a default, so a partial
//! JSON document is merged over [`RenderOptions::default`].

use crate::error::{ChoroplethError, Result};
use crate::models::ViewportBounds;
use crate::palette::{self, Color};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How bucket boundaries are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringMode {
    /// Equal sample counts per bucket.
    #[serde(alias = "q")]
    Quantile,
    /// Equal value ranges per bucket.
    #[default]
    #[serde(alias = "e")]
    Equidistant,
    /// 1-D k-means.
    #[serde(alias = "k", alias = "k-means")]
    Kmeans,
}

/// Legend corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    #[default]
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorOptions {
    pub min: Color,
    pub max: Color,
    pub background: Color,
    pub borders: Color,
    pub no_value: Color,
}

impl Default for ColorOptions {
    fn default() -> Self {
        let pick = |name: &str, fallback: Color| palette::named(name).unwrap_or(fallback);
        Self {
            min: pick("Light Blue", Color::rgb(0x79, 0x9c, 0xff)),
            max: pick("Dark Blue", Color::rgb(0x00, 0x2f, 0xb4)),
            background: pick("White", Color::rgb(0xff, 0xff, 0xff)),
            borders: pick("White", Color::rgb(0xff, 0xff, 0xff)),
            no_value: pick("Light Gray", Color::rgb(0xdd, 0xdd, 0xdd)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendOptions {
    pub visible: bool,
    pub position: LegendPosition,
    pub align_text: TextAlign,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            visible: true,
            position: LegendPosition::default(),
            align_text: TextAlign::default(),
        }
    }
}

/// Tooltip or popup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    pub enabled: bool,
    pub template: String,
}

impl TemplateOptions {
    fn enabled_with(template: &str) -> Self {
        Self {
            enabled: true,
            template: template.to_string(),
        }
    }
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self::enabled_with("")
    }
}

pub const DEFAULT_TOOLTIP: &str = "<b>{{ @@name }}</b>: {{ @@value }}";
pub const DEFAULT_POPUP: &str = "Country: <b>{{ @@name_long }}</b>\n<br>\nValue: <b>{{ @@value }}</b>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub map_type: String,
    #[serde(rename = "countryCodeColumn")]
    pub code_column: String,
    #[serde(rename = "countryCodeType")]
    pub code_type: String,
    pub value_column: String,
    pub clustering_mode: ClusteringMode,
    pub steps: usize,
    pub value_format: String,
    pub no_value_placeholder: String,
    /// Locale tag for number formatting (`en`, `de`, `fr`, ...).
    pub locale: String,
    pub colors: ColorOptions,
    pub legend: LegendOptions,
    pub tooltip: TemplateOptions,
    pub popup: TemplateOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ViewportBounds>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            map_type: "countries".into(),
            code_column: String::new(),
            code_type: "iso_a3".into(),
            value_column: String::new(),
            clustering_mode: ClusteringMode::default(),
            steps: 5,
            value_format: "0,0.00".into(),
            no_value_placeholder: "N/A".into(),
            locale: "en".into(),
            colors: ColorOptions::default(),
            legend: LegendOptions::default(),
            tooltip: TemplateOptions::enabled_with(DEFAULT_TOOLTIP),
            popup: TemplateOptions::enabled_with(DEFAULT_POPUP),
            bounds: None,
        }
    }
}

impl RenderOptions {
    /// Parse options from JSON, filling every missing field with its default.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let options: RenderOptions = serde_json::from_str(s)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Reject option values the pipeline cannot work with.
    ///
    /// Unknown map types are not rejected: they render as an empty map.
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(ChoroplethError::invalid("steps", "must be a positive integer"));
        }
        Ok(())
    }

    /// True when the two option sets differ in anything that affects the rendered layer,
    /// i.e. everything except `bounds` and `mapType`.
    pub fn layer_changed(&self, other: &RenderOptions) -> bool {
        let strip = |o: &RenderOptions| RenderOptions {
            bounds: None,
            map_type: String::new(),
            ..o.clone()
        };
        strip(self) != strip(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_merges_over_defaults() {
        let o = RenderOptions::from_json_str(
            r##"{"mapType":"subdiv_japan","clusteringMode":"q","colors":{"min":"#000000"}}"##,
        )
        .unwrap();
        assert_eq!(o.map_type, "subdiv_japan");
        assert_eq!(o.clustering_mode, ClusteringMode::Quantile);
        assert_eq!(o.colors.min, Color::rgb(0, 0, 0));
        assert_eq!(o.colors.max, ColorOptions::default().max);
        assert_eq!(o.steps, 5);
        assert_eq!(o.tooltip.template, DEFAULT_TOOLTIP);
    }

    #[test]
    fn zero_steps_is_rejected() {
        let err = RenderOptions::from_json_str(r#"{"steps":0}"#).unwrap_err();
        assert!(err.to_string().contains("steps"));
    }

    #[test]
    fn layer_change_ignores_bounds_and_map_type() {
        let a = RenderOptions::default();
        let mut b = a.clone();
        b.map_type = "state_india".into();
        b.bounds = Some([[0.0, 0.0], [1.0, 1.0]].into());
        assert!(!a.layer_changed(&b));
        b.steps = 7;
        assert!(a.layer_changed(&b));
    }
}
