//! Legend items handed to the map widget.

use crate::format::NumberFormatter;
use crate::options::{LegendOptions, LegendPosition, TextAlign};
use crate::palette::Color;
use crate::scale::Scale;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub color: Color,
    pub from: f64,
    pub to: f64,
    /// Formatted range, e.g. `1.80 - 2.60`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub visible: bool,
    pub position: LegendPosition,
    pub align_text: TextAlign,
    /// Ascending by range; widgets that list the highest bucket first reverse this.
    pub items: Vec<LegendItem>,
}

pub fn legend_items(scale: &Scale, formatter: &NumberFormatter) -> Vec<LegendItem> {
    scale
        .legend
        .iter()
        .map(|e| LegendItem {
            color: e.color,
            from: e.from,
            to: e.to,
            label: format!(
                "{} - {}",
                formatter.format(Some(e.from)),
                formatter.format(Some(e.to))
            ),
        })
        .collect()
}

pub fn build_legend(scale: &Scale, formatter: &NumberFormatter, options: &LegendOptions) -> Legend {
    Legend {
        visible: options.visible,
        position: options.position,
        align_text: options.align_text,
        items: legend_items(scale, formatter),
    }
}
