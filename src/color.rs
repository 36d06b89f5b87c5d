use crate::palette::{Color, Hsl};
use crate::scale::Scale;

/// Lightness multiplier applied by [`darken`].
pub const DARKEN_FACTOR: f64 = 0.75;

/// Fill color for a region value.
///
/// Absent or non-finite values, and scales built from no data, take `no_value`.
pub fn color_by_value(value: Option<f64>, scale: &Scale, no_value: Color) -> Color {
    match value {
        Some(v) if v.is_finite() && !scale.is_empty() => {
            scale.colors.get(scale.bucket_of(v)).copied().unwrap_or(no_value)
        }
        _ => no_value,
    }
}

/// Darker variant of `color` for hover emphasis: same hue and saturation, lightness scaled
/// by [`DARKEN_FACTOR`].
pub fn darken(color: Color) -> Color {
    let hsl = color.to_hsl();
    Color::from_hsl(Hsl {
        l: hsl.l * DARKEN_FACTOR,
        ..hsl
    })
}
