//! Colors for the choropleth: an 8-bit RGB color type, HSL conversion, linear interpolation,
//! and the named palette offered to users.
//!
//! Colors serialize as `#rrggbb` hex strings, which is also how they are stored in options.

use crate::error::{ChoroplethError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h_deg: f64, // 0..360
    pub s: f64,     // 0..1
    pub l: f64,     // 0..1
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear per-channel interpolation; `t` is clamped to `0..=1`.
    pub fn mix(self, other: Color, t: f64) -> Color {
        let t = clamp01(t);
        let lerp = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
        };
        Color::rgb(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
        )
    }

    pub fn to_hsl(self) -> Hsl {
        let (r, g, b) = (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        );
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return Hsl {
                h_deg: 0.0,
                s: 0.0,
                l,
            };
        }

        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let hue = if max == r {
            60.0 * (((g - b) / delta) % 6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let h_deg = if hue < 0.0 { hue + 360.0 } else { hue };

        Hsl {
            h_deg,
            s: clamp01(s),
            l,
        }
    }

    pub fn from_hsl(hsl: Hsl) -> Color {
        let h = (hsl.h_deg.rem_euclid(360.0)) / 360.0;
        let s = clamp01(hsl.s);
        let l = clamp01(hsl.l);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Color::rgb(v, v, v);
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;

        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 1.0 / 2.0 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        }

        let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
        let g = hue_to_rgb(p, q, h);
        let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

        Color::rgb(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ChoroplethError;

    /// Accepts `#rgb`, `#rrggbb` (the `#` is optional) or a palette name such as `Light Blue`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(c) = named(s) {
            return Ok(c);
        }
        let hex = s.strip_prefix('#').unwrap_or(s);
        let bad = || ChoroplethError::invalid("color", format!("`{s}` is not a hex color"));
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
        match hex.len() {
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let dup = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Ok(Color::rgb(dup(0)?, dup(1)?, dup(2)?))
            }
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ChoroplethError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Shared visualization palette plus the extra entries the map needs
/// (white background, light gray for regions without a value).
pub const PALETTE: [(&str, Color); 17] = [
    ("Blue", Color::rgb(0x35, 0x6a, 0xff)),
    ("Red", Color::rgb(0xe9, 0x28, 0x28)),
    ("Green", Color::rgb(0x3b, 0xd9, 0x73)),
    ("Purple", Color::rgb(0x60, 0x4f, 0xe9)),
    ("Cyan", Color::rgb(0x50, 0xf5, 0xed)),
    ("Orange", Color::rgb(0xfb, 0x8d, 0x3d)),
    ("Light Blue", Color::rgb(0x79, 0x9c, 0xff)),
    ("Lilac", Color::rgb(0xb5, 0x54, 0xff)),
    ("Light Green", Color::rgb(0x8c, 0xff, 0xb4)),
    ("Brown", Color::rgb(0xa5, 0x5f, 0x2a)),
    ("Gray", Color::rgb(0x49, 0x49, 0x49)),
    ("Pink", Color::rgb(0xff, 0x7d, 0xe3)),
    ("Dark Blue", Color::rgb(0x00, 0x2f, 0xb4)),
    ("Indian Red", Color::rgb(0xf8, 0x48, 0x48)),
    ("White", Color::rgb(0xff, 0xff, 0xff)),
    ("Black", Color::rgb(0x00, 0x00, 0x00)),
    ("Light Gray", Color::rgb(0xdd, 0xdd, 0xdd)),
];

/// Look up a palette entry by name (case-insensitive).
pub fn named(name: &str) -> Option<Color> {
    PALETTE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, c)| *c)
}

/// `count` colors evenly spaced from `min` to `max` inclusive.
///
/// A single color takes `max`.
pub fn ramp(min: Color, max: Color, count: usize) -> Vec<Color> {
    match count {
        0 => Vec::new(),
        1 => vec![max],
        n => (0..n)
            .map(|i| min.mix(max, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}
