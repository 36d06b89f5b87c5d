//! Value formatting for tooltips, popups and legend labels.
//!
//! Format strings follow the familiar spreadsheet-style subset:
//! - `0` integer, `0,0` integer with thousands separators
//! - `0.00` fixed decimals, `0.0[00]` one to three decimals, `0[.]00` optional decimals
//! - a trailing `%` multiplies by 100 and appends a percent sign
//!
//! An empty format renders the plain number.

use num_format::{Locale, ToFormattedString};

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Pattern {
    thousands: bool,
    min_decimals: usize,
    max_decimals: usize,
    percent: bool,
}

impl Pattern {
    fn parse(text: &str) -> Option<Pattern> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let (body, percent) = match text.strip_suffix('%') {
            Some(b) => (b.trim_end(), true),
            None => (text, false),
        };

        let (int_part, frac_part, optional_point) = if let Some((i, f)) = body.split_once("[.]") {
            (i, f, true)
        } else if let Some((i, f)) = body.split_once('.') {
            (i, f, false)
        } else {
            (body, "", false)
        };

        let mut min_decimals = 0;
        let mut max_decimals = 0;
        let mut optional = optional_point;
        for ch in frac_part.chars() {
            match ch {
                '[' => optional = true,
                ']' => optional = optional_point,
                '0' => {
                    max_decimals += 1;
                    if !optional {
                        min_decimals += 1;
                    }
                }
                _ => {}
            }
        }

        Some(Pattern {
            thousands: int_part.contains(','),
            min_decimals,
            max_decimals,
            percent,
        })
    }
}

/// Formats numbers for display; absent values render as the placeholder.
#[derive(Debug, Clone)]
pub struct NumberFormatter {
    pattern: Option<Pattern>,
    placeholder: String,
    locale: &'static Locale,
    decimal_sep: char,
}

impl NumberFormatter {
    pub fn new(format: &str, placeholder: &str, locale_tag: &str) -> Self {
        let (locale, decimal_sep) = map_locale(locale_tag);
        Self {
            pattern: Pattern::parse(format),
            placeholder: placeholder.to_string(),
            locale,
            decimal_sep,
        }
    }

    pub fn format(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if v.is_finite() => self.format_number(v),
            _ => self.placeholder.clone(),
        }
    }

    fn format_number(&self, v: f64) -> String {
        let Some(p) = &self.pattern else {
            return v.to_string();
        };

        let scaled = if p.percent { v * 100.0 } else { v };
        let fixed = format!("{:.*}", p.max_decimals, scaled.abs());
        let (int_digits, frac_digits) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut frac = frac_digits.to_string();
        while frac.len() > p.min_decimals && frac.ends_with('0') {
            frac.pop();
        }

        let int_text = if p.thousands {
            match int_digits.parse::<u128>() {
                Ok(n) => n.to_formatted_string(self.locale),
                Err(_) => int_digits.to_string(),
            }
        } else {
            int_digits.to_string()
        };

        let rounds_to_zero = int_digits.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
        let negative = scaled < 0.0 && !rounds_to_zero;
        let mut out = String::with_capacity(int_text.len() + frac.len() + 3);
        if negative {
            out.push('-');
        }
        out.push_str(&int_text);
        if !frac.is_empty() {
            out.push(self.decimal_sep);
            out.push_str(&frac);
        }
        if p.percent {
            out.push('%');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_groups_thousands_with_two_decimals() {
        let f = NumberFormatter::new("0,0.00", "N/A", "en");
        assert_eq!(f.format(Some(1234567.891)), "1,234,567.89");
        assert_eq!(f.format(Some(-3.0)), "-3.00");
        assert_eq!(f.format(None), "N/A");
        assert_eq!(f.format(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn optional_decimals_are_trimmed() {
        let f = NumberFormatter::new("0[.]00", "", "en");
        assert_eq!(f.format(Some(2.0)), "2");
        assert_eq!(f.format(Some(2.5)), "2.5");
        let f = NumberFormatter::new("0.0[00]", "", "en");
        assert_eq!(f.format(Some(2.0)), "2.0");
        assert_eq!(f.format(Some(2.12345)), "2.123");
    }

    #[test]
    fn percent_and_locale() {
        let f = NumberFormatter::new("0.0%", "", "en");
        assert_eq!(f.format(Some(0.256)), "25.6%");
        let f = NumberFormatter::new("0,0.00", "", "de");
        assert_eq!(f.format(Some(1234.5)), "1.234,50");
    }

    #[test]
    fn empty_format_prints_plain_number() {
        let f = NumberFormatter::new("", "-", "en");
        assert_eq!(f.format(Some(2.0)), "2");
        assert_eq!(f.format(Some(0.5)), "0.5");
    }

    #[test]
    fn negative_zero_after_rounding_has_no_sign() {
        let f = NumberFormatter::new("0", "", "en");
        assert_eq!(f.format(Some(-0.2)), "0");
    }
}
