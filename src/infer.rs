//! Guess which feature property the data's code column refers to.
//!
//! A handful of leading values are tested against the code formats each map type offers
//! (ISO alpha-2/alpha-3/numeric for countries, `JP-xx` for prefectures, numeric ids for India,
//! ...). The format matching most of the sample wins.

use crate::map_types::{self, RegionKind};
use crate::models::{Row, code_text};
use crate::options::RenderOptions;
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

/// Number of non-empty values examined.
pub const SAMPLE_SIZE: usize = 50;

/// How a candidate code type recognizes a value.
#[derive(Debug, Clone)]
enum Matcher {
    Pattern(&'static str),
    /// Integer id within an inclusive range.
    Id(RangeInclusive<u32>),
}

struct Candidate {
    key: &'static str,
    matcher: Matcher,
}

const ISO_A2: &str = r"^[A-Za-z]{2}$";
const ISO_A3: &str = r"^[A-Za-z]{3}$";
const ISO_N3: &str = r"^[0-9]{3}$";
const JP_ISO: &str = r"^(?i:JP)-[0-9]{2}$";
const CJK: &str = r"^[\p{Han}\p{Hiragana}\p{Katakana}]+$";
const LATIN_NAME: &str = r"^[A-Za-z][A-Za-z .'\-]*$";

fn candidates(kind: RegionKind) -> Vec<Candidate> {
    let c = |key, matcher| Candidate { key, matcher };
    match kind {
        RegionKind::Countries => vec![
            c("iso_a2", Matcher::Pattern(ISO_A2)),
            c("iso_a3", Matcher::Pattern(ISO_A3)),
            c("iso_n3", Matcher::Pattern(ISO_N3)),
        ],
        RegionKind::JapanPrefectures => vec![
            c("iso_3166_2", Matcher::Pattern(JP_ISO)),
            c("name_local", Matcher::Pattern(CJK)),
            c("name", Matcher::Pattern(LATIN_NAME)),
        ],
        RegionKind::IndiaStates => vec![
            c("id", Matcher::Id(1..=37)),
            c("name", Matcher::Pattern(LATIN_NAME)),
        ],
        RegionKind::IndiaDistricts { .. } => vec![
            c("id", Matcher::Id(1..=732)),
            c("name", Matcher::Pattern(LATIN_NAME)),
        ],
    }
}

fn compiled(pattern: &'static str) -> Option<&'static Regex> {
    static CACHE: OnceLock<Vec<(&'static str, Option<Regex>)>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| {
        [ISO_A2, ISO_A3, ISO_N3, JP_ISO, CJK, LATIN_NAME]
            .into_iter()
            .map(|p| (p, Regex::new(p).ok()))
            .collect()
    });
    cache
        .iter()
        .find(|(p, _)| *p == pattern)
        .and_then(|(_, re)| re.as_ref())
}

impl Matcher {
    fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Pattern(p) => compiled(*p).is_some_and(|re| re.is_match(value)),
            Matcher::Id(range) => value
                .trim()
                .parse::<u32>()
                .is_ok_and(|id| range.contains(&id)),
        }
    }
}

/// Up to [`SAMPLE_SIZE`] non-empty code values from `column`.
fn sample(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|r| r.get(column).and_then(code_text))
        .map(|s| s.trim().to_string())
        .take(SAMPLE_SIZE)
        .collect()
}

/// Best matching code type for the values in `column`, or `None` when no candidate matches
/// at least half of the sample.
pub fn infer_code_type(map_type: &str, rows: &[Row], column: &str) -> Option<&'static str> {
    let kind = map_types::lookup(map_type)?.kind;
    if column.is_empty() {
        return None;
    }
    let values = sample(rows, column);
    if values.is_empty() {
        return None;
    }

    let mut best: Option<(&'static str, usize)> = None;
    for cand in candidates(kind) {
        let score = values.iter().filter(|v| cand.matcher.matches(v)).count();
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((cand.key, score));
        }
    }

    let (key, score) = best?;
    log::debug!(
        "code type inference for `{column}` on {map_type}: {key} matched {score}/{}",
        values.len()
    );
    (score > 0 && score * 2 >= values.len()).then_some(key)
}

/// Re-infer the code type after the map type, code column or data changed.
/// Keeps the configured code type when inference is not confident.
pub fn resolve_code_type(options: &mut RenderOptions, rows: &[Row]) {
    if let Some(key) = infer_code_type(&options.map_type, rows, &options.code_column) {
        if key != options.code_type {
            log::info!("code type changed from {} to {}", options.code_type, key);
            options.code_type = key.to_string();
        }
    }
}
