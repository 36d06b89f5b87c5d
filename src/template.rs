//! `{{ key }}` interpolation for tooltip and popup templates.
//!
//! Unknown keys render as an empty string; interpolation never fails. The output is not
//! sanitized: the host escapes or sanitizes markup before displaying it.

use ahash::AHashMap;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Flat string context a template is rendered against.
pub type TemplateContext = AHashMap<String, String>;

fn token_regex() -> Option<&'static Regex> {
    static TOKEN: OnceLock<Option<Regex>> = OnceLock::new();
    TOKEN
        .get_or_init(|| Regex::new(r"\{\{\s*([^\s{}]+?)\s*\}\}").ok())
        .as_ref()
}

/// Replace every `{{ key }}` in `template` with `context[key]`.
pub fn format_simple_template(template: &str, context: &TemplateContext) -> String {
    let Some(re) = token_regex() else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &Captures| {
        context.get(&caps[1]).cloned().unwrap_or_default()
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> TemplateContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_known_and_blanks_unknown_keys() {
        let c = ctx(&[("@@name", "France"), ("@@value", "20.00")]);
        assert_eq!(
            format_simple_template("<b>{{ @@name }}</b>: {{@@value}} {{ missing }}", &c),
            "<b>France</b>: 20.00 "
        );
    }

    #[test]
    fn leaves_malformed_tokens_alone() {
        let c = ctx(&[("a", "1")]);
        assert_eq!(format_simple_template("{{ a b }} {a}", &c), "{{ a b }} {a}");
    }
}
