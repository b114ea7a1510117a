//! Placeholder token scanning and substitution
//!
//! A token is `$$` followed by an identifier. Three shapes are recognised by
//! independent matchers and their matches are unioned, so a capitalised token
//! such as `$$Name` may also yield the shorter `$$N`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

/// `$$VARIABLE`, `$$VARIABLE_1`, `$$VARIABLE_NAME`
static UPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$[A-Z][A-Z0-9_]*").unwrap());

/// `$$Variable`, `$$VariableName`
static CAPITALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$[A-Z][a-zA-Z0-9_]*").unwrap());

/// `$$variable`, `$$variableName`
static LOWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$[a-z][a-zA-Z0-9_]*").unwrap());

fn matchers() -> [&'static Regex; 3] {
    [&UPPER_RE, &CAPITALIZED_RE, &LOWER_RE]
}

/// Collect every distinct token appearing in any of `texts`
pub fn scan<'a, I>(texts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tokens = BTreeSet::new();
    for text in texts {
        for re in matchers() {
            tokens.extend(re.find_iter(text).map(|m| m.as_str().to_string()));
        }
    }
    tokens
}

/// Order tokens for presentation: case-insensitive, then case-sensitive
pub fn presentation_order(tokens: &BTreeSet<String>) -> Vec<String> {
    let mut ordered: Vec<String> = tokens.iter().cloned().collect();
    ordered.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    ordered
}

/// Replace every occurrence of each token literally
///
/// Longer tokens go first so a token that prefixes another is never
/// substituted inside it.
pub fn substitute(text: &str, replacements: &BTreeMap<String, String>) -> String {
    let mut ordered: Vec<(&String, &String)> = replacements.iter().collect();
    ordered.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    ordered
        .into_iter()
        .fold(text.to_string(), |acc, (token, value)| acc.replace(token.as_str(), value))
}
