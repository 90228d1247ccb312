//! Shortcode attribute parsing
//!
//! Parses the attribute text of a tag (`[if current_user_can="edit_posts" _debug=true]`)
//! into an ordered list. Supported forms:
//! - `name="value"`, `name='value'`, `name=value`
//! - bare `"value"`, `'value'` or `value`, stored under a positional key
//!
//! Attribute names keep their case so that invalid names can be reported
//! as written.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static ATTRIBUTE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([\w-]+)\s*=\s*"([^"]*)"(?:\s|$)|([\w-]+)\s*=\s*'([^']*)'(?:\s|$)|([\w-]+)\s*=\s*([^\s'"]+)(?:\s|$)|"([^"]*)"(?:\s|$)|'([^']*)'(?:\s|$)|(\S+)(?:\s|$)"#,
    )
    .expect("valid attribute pattern")
});

static INVISIBLE_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{00a0}\u{200b}]+").expect("valid space pattern"));

/// Key of a shortcode attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AttrKey {
    /// `name="value"`
    Named(String),
    /// A value written without a name, numbered in source order
    Positional(usize),
}

impl AttrKey {
    pub fn named(name: impl Into<String>) -> Self {
        AttrKey::Named(name.into())
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            AttrKey::Named(name) => Some(name),
            AttrKey::Positional(_) => None,
        }
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, AttrKey::Positional(_))
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrKey::Named(name) => write!(f, "{}", name),
            AttrKey::Positional(index) => write!(f, "{}", index),
        }
    }
}

/// Ordered attribute map.
///
/// Re-assigning an existing key replaces its value but keeps its original
/// position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawAttributes {
    entries: IndexMap<AttrKey, String>,
}

impl RawAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds named attributes from `(name, value)` pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut attributes = Self::new();
        for (name, value) in pairs {
            attributes.insert(AttrKey::named(name), value);
        }
        attributes
    }

    pub fn insert(&mut self, key: AttrKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    /// Appends a bare value under the next positional index
    pub fn push_positional(&mut self, value: impl Into<String>) {
        let index = self.entries.keys().filter(|k| k.is_positional()).count();
        self.entries.insert(AttrKey::Positional(index), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&AttrKey::named(name))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttrKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &AttrKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuilds the opening tag text, e.g. `[if current_user_can="edit_posts"]`
    pub fn recreate(&self, tag: &str) -> String {
        let mut out = format!("[{}", tag);
        for (key, value) in &self.entries {
            out.push(' ');
            match key {
                AttrKey::Positional(_) if !needs_quotes(value) => out.push_str(value),
                AttrKey::Positional(_) => out.push_str(&quote(value)),
                AttrKey::Named(name) => out.push_str(&format!("{}={}", name, quote(value))),
            }
        }
        out.push(']');
        out
    }
}

// A bare value must stay one positional token when parsed again
fn needs_quotes(value: &str) -> bool {
    value.is_empty() || value.contains(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '='))
}

fn quote(value: &str) -> String {
    if value.contains('"') && !value.contains('\'') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}

/// Parse the attribute text of a tag
pub fn parse_attributes(text: &str) -> RawAttributes {
    let text = INVISIBLE_SPACES.replace_all(text, " ");
    let mut attributes = RawAttributes::new();

    for caps in ATTRIBUTE_PATTERN.captures_iter(&text) {
        let group = |i: usize| caps.get(i).map(|m| m.as_str());

        if let (Some(name), Some(value)) = (group(1), group(2)) {
            attributes.insert(AttrKey::named(name), value);
        } else if let (Some(name), Some(value)) = (group(3), group(4)) {
            attributes.insert(AttrKey::named(name), value);
        } else if let (Some(name), Some(value)) = (group(5), group(6)) {
            attributes.insert(AttrKey::named(name), value);
        } else if let Some(value) = group(7).or_else(|| group(8)).or_else(|| group(9)) {
            attributes.push_positional(value);
        }
    }

    tracing::trace!("parsed {} attribute(s) from '{}'", attributes.len(), text);
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_forms() {
        let atts = parse_attributes(r#" current_user_can="edit_posts" _satisfy='any' _debug=true"#);
        assert_eq!(atts.get("current_user_can"), Some("edit_posts"));
        assert_eq!(atts.get("_satisfy"), Some("any"));
        assert_eq!(atts.get("_debug"), Some("true"));
        assert_eq!(atts.len(), 3);
    }

    #[test]
    fn test_parse_positional_values() {
        let atts = parse_attributes(r#"current_user_is_logged_in "quoted" 'single'"#);
        let keys: Vec<_> = atts.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![AttrKey::Positional(0), AttrKey::Positional(1), AttrKey::Positional(2)]
        );
        assert_eq!(
            atts.iter().map(|(_, v)| v).collect::<Vec<_>>(),
            vec!["current_user_is_logged_in", "quoted", "single"]
        );
    }

    #[test]
    fn test_parse_keeps_case_and_empty_values() {
        let atts = parse_attributes(r#"customField="true" php="""#);
        assert_eq!(atts.get("customField"), Some("true"));
        assert_eq!(atts.get("php"), Some(""));
    }

    #[test]
    fn test_duplicate_key_keeps_first_position() {
        let atts = parse_attributes(r#"a="1" b="2" a="3""#);
        let pairs: Vec<_> = atts.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        assert_eq!(
            pairs,
            vec![("a".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_non_breaking_space_separates() {
        let atts = parse_attributes("a=\"1\"\u{00a0}b=\"2\"");
        assert_eq!(atts.get("b"), Some("2"));
    }

    #[test]
    fn test_recreate() {
        let mut atts = RawAttributes::from_pairs([("current_user_can", "a AND b"), ("q", r#"say "hi""#)]);
        atts.push_positional("bare");
        assert_eq!(
            atts.recreate("_if"),
            r#"[_if current_user_can="a AND b" q='say "hi"' bare]"#
        );
    }

    #[test]
    fn test_recreate_quotes_positional_values_with_spaces() {
        let atts = parse_attributes(r#"a="1" "two words" bare"#);
        assert_eq!(atts.len(), 3);

        let tag = atts.recreate("if");
        assert_eq!(tag, r#"[if a="1" "two words" bare]"#);

        let reparsed = parse_attributes(&tag[3..tag.len() - 1]);
        assert_eq!(reparsed, atts);
    }
}
