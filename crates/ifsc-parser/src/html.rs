//! HTML text helpers used around shortcode content
//!
//! - [`unescape_html`] decodes the entities editors put into attribute values
//! - [`escape_html`] escapes text for the debug blocks
//! - [`html_trim`] strips whitespace and empty-line markup around branches

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\s|&nbsp;|<br\s*/?>|</?p>)+").expect("valid leading trim pattern")
});

static TRAILING_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\s|&nbsp;|<br\s*/?>|</?p>)+$").expect("valid trailing trim pattern")
});

/// Decode HTML entities.
///
/// Named entities and decimal or hexadecimal numeric references are decoded;
/// text that is not an entity passes through unchanged.
pub fn unescape_html(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(s: &str) -> String {
    html_escape::encode_safe(s).into_owned()
}

/// Trim whitespace, `&nbsp;`, `<br>` and paragraph tags from both ends
pub fn html_trim(s: &str) -> String {
    let s = LEADING_NOISE.replace(s, "");
    TRAILING_NOISE.replace(&s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_named_and_numeric() {
        assert_eq!(unescape_html("a &amp;&amp; b"), "a && b");
        assert_eq!(unescape_html("&#039;x&#39;"), "'x'");
        assert_eq!(unescape_html("&#x27;y&#x2019;"), "'y\u{2019}");
        assert_eq!(unescape_html("&#8220;q&#8221;"), "\u{201c}q\u{201d}");
        assert_eq!(unescape_html("&lt;b&gt; &ldquo;c&rdquo;"), "<b> \u{201c}c\u{201d}");
    }

    #[test]
    fn test_unescape_leaves_plain_text() {
        assert_eq!(unescape_html("a & b"), "a & b");
        assert_eq!(unescape_html("current_user_can"), "current_user_can");
    }

    #[test]
    fn test_escape_html() {
        let raw = r#"[if php="1<2 && 'a'"]"#;
        let escaped = escape_html(raw);
        assert!(escaped.starts_with("[if php=&quot;1&lt;2 &amp;&amp; "));
        assert!(!escaped.contains(['"', '\'', '<', '>']));
        assert_eq!(unescape_html(&escaped), raw);
    }

    #[test]
    fn test_html_trim() {
        assert_eq!(html_trim("\n<br />  Hello <b>world</b><br>\n"), "Hello <b>world</b>");
        assert_eq!(html_trim("</p>\n<p>Para</p>\n<p>"), "Para");
        assert_eq!(html_trim("&nbsp; x &nbsp;"), "x");
        assert_eq!(html_trim("<BR/>"), "");
        assert_eq!(html_trim("keep <br> inside"), "keep <br> inside");
    }
}
