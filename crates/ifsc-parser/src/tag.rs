//! Shortcode tag scanner
//!
//! Splits content into plain text and registered tags. A tag is either
//! enclosing (`[if a]body[/if]`), self-closing (`[if a /]`) or unclosed
//! (`[if a]` with no matching `[/if]`). The body of an enclosing tag ends at
//! the first `[/name]`, so nested tags of the same name are not supported;
//! authors nest by adding leading underscores instead.
//!
//! `[[if]]` escapes a tag and yields its text without the outer brackets.

use crate::attributes::{parse_attributes, RawAttributes};

/// A tag found by the scanner
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcodeTag {
    pub name: String,
    pub attributes: RawAttributes,
    /// `None` for self-closing and unclosed tags
    pub content: Option<String>,
}

impl ShortcodeTag {
    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// A piece of scanned content
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    Text(&'a str),
    Tag(ShortcodeTag),
}

/// Scans content for a fixed set of tag names
pub struct TagScanner {
    names: Vec<String>,
}

impl TagScanner {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn is_registered(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Split `content` into segments
    pub fn scan<'a>(&self, content: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut text_start = 0;
        let mut pos = 0;

        while let Some(offset) = content[pos..].find('[') {
            let open = pos + offset;
            match self.match_tag(content, open) {
                Some(found) => {
                    if text_start < open {
                        segments.push(Segment::Text(&content[text_start..open]));
                    }
                    segments.extend(found.segments);
                    pos = found.end;
                    text_start = found.end;
                }
                None => pos = open + 1,
            }
        }

        if text_start < content.len() {
            segments.push(Segment::Text(&content[text_start..]));
        }
        segments
    }

    fn match_tag<'a>(&self, content: &'a str, open: usize) -> Option<TagMatch<'a>> {
        let bytes = content.as_bytes();
        let leading_escape = bytes.get(open + 1) == Some(&b'[');
        let name_start = open + 1 + usize::from(leading_escape);

        let name_len = content[name_start..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(content.len() - name_start);
        let name = &content[name_start..name_start + name_len];
        if name.is_empty() || !self.is_registered(name) {
            return None;
        }

        let after_name = name_start + name_len;
        let close_bracket = after_name + content[after_name..].find(']')?;
        let mut attr_text = &content[after_name..close_bracket];
        let self_closing = attr_text.trim_end().ends_with('/');
        if self_closing {
            attr_text = attr_text.trim_end().trim_end_matches('/');
        }

        let mut end = close_bracket + 1;
        let mut body = None;
        if !self_closing {
            let closing = format!("[/{}]", name);
            if let Some(idx) = content[end..].find(&closing) {
                body = Some(content[end..end + idx].to_string());
                end += idx + closing.len();
            }
        }

        let trailing_escape = leading_escape && bytes.get(end) == Some(&b']');
        if trailing_escape {
            return Some(TagMatch {
                segments: vec![Segment::Text(&content[open + 1..end])],
                end: end + 1,
            });
        }

        let mut segments = Vec::with_capacity(2);
        if leading_escape {
            segments.push(Segment::Text(&content[open..open + 1]));
        }
        segments.push(Segment::Tag(ShortcodeTag {
            name: name.to_string(),
            attributes: parse_attributes(attr_text),
            content: body,
        }));

        Some(TagMatch { segments, end })
    }
}

struct TagMatch<'a> {
    segments: Vec<Segment<'a>>,
    end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> TagScanner {
        TagScanner::new(["if", "_if"])
    }

    fn tag<'s>(segment: &'s Segment<'_>) -> &'s ShortcodeTag {
        match segment {
            Segment::Tag(tag) => tag,
            other => panic!("Expected tag, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_enclosing_tag() {
        let segments = scanner().scan(r#"before [if current_user_can="edit_posts"]A[else]B[/if] after"#);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Text("before "));
        let t = tag(&segments[1]);
        assert_eq!(t.name, "if");
        assert_eq!(t.attributes.get("current_user_can"), Some("edit_posts"));
        assert_eq!(t.content.as_deref(), Some("A[else]B"));
        assert_eq!(segments[2], Segment::Text(" after"));
    }

    #[test]
    fn test_scan_nested_depths() {
        let segments = scanner().scan("[if a=\"1\"]x[_if b=\"2\"]y[/_if]z[/if]");
        assert_eq!(segments.len(), 1);
        assert_eq!(tag(&segments[0]).content.as_deref(), Some("x[_if b=\"2\"]y[/_if]z"));
    }

    #[test]
    fn test_scan_self_closing_and_unclosed() {
        let segments = scanner().scan("[if a=\"1\" /] tail");
        let t = tag(&segments[0]);
        assert_eq!(t.content, None);
        assert_eq!(t.attributes.get("a"), Some("1"));
        assert_eq!(segments[1], Segment::Text(" tail"));

        let segments = scanner().scan("[if a=\"1\"] never closed");
        assert_eq!(tag(&segments[0]).content, None);
        assert_eq!(segments[1], Segment::Text(" never closed"));
    }

    #[test]
    fn test_scan_ignores_unregistered_and_prefixes() {
        let segments = scanner().scan("[iffy]x[/iffy] [else] [__if]");
        assert_eq!(segments, vec![Segment::Text("[iffy]x[/iffy] [else] [__if]")]);
    }

    #[test]
    fn test_scan_escaped_tag() {
        let segments = scanner().scan("show [[if a=\"1\"]x[/if]] literally");
        assert_eq!(
            segments,
            vec![
                Segment::Text("show "),
                Segment::Text("[if a=\"1\"]x[/if]"),
                Segment::Text(" literally"),
            ]
        );
    }

    #[test]
    fn test_scan_half_escaped_keeps_bracket() {
        let segments = scanner().scan("[[if a=\"1\"]x[/if]");
        assert_eq!(segments[0], Segment::Text("["));
        assert_eq!(tag(&segments[1]).content.as_deref(), Some("x"));
    }
}
