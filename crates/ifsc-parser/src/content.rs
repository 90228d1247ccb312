//! Nesting depth and `[else]` splitting

use crate::html::html_trim;

/// Deepest supported nesting level (`____if`)
pub const MAX_DEPTH: usize = 4;

/// Number of leading underscores on a tag name
pub fn depth_of(tag: &str) -> usize {
    tag.chars().take_while(|&c| c == '_').count()
}

/// Tag name for a nesting level, e.g. `tag_at_depth("if", 2) == "__if"`
pub fn tag_at_depth(name: &str, depth: usize) -> String {
    format!("{}{}", "_".repeat(depth), name)
}

/// All tag names from depth 0 to [`MAX_DEPTH`]
pub fn tag_names(name: &str) -> Vec<String> {
    (0..=MAX_DEPTH).map(|d| tag_at_depth(name, d)).collect()
}

/// The `[else]` marker for a nesting level
pub fn else_marker(else_name: &str, depth: usize) -> String {
    format!("[{}]", tag_at_depth(else_name, depth))
}

/// Split a tag body at the first else marker of exactly `depth`.
///
/// Both sides are HTML-trimmed. Markers of other depths stay in place for
/// the nested render pass.
pub fn split_else(content: &str, else_name: &str, depth: usize) -> (String, String) {
    let marker = else_marker(else_name, depth);
    let (content_if, content_else) = match content.find(&marker) {
        Some(idx) => (&content[..idx], &content[idx + marker.len()..]),
        None => (content, ""),
    };
    (html_trim(content_if), html_trim(content_else))
}
