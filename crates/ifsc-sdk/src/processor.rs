//! Content rendering pass
//!
//! Expands every registered tag in a piece of content. The branch chosen by
//! a tag is rendered again, which is how nested `[_if]` tags resolve.

use crate::shortcode::IfShortcode;
use ifsc_parser::{Segment, TagScanner};
use ifsc_runtime::Visitor;
use once_cell::unsync::OnceCell;

pub struct ShortcodeProcessor {
    shortcode: IfShortcode,
    scanner: OnceCell<TagScanner>,
}

impl ShortcodeProcessor {
    pub fn new(shortcode: IfShortcode) -> Self {
        Self {
            shortcode,
            scanner: OnceCell::new(),
        }
    }

    pub fn shortcode(&self) -> &IfShortcode {
        &self.shortcode
    }

    fn scanner(&self) -> &TagScanner {
        self.scanner
            .get_or_init(|| TagScanner::new(self.shortcode.tag_names()))
    }

    /// Render `content` for `visitor`
    pub fn render(&self, content: &str, visitor: &dyn Visitor) -> String {
        let mut out = String::with_capacity(content.len());

        for segment in self.scanner().scan(content) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Tag(tag) => {
                    let rendered = self
                        .shortcode
                        .on_shortcode(&tag, visitor, &|branch| self.render(branch, visitor));
                    out.push_str(&rendered);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShortcodeOptions;
    use ifsc_runtime::MemoryVisitor;

    #[test]
    fn test_text_passes_through() {
        let processor = ShortcodeProcessor::new(IfShortcode::new(ShortcodeOptions::default()));
        let visitor = MemoryVisitor::anonymous();
        assert_eq!(processor.render("plain [b]text[/b]", &visitor), "plain [b]text[/b]");
    }

    #[test]
    fn test_custom_tag_names() {
        let options = ShortcodeOptions {
            name: "when".to_string(),
            else_name: "otherwise".to_string(),
            ..ShortcodeOptions::default()
        };
        let processor = ShortcodeProcessor::new(IfShortcode::new(options));
        let visitor = MemoryVisitor::logged_in(1);
        assert_eq!(
            processor.render(
                r#"[when current_user_is_logged_in="true"]in[otherwise]out[/when]"#,
                &visitor
            ),
            "in"
        );
    }
}
