//! Debug output
//!
//! The verbose block shows the tag as written, its normalized attributes and
//! the compiled condition. The error block lists everything that went wrong
//! with one invocation.

use crate::invocation::ShortcodeInvocation;
use ifsc_parser::escape_html;
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").expect("valid code span pattern"));

const ERROR_COLORS: &str = "background:#b30000; color:#FFFFFF;";
const ERROR_LI_FIRST: &str = r#"<li style="background:inherit; color:inherit; margin:0; padding:0;">"#;
const ERROR_LI: &str = r#"<li style="background:inherit; color:inherit; margin:1em 0 0 0; padding:0;">"#;

/// Verbose diagnostic block
pub fn verbose_block(name: &str, invocation: &ShortcodeInvocation) -> String {
    let name = escape_html(name);
    format!(
        concat!(
            r#"<pre style="padding:1em; border-radius:.25em; max-width:100%; overflow:auto;">"#,
            "<code>[{name}]</code> Shortcode Verbose<br />{tag}<br /><br />",
            "<code>[{name}]</code> Shortcode Atts<br />{atts}<br /><br />",
            "<code>[{name}]</code> Shortcode Conditions<br />{conditions}",
            "</pre>"
        ),
        name = name,
        tag = escape_html(&invocation.recreate()),
        atts = escape_html(&invocation.attributes_json()),
        conditions = escape_html(&invocation.condition_text()),
    )
}

/// Styled error block with the reconstructed tag and every message
pub fn error_block(name: &str, invocation: &ShortcodeInvocation) -> String {
    let errors = invocation.errors();
    let heading = if errors.len() == 1 {
        "Shortcode Error"
    } else {
        "Shortcode Errors"
    };
    let items = errors
        .iter()
        .map(|e| code_spans(&e.to_string()))
        .collect::<Vec<_>>()
        .join(&format!("</li>{}", ERROR_LI));

    format!(
        concat!(
            r#"<div style="{colors} padding:1em; border-radius:.25em;">"#,
            r#"<h4 style="background:inherit; color:inherit; margin:0 0 .5em 0; padding:0 0 .5em 0; line-height:1em; border-bottom:1px solid;">"#,
            "<code>[{name}]</code> {heading}",
            "</h4>",
            r#"<pre style="padding:1em; margin:0 0 .5em 0; border-radius:.25em; max-width:100%; overflow:auto;">"#,
            "{tag}",
            "</pre>",
            r#"<ul style="margin:0 0 0 2em; padding:0; background:inherit; color:inherit;">"#,
            "{li_first}{items}</li>",
            "</ul>",
            "</div>"
        ),
        colors = ERROR_COLORS,
        name = escape_html(name),
        heading = heading,
        tag = escape_html(&invocation.recreate()),
        li_first = ERROR_LI_FIRST,
        items = items,
    )
}

/// Escape a message and render backtick spans as `<code>`
pub fn code_spans(message: &str) -> String {
    CODE_SPAN
        .replace_all(&escape_html(message), "<code>$1</code>")
        .into_owned()
}
