//! Markdown body extraction / Markdown 正文提取
//!
//! Plain text for the index and an HTML summary for result listings.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Parser, TagEnd};
use regex::Regex;

use crate::utils::{collapse_whitespace, escape_html};

/// Marker separating a hand-written summary from the rest of a page / 摘要分隔符
pub const MORE_MARKER: &str = "<!--more-->";

/// Words in an automatic summary / 自动摘要词数
pub const SUMMARY_WORDS: usize = 70;

static SHORTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{\{[<%].*?[%>]\}\}").expect("static shortcode pattern")
});

/// Remove `{{< … >}}` and `{{% … %}}` tags, keeping their inner content / 去除短代码
pub fn strip_shortcodes(markdown: &str) -> String {
    SHORTCODE.replace_all(markdown, "").into_owned()
}

/// Render Markdown to plain text / Markdown 转纯文本
pub fn to_plain_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote
                | TagEnd::TableRow,
            ) => text.push_str("\n\n"),
            Event::End(TagEnd::TableCell) => text.push(' '),
            _ => {}
        }
    }

    collapse_whitespace(&text)
}

/// Render Markdown to an HTML fragment / Markdown 转 HTML
pub fn to_html(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(markdown));
    out.trim_end().to_string()
}

/// Page summary as HTML / 页面摘要
///
/// Order: explicit summary, content before [`MORE_MARKER`], first
/// [`SUMMARY_WORDS`] words of the plain text.
pub fn summary(markdown: &str, explicit: Option<&str>) -> String {
    if let Some(explicit) = explicit {
        return to_html(explicit);
    }
    if let Some((before, _)) = markdown.split_once(MORE_MARKER) {
        return to_html(before);
    }

    let text = to_plain_text(markdown);
    let words: Vec<&str> = text.split_whitespace().take(SUMMARY_WORDS).collect();
    escape_html(&words.join(" "))
}
