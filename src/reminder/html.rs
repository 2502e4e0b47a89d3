//! Markdown → HTML conversion for the HTML alternative of emailed digests.

use pulldown_cmark::{Event, Options, Parser};

/// Render markdown text to HTML via `pulldown_cmark`.
///
/// Raw HTML in the input is emitted as escaped text; task descriptions are
/// user data, not markup.
pub fn render_markdown_html(content: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(content, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html_output = String::with_capacity(content.len() * 2);
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_digest_sections() {
        let html = render_markdown_html("## Due today\n\n- Pay rent\n- Call mum\n\n");
        assert!(html.contains("<h2>Due today</h2>"));
        assert!(html.contains("<li>Pay rent</li>"));
        assert!(html.contains("<li>Call mum</li>"));
    }

    #[test]
    fn escapes_html_in_descriptions() {
        let html = render_markdown_html("- fix <script> tag\n");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert!(render_markdown_html("").is_empty());
    }
}
