//! HTML escaping for user-supplied text placed into email bodies.

/// Escape the five characters that are significant in HTML text and
/// attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape `text` and render its line breaks as `<br>`.
pub fn text_to_html(text: &str) -> String {
    escape_html(text)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escape_html("Hello, world"), "Hello, world");
    }

    #[test]
    fn test_text_to_html_line_breaks() {
        assert_eq!(text_to_html("one\ntwo\r\nthree"), "one<br>two<br>three");
        assert_eq!(text_to_html("<b>\n"), "&lt;b&gt;<br>");
    }
}
