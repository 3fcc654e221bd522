//! HTML and text helper functions

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Collapse whitespace runs into single spaces and trim the ends
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}

/// Build an excerpt from plain text: whitespace collapsed, then cut to
/// `max_chars` characters with `...` appended when anything was cut
///
/// # Examples
/// ```ignore
/// excerpt("Hello   brave\nnew world", 11) // -> "Hello brave..."
/// ```
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = collapse_whitespace(text);

    if text.chars().count() <= max_chars {
        text
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// Display form of a profile link: the URL without its scheme
///
/// # Examples
/// ```ignore
/// display_url("https://github.com/ada") // -> "github.com/ada"
/// ```
pub fn display_url(url: &str) -> String {
    match url.split_once("//") {
        Some((_, rest)) => rest.trim_end_matches('/').to_string(),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("Hello   brave\nnew world", 11), "Hello brave...");
        assert_eq!(excerpt("  short  ", 100), "short");
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        assert_eq!(excerpt("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_display_url() {
        assert_eq!(display_url("https://www.linkedin.com/in/ada/"), "www.linkedin.com/in/ada");
        assert_eq!(display_url("github.com/ada"), "github.com/ada");
    }
}
