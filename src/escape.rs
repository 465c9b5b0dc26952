//! Text escaping for the markup and RTF encoders.
//!
//! Every title, author, description, and chapter field that lands inside an
//! HTML, XHTML, or XML document goes through [`escape_markup`]; everything
//! embedded in an RTF control stream goes through [`escape_rtf`]. Both are
//! pure functions over the input string.

/// Escape text for embedding in HTML/XHTML/XML element content or attributes.
///
/// Replaces `< > & ' "` with their named entities.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for embedding in an RTF control stream.
///
/// Backslash and braces get a backslash prefix, every newline becomes a
/// `\par ` paragraph break, and any character above U+007F is emitted as a
/// decimal `\uNNNN?` escape. There is no surrogate-pair handling: codepoints
/// above U+FFFF produce an out-of-range value that readers render as the
/// fallback `?`. Known limitation, kept for output compatibility.
pub fn escape_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\par "),
            c if (c as u32) > 0x7F => {
                out.push_str(&format!("\\u{}?", c as u32));
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Inverse of `escape_markup`, used to check the round-trip property.
    fn unescape_markup(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&apos;", "'")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_escape_markup_entities() {
        assert_eq!(
            escape_markup(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_markup_passthrough() {
        assert_eq!(escape_markup("plain text, ünïcödé"), "plain text, ünïcödé");
    }

    #[test]
    fn test_escape_rtf_control_chars() {
        assert_eq!(escape_rtf(r"a\b"), r"a\\b");
        assert_eq!(escape_rtf("{x}"), r"\{x\}");
        assert_eq!(escape_rtf("a\nb"), r"a\par b");
    }

    #[test]
    fn test_escape_rtf_unicode() {
        // é = U+00E9 = 233
        assert_eq!(escape_rtf("é"), "\\u233?");
        // 你 = U+4F60 = 20320
        assert_eq!(escape_rtf("你"), "\\u20320?");
    }

    #[test]
    fn test_escape_rtf_ascii_untouched() {
        assert_eq!(escape_rtf("Chapter 1: The Start"), "Chapter 1: The Start");
    }

    proptest! {
        #[test]
        fn prop_escape_markup_round_trips(s in "[ -~]{0,64}") {
            prop_assert_eq!(unescape_markup(&escape_markup(&s)), s);
        }

        #[test]
        fn prop_escape_markup_output_has_no_raw_specials(s in ".{0,64}") {
            let escaped = escape_markup(&s);
            // The only '&' left are the ones starting entities; no raw
            // angle brackets or quotes survive.
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
        }
    }
}
