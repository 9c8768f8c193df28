//! Just enough of a tokenizer to pull tags and attributes out of real-world markup.
//!
//! This is not an HTML or XML parser: there is no tree, no entity decoding, no error reporting.
//! Broken markup results in fewer (or no) attributes, never in an error.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

pub struct TextCursor<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> TextCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    pub fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Look at the next character, leaving it to be read again.
    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    pub fn read(&mut self) -> Option<char> {
        self.chars.next()
    }

    pub fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    /// Consumes text up to and including `needle`, ignoring ASCII case.
    /// Returns `false` if the end was reached first.
    pub fn skip_until(&mut self, needle: &str) -> bool {
        self.skip_until_any(&[needle]).is_some()
    }

    /// Consumes text up to and including the first of `needles` to occur, ignoring ASCII case,
    /// and returns which one it was.
    ///
    /// Needles must be non-empty ASCII.
    pub fn skip_until_any<'n>(&mut self, needles: &[&'n str]) -> Option<&'n str> {
        debug_assert!(needles.iter().all(|n| !n.is_empty() && n.is_ascii()));

        let mut progress = vec![0usize; needles.len()];

        while let Some(c) = self.chars.next() {
            for (needle, matched) in needles.iter().zip(progress.iter_mut()) {
                let bytes = needle.as_bytes();

                if c.eq_ignore_ascii_case(&char::from(bytes[*matched])) {
                    *matched += 1;
                } else {
                    *matched = fallback(bytes, *matched, c);
                }

                if *matched == bytes.len() {
                    return Some(needle);
                }
            }
        }

        None
    }
}

/// After reading `needle[..matched]` and then a mismatching `c`, the length of the longest
/// needle prefix that the text read so far ends with.
fn fallback(needle: &[u8], matched: usize, c: char) -> usize {
    let Ok(c) = u8::try_from(c) else {
        return 0;
    };

    (1..=matched)
        .rev()
        .find(|&k| {
            needle[k - 1].eq_ignore_ascii_case(&c)
                && needle[..k - 1].eq_ignore_ascii_case(&needle[matched + 1 - k..matched])
        })
        .unwrap_or(0)
}

/// Attributes of a single tag. Keys are lower-cased, valueless (flag) attributes map to `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes(HashMap<String, Option<String>>);

impl Attributes {
    /// The value of an attribute, if it is present and has one.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.as_deref()
    }

    /// Whether an attribute is present at all, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses `key[=value]` pairs from just after a tag's name up to its closing `>`.
///
/// The `>` itself is left in the cursor.
///
/// # Example
///
/// ```
/// use favicon::text::{TextCursor, parse_attributes};
///
/// let mut cursor = TextCursor::new(r#" REL='icon' href=favicon.png async>"#);
/// let attributes = parse_attributes(&mut cursor);
///
/// assert_eq!(attributes.get("rel"), Some("icon"));
/// assert_eq!(attributes.get("href"), Some("favicon.png"));
/// assert!(attributes.contains("async"));
/// ```
pub fn parse_attributes(cursor: &mut TextCursor) -> Attributes {
    let mut attributes = HashMap::new();

    while cursor.peek().is_some_and(|c| c != '>') {
        let key = parse_key(cursor);
        if key.is_empty() {
            break;
        }

        let value = parse_value(cursor);
        attributes.insert(key, value);
    }

    Attributes(attributes)
}

fn parse_key(cursor: &mut TextCursor) -> String {
    cursor.skip_whitespace();

    let mut key = String::new();
    while let Some(c) = cursor.peek() {
        if c == '>' || c == '=' || c.is_whitespace() {
            break;
        }
        key.push(c);
        cursor.read();
    }

    key.to_lowercase()
}

fn parse_value(cursor: &mut TextCursor) -> Option<String> {
    cursor.skip_whitespace();
    if cursor.peek() != Some('=') {
        return None;
    }
    cursor.read();
    cursor.skip_whitespace();

    let quote = cursor.peek().filter(|c| *c == '"' || *c == '\'');
    if quote.is_some() {
        cursor.read();
    }

    let mut value = String::new();
    while let Some(c) = cursor.peek() {
        match quote {
            Some(quote) if c == quote => {
                cursor.read();
                break;
            }
            None if c == '>' || c.is_whitespace() => break,
            _ => {}
        }
        value.push(c);
        cursor.read();
    }

    Some(value)
}

#[cfg(test)]
mod test {
    use super::*;

    fn attributes_of(text: &str) -> Attributes {
        parse_attributes(&mut TextCursor::new(text))
    }

    #[test]
    fn test_skip_until_ignores_case() {
        let mut cursor = TextCursor::new("<HTML><Head>rest");
        assert!(cursor.skip_until("<html"));
        assert_eq!(cursor.skip_until_any(&["<body", "<head"]), Some("<head"));
        assert_eq!(cursor.read(), Some('>'));
    }

    #[test]
    fn test_skip_until_restarts_on_partial_match() {
        let mut cursor = TextCursor::new("<<link");
        assert_eq!(cursor.skip_until_any(&["<link"]), Some("<link"));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_skip_until_with_repeating_needle() {
        let mut cursor = TextCursor::new("aaab!");
        assert!(cursor.skip_until("aab"));
        assert_eq!(cursor.read(), Some('!'));

        let mut cursor = TextCursor::new("xABABAC-");
        assert_eq!(cursor.skip_until_any(&["abac", "zz"]), Some("abac"));
        assert_eq!(cursor.read(), Some('-'));
    }

    #[test]
    fn test_skip_until_reports_end() {
        let mut cursor = TextCursor::new("no tags here");
        assert_eq!(cursor.skip_until_any(&["<link", "<meta"]), None);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_quoted_and_unquoted_values() {
        let attributes = attributes_of(r#" rel="shortcut icon" href=favicon.png sizes='16x16'>"#);
        assert_eq!(attributes.get("rel"), Some("shortcut icon"));
        assert_eq!(attributes.get("href"), Some("favicon.png"));
        assert_eq!(attributes.get("sizes"), Some("16x16"));
        assert_eq!(attributes.len(), 3);
    }

    #[test]
    fn test_keys_are_lowercased() {
        let attributes = attributes_of(" HREF='a.png' ReL=icon>");
        assert_eq!(attributes.get("href"), Some("a.png"));
        assert_eq!(attributes.get("rel"), Some("icon"));
    }

    #[test]
    fn test_other_quote_inside_value() {
        let attributes = attributes_of(r#" href="favicon's.png">"#);
        assert_eq!(attributes.get("href"), Some("favicon's.png"));
    }

    #[test]
    fn test_flag_attribute() {
        let attributes = attributes_of(" async defer src=x.js>");
        assert!(attributes.contains("async"));
        assert_eq!(attributes.get("async"), None);
        assert_eq!(attributes.get("src"), Some("x.js"));
    }

    #[test]
    fn test_stops_at_tag_end() {
        let mut cursor = TextCursor::new(" rel=icon> <link href=other>");
        let attributes = parse_attributes(&mut cursor);
        assert_eq!(attributes.len(), 1);
        assert_eq!(cursor.peek(), Some('>'));
    }

    #[test]
    fn test_truncated_input() {
        assert!(attributes_of("").is_empty());

        let attributes = attributes_of(" rel='");
        assert_eq!(attributes.get("rel"), Some(""));

        let attributes = attributes_of(" rel=");
        assert_eq!(attributes.get("rel"), Some(""));

        let attributes = attributes_of(" href='favic");
        assert_eq!(attributes.get("href"), Some("favic"));
    }

    #[test]
    fn test_garbage_does_not_panic() {
        let attributes = attributes_of(" =x ===>");
        assert!(attributes.is_empty());

        let attributes = attributes_of(" src='/a.png' />");
        assert_eq!(attributes.get("src"), Some("/a.png"));
    }
}
