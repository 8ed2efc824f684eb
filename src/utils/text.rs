//! Text helpers for search and derived display fields.
//!
//! SQLite's `LIKE` only folds ASCII case, so names and titles are stored next to
//! a normalized copy and searched through it:
//! - Convert to lowercase
//! - Remove accents/diacritics (é → e, ü → u, etc.)
//! - Normalize whitespace

use scraper::Html;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for accent- and case-insensitive matching.
///
/// # Examples
///
/// ```
/// use confadmin::utils::normalize_search;
///
/// assert_eq!(normalize_search("José García"), "jose garcia");
/// assert_eq!(normalize_search("  Intro   to Rust "), "intro to rust");
/// ```
pub fn normalize_search(text: &str) -> String {
    replace_special_chars(text)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Characters that are distinct letters rather than accented forms, so NFD
/// leaves them alone.
fn replace_special_chars(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'Ł' => 'L',
            'ł' => 'l',
            'Ø' => 'O',
            'ø' => 'o',
            'Æ' => 'A',
            'æ' => 'a',
            'ß' => 's',
            'Ð' | 'Đ' => 'D',
            'ð' | 'đ' => 'd',
            'Þ' => 'T',
            'þ' => 't',
            'İ' => 'I',
            'ı' => 'i',
            _ => c,
        })
        .collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |
        '\u{1AB0}'..='\u{1AFF}' |
        '\u{1DC0}'..='\u{1DFF}' |
        '\u{20D0}'..='\u{20FF}' |
        '\u{FE20}'..='\u{FE2F}'
    )
}

/// Build a `LIKE ... ESCAPE '\'` pattern matching `term` anywhere.
///
/// ```
/// use confadmin::utils::like_pattern;
///
/// assert_eq!(like_pattern("Intro"), "%intro%");
/// assert_eq!(like_pattern("100%"), "%100\\%%");
/// ```
pub fn like_pattern(term: &str) -> String {
    let normalized = normalize_search(term);
    let mut pattern = String::with_capacity(normalized.len() + 2);
    pattern.push('%');
    for c in normalized.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Text content of rich text editor HTML. Entities are decoded once and
/// attribute values are dropped. Text nodes are joined with a space.
pub fn strip_tags(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `limit` words of `text` (tags stripped), with `...` when truncated.
///
/// ```
/// use confadmin::utils::excerpt_words;
///
/// assert_eq!(excerpt_words("<p>one two three</p>", 2), "one two...");
/// assert_eq!(excerpt_words("one two", 8), "one two");
/// ```
pub fn excerpt_words(text: &str, limit: usize) -> String {
    let plain = strip_tags(text);
    let words: Vec<&str> = plain.split_whitespace().collect();
    if words.len() <= limit {
        words.join(" ")
    } else {
        format!("{}...", words[..limit].join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_search("Alice"), "alice");
        assert_eq!(normalize_search("ALICE"), "alice");
        assert_eq!(normalize_search("  alice  "), "alice");
    }

    #[test]
    fn test_normalize_accents() {
        assert_eq!(normalize_search("José"), "jose");
        assert_eq!(normalize_search("Müller"), "muller");
        assert_eq!(normalize_search("Schrödinger"), "schrodinger");
        assert_eq!(normalize_search("Łukasz"), "lukasz");
        assert_eq!(normalize_search("Øresund"), "oresund");
        assert_eq!(normalize_search("Nguyễn"), "nguyen");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("C:\\"), "%c:\\\\%");
        assert_eq!(like_pattern("Café"), "%cafe%");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            normalize_search(&strip_tags("<p>Hello <strong>world</strong></p>")),
            "hello world"
        );
        assert_eq!(strip_tags("a &amp; b"), "a & b");
    }

    #[test]
    fn test_strip_tags_ignores_attribute_values() {
        let html = r#"<p><a href="https://x.io/?a>b">Hello</a> world</p>"#;
        assert_eq!(excerpt_words(html, 8), "Hello world");
    }

    #[test]
    fn test_strip_tags_decodes_entities_once() {
        assert_eq!(excerpt_words("<p>use &amp;lt;br&amp;gt; tags</p>", 8), "use &lt;br&gt; tags");
        assert_eq!(excerpt_words("<p>It&#8217;s fine</p>", 8), "It\u{2019}s fine");
        assert_eq!(excerpt_words("<p>one&nbsp;two</p>", 8), "one two");
    }

    #[test]
    fn test_excerpt_words() {
        let abstract_text =
            "<p>Rust ownership explained through real world examples from production systems</p>";
        assert_eq!(
            excerpt_words(abstract_text, 8),
            "Rust ownership explained through real world examples from..."
        );
        assert_eq!(excerpt_words("", 8), "");
        assert_eq!(
            excerpt_words("exactly eight words are written in this line", 8),
            "exactly eight words are written in this line"
        );
    }
}
