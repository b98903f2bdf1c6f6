use std::sync::LazyLock;

use regex::Regex;

/// Input beyond this many characters is dropped before normalizing.
pub const MAX_NORMALIZED_INPUT_CHARS: usize = 10_000;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex"));
static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//[^\r\n]*").expect("line comment regex"));
// Also eats `#` inside string literals and preprocessor lines; kept for
// score compatibility.
static HASH_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[^\r\n]*").expect("hash comment regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[{}();,]").expect("punctuation regex"));

/// Canonicalizes source text for comparison.
///
/// Only the first [`MAX_NORMALIZED_INPUT_CHARS`] characters are considered.
/// Comments are removed before whitespace is collapsed and before
/// punctuation is stripped, so `/*`, `//` and `#` are matched on the
/// original text.
pub fn normalize(content: &str) -> String {
    let head = truncate_chars(content, MAX_NORMALIZED_INPUT_CHARS);

    let text = BLOCK_COMMENT.replace_all(head, "");
    let text = LINE_COMMENT.replace_all(&text, "");
    let text = HASH_COMMENT.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = PUNCTUATION.replace_all(&text, "");

    text.to_lowercase().trim().to_string()
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub(crate) fn exceeds_chars(text: &str, max_chars: usize) -> bool {
    // Every char is at least one byte.
    text.len() > max_chars && text.chars().count() > max_chars
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_block_comments_across_lines() {
        let input = "int a; /* first\n second */ int b;";
        assert_eq!(normalize(input), "int a int b");
    }

    #[test]
    fn block_comments_are_non_greedy() {
        let input = "a /* x */ keep /* y */ b";
        assert_eq!(normalize(input), "a keep b");
    }

    #[test]
    fn strips_line_and_hash_comments() {
        let input = "let x = 1; // trailing\n# python comment\ny = 2  # more\n";
        assert_eq!(normalize(input), "let x = 1 y = 2");
    }

    #[test]
    fn hash_inside_string_truncates_line() {
        assert_eq!(normalize("color = \"#fff\"\nnext"), "color = \" next");
    }

    #[test]
    fn collapses_whitespace_removes_punctuation_and_lowercases() {
        let input = "  fn Main() {\n\tPrintln!(\"Hi\", X);\n}\n";
        assert_eq!(normalize(input), "fn main  println!\"hi\" x");
    }

    #[test]
    fn punctuation_is_stripped_after_whitespace_collapse() {
        assert_eq!(normalize("f ( x )"), "f  x");
    }

    #[test]
    fn empty_and_comment_only_inputs_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("// only\n/* and */\n# this"), "");
    }

    #[test]
    fn truncates_to_prefix_before_processing() {
        let mut input = "a".repeat(MAX_NORMALIZED_INPUT_CHARS);
        input.push_str("BBBB");
        assert_eq!(normalize(&input), "a".repeat(MAX_NORMALIZED_INPUT_CHARS));
    }

    #[test]
    fn truncation_cuts_on_char_boundaries() {
        let input = "é".repeat(MAX_NORMALIZED_INPUT_CHARS + 5);
        let out = normalize(&input);
        assert_eq!(out.chars().count(), MAX_NORMALIZED_INPUT_CHARS);
    }

    #[test]
    fn unterminated_block_comment_is_left_alone() {
        assert_eq!(normalize("a /* never closed"), "a /* never closed");
    }

    #[test]
    fn exceeds_chars_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert!(!exceeds_chars(&text, 10));
        assert!(exceeds_chars(&text, 9));
    }

    #[test]
    fn idempotent_on_typical_source() {
        let input = r#"
            /* License header */
            import os  # stdlib
            def Main(argv):
                // weird mix
                return [x for x in argv if x]
        "#;
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }

    proptest! {
        #[test]
        fn idempotent_on_identifier_soup(input in "[a-zA-Z0-9 _=+\\-\n\t.]{0,200}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn output_never_has_stripped_punctuation(input in "\\PC{0,200}") {
            let out = normalize(&input);
            let has_punct = out.contains(['{', '}', '(', ')', ';', ',']);
            prop_assert!(!has_punct);
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
