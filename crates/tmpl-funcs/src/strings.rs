//! String helpers.
//!
//! Width-aware functions (`truncate`, `display_width`) measure terminal
//! columns, not bytes or chars, so CJK and emoji count as two columns.

use deunicode::deunicode;
use minijinja::Value;
use unicode_width::UnicodeWidthStr;

use crate::Namespace;

const ELLIPSIS: &str = "…";

/// The `strings` namespace.
#[derive(Debug, Clone, Default)]
pub struct StringsNamespace;

impl StringsNamespace {
    pub fn new() -> Self {
        Self
    }
}

impl Namespace for StringsNamespace {
    fn name(&self) -> &'static str {
        "strings"
    }

    fn functions(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("upper", Value::from_function(|s: String| s.to_uppercase())),
            ("lower", Value::from_function(|s: String| s.to_lowercase())),
            ("trim", Value::from_function(|s: String| s.trim().to_string())),
            ("title", Value::from_function(|s: String| title_case(&s))),
            (
                "truncate",
                Value::from_function(|s: String, width: usize| truncate(&s, width)),
            ),
            ("slugify", Value::from_function(|s: String| slugify(&s))),
            (
                "display_width",
                Value::from_function(|s: String| s.width()),
            ),
            (
                "replace",
                Value::from_function(|s: String, from: String, to: String| s.replace(&from, &to)),
            ),
        ]
    }
}

/// Uppercases the first letter of every whitespace-separated word.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Truncates `s` to at most `width` display columns, ending with an ellipsis
/// when anything was cut.
fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    // Measure the whole prefix: variation selectors and joiners change the
    // width of the preceding char.
    let budget = width - ELLIPSIS.width();
    let mut out = String::new();
    for ch in s.chars() {
        out.push(ch);
        if out.width() > budget {
            out.pop();
            break;
        }
    }
    out.push_str(ELLIPSIS);
    out
}

/// Transliterates to ASCII, lowercases, and joins alphanumeric runs with `-`.
fn slugify(s: &str) -> String {
    let ascii = deunicode(s);
    let mut slug = String::with_capacity(ascii.len());
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::render;

    #[test]
    fn test_case_functions() {
        let ns = StringsNamespace::new();
        assert_eq!(render(&ns, "{{ upper('abc') }}").unwrap(), "ABC");
        assert_eq!(render(&ns, "{{ lower('ABC') }}").unwrap(), "abc");
        assert_eq!(render(&ns, "{{ title('hello big world') }}").unwrap(), "Hello Big World");
        assert_eq!(render(&ns, "[{{ trim('  x  ') }}]").unwrap(), "[x]");
    }

    #[test]
    fn test_truncate_counts_columns() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Crème Brûlée  "), "creme-brulee");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_display_width_and_replace() {
        let ns = StringsNamespace::new();
        assert_eq!(render(&ns, "{{ display_width('日本') }}").unwrap(), "4");
        assert_eq!(render(&ns, "{{ replace('a-b-c', '-', '+') }}").unwrap(), "a+b+c");
    }

    #[test]
    fn test_wrong_arity_is_an_error() {
        let ns = StringsNamespace::new();
        assert!(render(&ns, "{{ upper() }}").is_err());
    }
}
