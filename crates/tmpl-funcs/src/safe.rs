//! Markup-safety helpers.
//!
//! A safe string is emitted verbatim by escaping templates; a plain string is
//! escaped on output.

use minijinja::Value;

use crate::Namespace;

/// The `safe` namespace.
#[derive(Debug, Clone, Default)]
pub struct SafeNamespace;

impl SafeNamespace {
    pub fn new() -> Self {
        Self
    }
}

impl Namespace for SafeNamespace {
    fn name(&self) -> &'static str {
        "safe"
    }

    fn functions(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("safe_html", Value::from_function(Value::from_safe_string)),
            (
                "html_escape",
                Value::from_function(|s: String| Value::from_safe_string(escape_html(&s))),
            ),
        ]
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
