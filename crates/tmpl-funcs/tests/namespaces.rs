//! Integration tests for the shipped namespaces, exercised through a real
//! minijinja environment the way the dispatcher installs them.

use minijinja::{context, Environment};
use proptest::prelude::*;
use tmpl_funcs::{default_namespaces, Namespace, StringsNamespace};

fn env_with_defaults() -> Environment<'static> {
    let mut env = Environment::new();
    for ns in default_namespaces() {
        for (name, callable) in ns.functions() {
            env.add_global(name, callable);
        }
    }
    env
}

#[test]
fn functions_compose_across_namespaces() {
    let env = env_with_defaults();
    let out = env
        .render_str(
            "{{ upper(base64_decode(base64_encode(name))) }}:{{ add(count, 1) }}",
            context! { name => "widget", count => 41 },
        )
        .unwrap();
    assert_eq!(out, "WIDGET:42");
}

#[test]
fn jsonify_serializes_context_values() {
    let env = env_with_defaults();
    let out = env
        .render_str("{{ jsonify(item) }}", context! { item => context! { id => 7 } })
        .unwrap();
    assert_eq!(out, r#"{"id":7}"#);
}

#[test]
fn namespace_reports_its_name() {
    assert_eq!(StringsNamespace::new().name(), "strings");
}

proptest! {
    #[test]
    fn slugify_yields_dash_separated_lowercase_ascii(input in "\\PC{0,40}") {
        let env = env_with_defaults();
        let slug = env
            .render_str("{{ slugify(s) }}", context! { s => input })
            .unwrap();
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }

    #[test]
    fn truncate_never_exceeds_width(input in "[a-zA-Z0-9 日本語テキスト]{0,40}", width in 0usize..20) {
        let env = env_with_defaults();
        let out = env
            .render_str("{{ truncate(s, w) }}", context! { s => input, w => width })
            .unwrap();
        let measured = env
            .render_str("{{ display_width(s) }}", context! { s => out })
            .unwrap();
        prop_assert!(measured.parse::<usize>().unwrap() <= width);
    }
}
