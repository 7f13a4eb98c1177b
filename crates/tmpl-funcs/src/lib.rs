//! # tmpl-funcs - Function namespaces for templates
//!
//! A namespace is a named group of related callables exposed to templates.
//! Each namespace is constructed once at startup and hands out a fixed list of
//! `(function name, callable)` pairs; it owns no render state.
//!
//! The dispatcher in `tmpl-dispatch` merges every namespace into one flat
//! function registry, so names must be unique across all namespaces that end up
//! in the same registry.
//!
//! ## Shipped Namespaces
//!
//! | Namespace | Functions |
//! |-----------|-----------|
//! | [`StringsNamespace`] | `upper`, `lower`, `trim`, `title`, `truncate`, `slugify`, `display_width`, `replace` |
//! | [`MathNamespace`] | `add`, `sub`, `mul`, `div`, `modulo` |
//! | [`SafeNamespace`] | `safe_html`, `html_escape` |
//! | [`EncodingNamespace`] | `base64_encode`, `base64_decode`, `jsonify` |
//! | [`CryptoNamespace`] | `sha256` |
//!
//! ## Example
//!
//! ```rust
//! use minijinja::Environment;
//! use tmpl_funcs::{Namespace, StringsNamespace};
//!
//! let mut env = Environment::new();
//! for (name, callable) in StringsNamespace::new().functions() {
//!     env.add_global(name, callable);
//! }
//!
//! let output = env.render_str("{{ slugify('Hello World') }}", ()).unwrap();
//! assert_eq!(output, "hello-world");
//! ```

mod crypto;
mod encoding;
mod math;
mod safe;
mod strings;

pub use crypto::CryptoNamespace;
pub use encoding::EncodingNamespace;
pub use math::MathNamespace;
pub use safe::SafeNamespace;
pub use strings::StringsNamespace;

use minijinja::Value;

/// A named provider of template callables.
///
/// Implementations return the same set of functions on every call. The
/// callables are `minijinja` function values (see [`Value::from_function`]).
pub trait Namespace: Send + Sync {
    /// The registration name, used when reporting name collisions.
    fn name(&self) -> &'static str;

    /// The functions this namespace exposes, in a stable order.
    fn functions(&self) -> Vec<(&'static str, Value)>;
}

/// Constructs every shipped namespace, in registration order.
pub fn default_namespaces() -> Vec<Box<dyn Namespace>> {
    vec![
        Box::new(StringsNamespace::new()),
        Box::new(MathNamespace::new()),
        Box::new(SafeNamespace::new()),
        Box::new(EncodingNamespace::new()),
        Box::new(CryptoNamespace::new()),
    ]
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_default_namespace_names_are_unique() {
        let namespaces = default_namespaces();
        let names: HashSet<_> = namespaces.iter().map(|ns| ns.name()).collect();
        assert_eq!(names.len(), namespaces.len());
    }

    #[test]
    fn test_default_function_names_are_unique() {
        let mut seen = HashSet::new();
        for ns in default_namespaces() {
            for (name, _) in ns.functions() {
                assert!(seen.insert(name), "function `{}` registered twice", name);
            }
        }
        assert!(seen.contains("upper"));
        assert!(seen.contains("sha256"));
    }
}
