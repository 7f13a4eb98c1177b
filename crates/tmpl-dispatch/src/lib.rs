//! # tmpl-dispatch - Template function dispatch and partial resolution
//!
//! `tmpl-dispatch` assembles template function namespaces into one flat
//! registry, installs it into a `minijinja` template store, and resolves
//! partials: named sub-templates called from other templates.
//!
//! ## Core Concepts
//!
//! - [`FunctionRegistry`]: collision-free name → callable map, built once
//! - [`TemplateStore`]: compiled templates tagged with an [`EngineKind`]
//! - [`PartialResolver`]: name normalization, ordered lookup, execution into a
//!   pooled buffer, and output typing
//! - [`RenderOutput`]: plain text or safe markup, so composition neither
//!   double-escapes nor leaks raw markup
//! - [`Dispatcher`]: owns all of the above
//!
//! ## Quick Start
//!
//! ```rust
//! use tmpl_dispatch::Dispatcher;
//!
//! let mut dispatcher = Dispatcher::with_defaults().unwrap();
//! dispatcher
//!     .add_template("partials/title", "<h1>{{ upper(this) }}</h1>")
//!     .unwrap();
//! dispatcher
//!     .add_template("page", r#"{{ partial("title", name) }}<p>{{ body }}</p>"#)
//!     .unwrap();
//!
//! let out = dispatcher
//!     .render("page", minijinja::context! { name => "home", body => "a < b" })
//!     .unwrap();
//! assert_eq!(out.as_str(), "<h1>HOME</h1><p>a &lt; b</p>");
//! ```
//!
//! ## Two Engines
//!
//! Templates added with [`EngineKind::Escaping`] auto-escape HTML and produce
//! markup; templates added with [`EngineKind::Plain`] do not escape and
//! produce plain text. A plain partial embedded in an escaping parent is
//! escaped by the parent; an escaping partial is emitted verbatim.
//!
//! ## Partials
//!
//! See [`partial`] for the lookup order and caching rules. Failures come back
//! as [`DispatchError`]; a missing partial reads `Partial "<name>" not found`.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`debug` for registry construction and
//! resolved partials, `trace` for candidate misses and cache hits) and never
//! installs a subscriber.

pub mod config;
pub mod dispatcher;
mod error;
pub mod partial;
pub mod pool;
pub mod registry;
pub mod template;

pub use config::{CacheConfig, DispatchConfig, PoolConfig};
pub use dispatcher::{Dispatcher, DISPATCH_SOURCE};
pub use error::{ConfigError, DispatchError, Result};
pub use partial::{CacheKey, PartialCache, PartialPaths, PartialResolver};
pub use pool::{BufferPool, PooledBuffer};
pub use registry::{FunctionRegistry, FunctionRegistryBuilder};
pub use template::{
    CompiledTemplate, EngineKind, EngineKinds, EnvLookup, RenderOutput, TemplateLookup,
    TemplateStore,
};

// Namespaces are part of the public surface of the registry.
pub use tmpl_funcs::{default_namespaces, Namespace};
