//! The dispatcher: one function registry, one template store, one resolver.
//!
//! Construction is the only phase that can fail on function names. After
//! [`Dispatcher::new`] returns, the registry is fixed and installed in the
//! store; templates are then added through `&mut self` and rendering happens
//! through `&self`, from as many threads as needed.

use std::sync::Arc;

use minijinja::Value;
use serde::Serialize;
use tmpl_funcs::{default_namespaces, Namespace};
use tracing::debug;

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::partial::PartialResolver;
use crate::registry::FunctionRegistry;
use crate::template::{EngineKind, EngineKinds, RenderOutput, TemplateStore};

/// Source name attributed to the dispatcher's own functions.
pub const DISPATCH_SOURCE: &str = "dispatch";

/// Owns the function registry, the template store it is installed in, and
/// the partial resolver.
///
/// ```rust
/// use tmpl_dispatch::{Dispatcher, EngineKind, RenderOutput};
/// use minijinja::Value;
///
/// let mut dispatcher = Dispatcher::with_defaults().unwrap();
/// dispatcher
///     .add_template_with_engine("partials/header", "<b>{{ this }}</b>", EngineKind::Escaping)
///     .unwrap();
///
/// let out = dispatcher.partial("header", Some(&Value::from("hi"))).unwrap();
/// assert_eq!(out, RenderOutput::Markup("<b>hi</b>".into()));
///
/// let err = dispatcher.partial("footer", None).unwrap_err();
/// assert_eq!(err.to_string(), r#"Partial "footer" not found"#);
/// ```
pub struct Dispatcher {
    config: DispatchConfig,
    registry: FunctionRegistry,
    resolver: Arc<PartialResolver>,
    store: TemplateStore,
}

impl Dispatcher {
    /// Builds the registry from `namespaces` plus `partial` and
    /// `partial_cached`, and installs it in a fresh store.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Config`](crate::DispatchError::Config) for an invalid
    /// config, [`DispatchError::DuplicateFunctionName`](crate::DispatchError::DuplicateFunctionName)
    /// when two sources register the same function name.
    pub fn new(config: DispatchConfig, namespaces: Vec<Box<dyn Namespace>>) -> Result<Self> {
        config.validate()?;

        let kinds = EngineKinds::new(config.default_engine);
        let resolver = Arc::new(PartialResolver::new(&config, kinds.clone()));

        let registry = FunctionRegistry::builder()
            .namespaces(namespaces.iter().map(Box::as_ref))?
            .function(DISPATCH_SOURCE, "partial", resolver.partial_function())?
            .function(
                DISPATCH_SOURCE,
                "partial_cached",
                resolver.partial_cached_function(),
            )?
            .build();

        let mut store = TemplateStore::new(kinds);
        store.install(&registry);
        debug!(
            namespaces = namespaces.len(),
            functions = registry.len(),
            "dispatcher ready"
        );

        Ok(Self {
            config,
            registry,
            resolver,
            store,
        })
    }

    /// Default config and every shipped namespace.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DispatchConfig::default(), default_namespaces())
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn resolver(&self) -> &PartialResolver {
        &self.resolver
    }

    /// Adds a template compiled by the configured default engine.
    pub fn add_template(&mut self, name: impl Into<String>, source: impl Into<String>) -> Result<()> {
        self.store.add_template(name, source)
    }

    pub fn add_template_with_engine(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        engine: EngineKind,
    ) -> Result<()> {
        self.store.add_template_with_engine(name, source, engine)
    }

    /// Renders a top-level template.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<RenderOutput> {
        self.store.render(name, ctx)
    }

    /// Calls a partial directly, outside any render.
    pub fn partial(&self, name: &str, context: Option<&Value>) -> Result<RenderOutput> {
        self.resolver.resolve(&self.store, name, context)
    }

    /// Calls a partial through the cache.
    pub fn partial_cached(
        &self,
        name: &str,
        context: Option<&Value>,
        variants: &[Value],
    ) -> Result<RenderOutput> {
        self.resolver
            .resolve_cached(&self.store, name, context, variants)
    }

    pub fn clear_cache(&self) {
        self.resolver.cache().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.resolver.cache().len()
    }
}
