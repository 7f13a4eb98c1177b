//! The partial resolver: lookup, execution, and output typing.

use std::sync::Arc;

use minijinja::{State, Value};
use tracing::{debug, trace};

use super::cache::{CacheKey, PartialCache};
use super::depth::DepthGuard;
use super::paths::PartialPaths;
use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::pool::BufferPool;
use crate::template::{CompiledTemplate, EngineKinds, EnvLookup, RenderOutput, TemplateLookup};

/// Resolves and executes partials against any [`TemplateLookup`].
///
/// One resolver serves every render thread: the paths are immutable, the
/// buffer pool hands out exclusive leases, and the cache is lock-guarded.
#[derive(Debug)]
pub struct PartialResolver {
    paths: PartialPaths,
    pool: BufferPool,
    cache: PartialCache,
    kinds: EngineKinds,
    max_depth: usize,
}

impl PartialResolver {
    /// `kinds` must be the table of the store the template functions are
    /// installed in.
    pub fn new(config: &DispatchConfig, kinds: EngineKinds) -> Self {
        Self {
            paths: PartialPaths::from_config(config),
            pool: BufferPool::new(config.pool),
            cache: PartialCache::new(config.cache),
            kinds,
            max_depth: config.max_partial_depth,
        }
    }

    pub fn paths(&self) -> &PartialPaths {
        &self.paths
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn cache(&self) -> &PartialCache {
        &self.cache
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Finds the template a partial name resolves to, without executing it.
    pub fn find<'s, L>(&self, store: &'s L, name: &str) -> Option<CompiledTemplate<'s>>
    where
        L: TemplateLookup + ?Sized,
    {
        self.locate(store, self.paths.normalize(name))
    }

    /// Resolves `name`, executes it with `context`, and types the output by
    /// engine.
    pub fn resolve<L>(&self, store: &L, name: &str, context: Option<&Value>) -> Result<RenderOutput>
    where
        L: TemplateLookup + ?Sized,
    {
        self.resolve_normalized(store, self.paths.normalize(name), context)
    }

    /// Like [`resolve`](Self::resolve), memoized on name, context, and
    /// `variants`.
    pub fn resolve_cached<L>(
        &self,
        store: &L,
        name: &str,
        context: Option<&Value>,
        variants: &[Value],
    ) -> Result<RenderOutput>
    where
        L: TemplateLookup + ?Sized,
    {
        let name = self.paths.normalize(name);
        let key = CacheKey::new(name, context, variants);
        self.cache
            .get_or_render(key, || self.resolve_normalized(store, name, context))
    }

    fn locate<'s, L>(&self, store: &'s L, name: &str) -> Option<CompiledTemplate<'s>>
    where
        L: TemplateLookup + ?Sized,
    {
        self.paths.candidates(name).find_map(|candidate| {
            let found = store.lookup(&candidate);
            if found.is_none() {
                trace!(candidate = %candidate, "partial candidate missing");
            }
            found
        })
    }

    fn resolve_normalized<L>(
        &self,
        store: &L,
        name: &str,
        context: Option<&Value>,
    ) -> Result<RenderOutput>
    where
        L: TemplateLookup + ?Sized,
    {
        let template = self
            .locate(store, name)
            .ok_or_else(|| DispatchError::PartialNotFound {
                name: name.to_string(),
            })?;
        debug!(
            partial = name,
            template = template.name(),
            engine = ?template.engine(),
            "resolved partial"
        );

        let _depth = DepthGuard::enter(self.max_depth).ok_or_else(|| {
            DispatchError::PartialDepthExceeded {
                name: name.to_string(),
                limit: self.max_depth,
            }
        })?;

        // The lease goes back to the pool when it drops, error or not.
        let mut buf = self.pool.acquire();
        template.execute(&mut buf, context)?;
        let text = buf
            .to_utf8_string()
            .map_err(|source| DispatchError::InvalidOutput {
                name: name.to_string(),
                source,
            })?;
        Ok(template.engine().wrap(text))
    }

    /// The `partial(name, context=none)` template function.
    pub fn partial_function(self: &Arc<Self>) -> Value {
        let resolver = Arc::clone(self);
        Value::from_function(
            move |state: &State, name: String, context: Option<Value>| -> std::result::Result<Value, minijinja::Error> {
                let lookup = EnvLookup::new(state.env(), &resolver.kinds);
                let context = context.filter(|value| !value.is_undefined());
                let output = resolver.resolve(&lookup, &name, context.as_ref())?;
                Ok(output.into_value())
            },
        )
    }

    /// The `partial_cached(name, context=none, *variants)` template function.
    pub fn partial_cached_function(self: &Arc<Self>) -> Value {
        let resolver = Arc::clone(self);
        Value::from_function(
            move |state: &State,
                  name: String,
                  context: Option<Value>,
                  variants: minijinja::value::Rest<Value>|
                  -> std::result::Result<Value, minijinja::Error> {
                let lookup = EnvLookup::new(state.env(), &resolver.kinds);
                let context = context.filter(|value| !value.is_undefined());
                let output =
                    resolver.resolve_cached(&lookup, &name, context.as_ref(), &variants)?;
                Ok(output.into_value())
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use minijinja::context;

    use super::*;
    use crate::template::{EngineKind, TemplateStore};

    fn setup(templates: &[(&str, &str, EngineKind)]) -> (PartialResolver, TemplateStore) {
        let kinds = EngineKinds::new(EngineKind::Escaping);
        let mut store = TemplateStore::new(kinds.clone());
        for (name, source, engine) in templates {
            store
                .add_template_with_engine(*name, *source, *engine)
                .unwrap();
        }
        (PartialResolver::new(&DispatchConfig::default(), kinds), store)
    }

    #[test]
    fn test_header_example() {
        let (resolver, store) = setup(&[("partials/header", "<b>{{ this }}</b>", EngineKind::Escaping)]);
        let out = resolver
            .resolve(&store, "header", Some(&Value::from("hi")))
            .unwrap();
        assert_eq!(out, RenderOutput::Markup("<b>hi</b>".into()));

        let err = resolver.resolve(&store, "footer", None).unwrap_err();
        assert_eq!(err.to_string(), r#"Partial "footer" not found"#);
    }

    #[test]
    fn test_prefix_is_transparent() {
        let (resolver, store) = setup(&[("partials/x", "x", EngineKind::Plain)]);
        assert_eq!(
            resolver.resolve(&store, "x", None).unwrap(),
            resolver.resolve(&store, "partials/x", None).unwrap()
        );
    }

    #[test]
    fn test_site_root_beats_theme_root() {
        let (resolver, store) = setup(&[
            ("theme/partials/x", "theme", EngineKind::Plain),
            ("partials/x", "site", EngineKind::Plain),
        ]);
        assert_eq!(resolver.resolve(&store, "x", None).unwrap().as_str(), "site");
    }

    #[test]
    fn test_legacy_suffix_is_fallback_only() {
        let (resolver, store) = setup(&[("partials/x.html", "legacy", EngineKind::Plain)]);
        assert_eq!(resolver.resolve(&store, "x", None).unwrap().as_str(), "legacy");

        let (resolver, store) = setup(&[
            ("partials/x.html", "legacy", EngineKind::Plain),
            ("partials/x", "bare", EngineKind::Plain),
        ]);
        assert_eq!(resolver.resolve(&store, "x", None).unwrap().as_str(), "bare");
    }

    #[test]
    fn test_legacy_suffix_in_site_beats_bare_theme() {
        let (resolver, store) = setup(&[
            ("theme/partials/x", "theme", EngineKind::Plain),
            ("partials/x.html", "site", EngineKind::Plain),
        ]);
        assert_eq!(resolver.resolve(&store, "x", None).unwrap().as_str(), "site");
    }

    #[test]
    fn test_not_found_reports_stripped_name() {
        let (resolver, store) = setup(&[]);
        let err = resolver.resolve(&store, "partials/nope", None).unwrap_err();
        assert_eq!(err.to_string(), r#"Partial "nope" not found"#);
    }

    #[test]
    fn test_output_typed_by_engine() {
        let (resolver, store) = setup(&[
            ("partials/html", "<i>{{ this }}</i>", EngineKind::Escaping),
            ("partials/text", "<i>{{ this }}</i>", EngineKind::Plain),
        ]);
        let ctx = Value::from("a&b");
        assert_eq!(
            resolver.resolve(&store, "html", Some(&ctx)).unwrap(),
            RenderOutput::Markup("<i>a&amp;b</i>".into())
        );
        assert_eq!(
            resolver.resolve(&store, "text", Some(&ctx)).unwrap(),
            RenderOutput::Plain("<i>a&b</i>".into())
        );
    }

    #[test]
    fn test_execution_error_is_verbatim_and_releases_buffer() {
        let (resolver, store) = setup(&[("partials/bad", "{{ fail() }}", EngineKind::Plain)]);
        let err = resolver.resolve(&store, "bad", None).unwrap_err();
        assert!(matches!(err, DispatchError::PartialExecution(_)));
        assert!(err.to_string().contains("fail"));
        assert_eq!(resolver.pool().idle_count(), 1);
    }

    #[test]
    fn test_depth_limit_applies_to_direct_calls() {
        let (resolver, store) = setup(&[("partials/x", "x", EngineKind::Plain)]);
        let held: Vec<_> = (0..resolver.max_depth())
            .map(|_| DepthGuard::enter(resolver.max_depth()).unwrap())
            .collect();

        let err = resolver.resolve(&store, "x", None).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::PartialDepthExceeded { ref name, limit: 32 } if name == "x"
        ));

        drop(held);
        assert_eq!(DepthGuard::current(), 0);
        assert_eq!(resolver.resolve(&store, "x", None).unwrap().as_str(), "x");
    }

    #[test]
    fn test_depth_released_after_execution_error() {
        let (resolver, store) = setup(&[("partials/bad", "{{ fail() }}", EngineKind::Plain)]);
        assert!(resolver.resolve(&store, "bad", None).is_err());
        assert_eq!(DepthGuard::current(), 0);
    }

    #[test]
    fn test_map_context_keys_are_variables() {
        let (resolver, store) = setup(&[("partials/card", "{{ title }}:{{ this.n }}", EngineKind::Plain)]);
        let ctx = context! { title => "T", n => 3 };
        assert_eq!(
            resolver.resolve(&store, "card", Some(&ctx)).unwrap().as_str(),
            "T:3"
        );
    }

    #[test]
    fn test_find_does_not_execute() {
        let (resolver, store) = setup(&[("theme/partials/x.html", "{{ fail() }}", EngineKind::Plain)]);
        let found = resolver.find(&store, "partials/x").unwrap();
        assert_eq!(found.name(), "theme/partials/x.html");
        assert!(resolver.find(&store, "y").is_none());
    }

    #[test]
    fn test_resolve_cached_keys_on_context() {
        let (resolver, store) = setup(&[("partials/n", "{{ this }}", EngineKind::Plain)]);
        let one = Value::from(1);
        let two = Value::from(2);
        assert_eq!(resolver.resolve_cached(&store, "n", Some(&one), &[]).unwrap().as_str(), "1");
        assert_eq!(resolver.resolve_cached(&store, "n", Some(&two), &[]).unwrap().as_str(), "2");
        assert_eq!(resolver.resolve_cached(&store, "partials/n", Some(&one), &[]).unwrap().as_str(), "1");
        assert_eq!(resolver.cache().len(), 2);
    }
}
