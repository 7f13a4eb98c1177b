//! Name-indexed store of compiled templates.

use std::collections::BTreeMap;

use minijinja::{Environment, Template, Value};
use serde::Serialize;
use tracing::debug;

use super::engine::{EngineKind, EngineKinds, RenderOutput};
use crate::error::{DispatchError, Result};
use crate::registry::FunctionRegistry;

/// Variable a partial's context is bound to.
pub const CONTEXT_VAR: &str = "this";

/// Read access to compiled templates by full name.
pub trait TemplateLookup {
    /// Returns the template registered under exactly `name`, if any.
    fn lookup(&self, name: &str) -> Option<CompiledTemplate<'_>>;
}

/// A compiled template together with the engine that produced it.
pub struct CompiledTemplate<'env> {
    template: Template<'env, 'env>,
    engine: EngineKind,
}

impl<'env> CompiledTemplate<'env> {
    pub fn new(template: Template<'env, 'env>, engine: EngineKind) -> Self {
        Self { template, engine }
    }

    pub fn name(&self) -> &str {
        self.template.name()
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Renders into `buf` with `context` bound as a partial context.
    ///
    /// The context is available as `this`; when it is a map its entries are
    /// also top-level variables. `None` leaves `this` undefined.
    pub fn execute(
        &self,
        buf: &mut Vec<u8>,
        context: Option<&Value>,
    ) -> std::result::Result<(), minijinja::Error> {
        self.template
            .render_to_write(partial_context(context), buf)
            .map(|_| ())
    }
}

/// Builds the variables a partial sees for `context`.
fn partial_context(context: Option<&Value>) -> BTreeMap<String, Value> {
    let mut vars = BTreeMap::new();
    let Some(this) = context else {
        return vars;
    };

    if this.kind() == minijinja::value::ValueKind::Map {
        if let Ok(keys) = this.try_iter() {
            for key in keys {
                if let Some(name) = key.as_str() {
                    let value = this.get_item(&key).unwrap_or_default();
                    vars.insert(name.to_string(), value);
                }
            }
        }
    }
    vars.insert(CONTEXT_VAR.to_string(), this.clone());
    vars
}

/// Lookup over a borrowed environment, as seen from inside a render.
#[derive(Clone, Copy)]
pub struct EnvLookup<'a> {
    env: &'a Environment<'a>,
    kinds: &'a EngineKinds,
}

impl<'a> EnvLookup<'a> {
    pub fn new(env: &'a Environment<'a>, kinds: &'a EngineKinds) -> Self {
        Self { env, kinds }
    }

    /// Like [`TemplateLookup::lookup`], but borrowing the environment rather
    /// than `self`.
    pub fn find(&self, name: &str) -> Option<CompiledTemplate<'a>> {
        let env: &'a Environment<'a> = self.env;
        let template = env.get_template(name).ok()?;
        Some(CompiledTemplate::new(template, self.kinds.get(name)))
    }
}

impl TemplateLookup for EnvLookup<'_> {
    fn lookup(&self, name: &str) -> Option<CompiledTemplate<'_>> {
        self.find(name)
    }
}

/// The template store: one minijinja environment holding templates of both
/// engine kinds.
///
/// Templates and functions are added at startup through `&mut self`; after
/// that the store is only read and can be shared across render threads.
pub struct TemplateStore {
    env: Environment<'static>,
    kinds: EngineKinds,
}

impl TemplateStore {
    /// Creates an empty store whose auto-escaping follows `kinds`.
    pub fn new(kinds: EngineKinds) -> Self {
        let mut env = Environment::new();
        let escape_kinds = kinds.clone();
        env.set_auto_escape_callback(move |name| escape_kinds.get(name).auto_escape());
        Self { env, kinds }
    }

    /// Installs every function of `registry` as a template global.
    pub fn install(&mut self, registry: &FunctionRegistry) {
        registry.install(&mut self.env);
    }

    /// Adds a template compiled by the default engine.
    pub fn add_template(&mut self, name: impl Into<String>, source: impl Into<String>) -> Result<()> {
        let engine = self.kinds.fallback();
        self.add_template_with_engine(name, source, engine)
    }

    /// Adds a template compiled by `engine`. Replaces any template of the
    /// same name; on a syntax error the previous state is kept.
    pub fn add_template_with_engine(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        engine: EngineKind,
    ) -> Result<()> {
        let name = name.into();
        // The auto-escape callback reads the kind while compiling.
        let previous = self.kinds.insert(name.clone(), engine);
        if let Err(err) = self.env.add_template_owned(name.clone(), source.into()) {
            match previous {
                Some(kind) => {
                    self.kinds.insert(name.clone(), kind);
                }
                None => {
                    self.kinds.remove(&name);
                }
            }
            return Err(DispatchError::TemplateSyntax { name, source: err });
        }
        debug!(template = %name, engine = ?engine, "added template");
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// The engine of a registered template.
    pub fn engine_of(&self, name: &str) -> Option<EngineKind> {
        self.has_template(name).then(|| self.kinds.get(name))
    }

    /// Renders a top-level template with `ctx` as its variables.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<RenderOutput> {
        let template = self
            .env
            .get_template(name)
            .map_err(|_| DispatchError::TemplateNotFound {
                name: name.to_string(),
            })?;
        let text = template.render(ctx)?;
        Ok(self.kinds.get(name).wrap(text))
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    pub fn kinds(&self) -> &EngineKinds {
        &self.kinds
    }

    fn as_lookup(&self) -> EnvLookup<'_> {
        EnvLookup::new(&self.env, &self.kinds)
    }
}

impl TemplateLookup for TemplateStore {
    fn lookup(&self, name: &str) -> Option<CompiledTemplate<'_>> {
        self.as_lookup().find(name)
    }
}
