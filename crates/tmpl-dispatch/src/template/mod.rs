//! Compiled templates and the store that holds them.
//!
//! Every template is compiled by one of two engines:
//!
//! | Engine | Auto-escape | Output of a partial |
//! |--------|-------------|---------------------|
//! | [`EngineKind::Escaping`] | HTML | [`RenderOutput::Markup`] (safe, not re-escaped) |
//! | [`EngineKind::Plain`] | none | [`RenderOutput::Plain`] (escaped if embedded in markup) |
//!
//! Both engines are the same `minijinja` environment; the engine kind is
//! recorded per template name and drives the environment's auto-escape
//! callback, so a single store can hold templates of both kinds and a partial
//! of either kind can be called from a parent of either kind.

mod engine;
mod store;

pub use engine::{EngineKind, EngineKinds, RenderOutput};
pub use store::{CompiledTemplate, EnvLookup, TemplateLookup, TemplateStore};
