//! Engine kinds and typed render output.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use minijinja::{AutoEscape, Value};
use serde::Deserialize;

/// Which engine compiled a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// HTML auto-escaping; output is markup-safe.
    #[default]
    Escaping,
    /// No escaping; output is plain text.
    Plain,
}

impl EngineKind {
    /// The minijinja auto-escape mode for this engine.
    pub fn auto_escape(self) -> AutoEscape {
        match self {
            EngineKind::Escaping => AutoEscape::Html,
            EngineKind::Plain => AutoEscape::None,
        }
    }

    /// Types rendered text according to the engine that produced it.
    pub fn wrap(self, text: String) -> RenderOutput {
        match self {
            EngineKind::Escaping => RenderOutput::Markup(text),
            EngineKind::Plain => RenderOutput::Plain(text),
        }
    }
}

/// Rendered text, tagged with whether it is already safe markup.
///
/// Converting into a [`Value`] keeps the distinction: markup becomes a safe
/// string that an escaping parent emits verbatim, plain text stays an ordinary
/// string that an escaping parent escapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderOutput {
    Plain(String),
    Markup(String),
}

impl RenderOutput {
    pub fn as_str(&self) -> &str {
        match self {
            RenderOutput::Plain(s) | RenderOutput::Markup(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            RenderOutput::Plain(s) | RenderOutput::Markup(s) => s,
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, RenderOutput::Markup(_))
    }

    pub fn engine(&self) -> EngineKind {
        match self {
            RenderOutput::Plain(_) => EngineKind::Plain,
            RenderOutput::Markup(_) => EngineKind::Escaping,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            RenderOutput::Plain(s) => Value::from(s),
            RenderOutput::Markup(s) => Value::from_safe_string(s),
        }
    }
}

impl fmt::Display for RenderOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RenderOutput> for Value {
    fn from(output: RenderOutput) -> Self {
        output.into_value()
    }
}

/// Engine kind per template name, shared between a store's auto-escape
/// callback and the partial resolver.
///
/// Written while templates are added at startup; read on every lookup.
#[derive(Debug, Clone)]
pub struct EngineKinds {
    kinds: Arc<RwLock<HashMap<String, EngineKind>>>,
    fallback: EngineKind,
}

impl EngineKinds {
    /// Creates an empty table; unknown names report `fallback`.
    pub fn new(fallback: EngineKind) -> Self {
        Self {
            kinds: Arc::new(RwLock::new(HashMap::new())),
            fallback,
        }
    }

    pub fn get(&self, name: &str) -> EngineKind {
        self.kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(self.fallback)
    }

    pub fn insert(&self, name: impl Into<String>, kind: EngineKind) -> Option<EngineKind> {
        self.kinds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), kind)
    }

    pub fn remove(&self, name: &str) -> Option<EngineKind> {
        self.kinds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn fallback(&self) -> EngineKind {
        self.fallback
    }
}

impl Default for EngineKinds {
    fn default() -> Self {
        Self::new(EngineKind::default())
    }
}
