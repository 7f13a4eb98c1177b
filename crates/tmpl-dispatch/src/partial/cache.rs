//! Memoized partial output for `partial_cached`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use minijinja::value::ValueKind;
use minijinja::Value;
use tracing::trace;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::template::RenderOutput;

/// Identifies one cached render: normalized name, context, and variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    context: ValueKey,
    variants: Vec<ValueKey>,
}

impl CacheKey {
    pub fn new(name: impl Into<String>, context: Option<&Value>, variants: &[Value]) -> Self {
        Self {
            name: name.into(),
            context: context.map_or(ValueKey::Undefined, ValueKey::of),
            variants: variants.iter().map(ValueKey::of).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Strict structural identity of a template value.
///
/// `Value`'s own equality is loose: it ignores the safe flag and compares
/// numbers by magnitude, so `"<b>"` equals a safe `"<b>"` and `1` equals
/// `1.0`. Those pairs render differently and must never share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    Undefined,
    None,
    Bool(bool),
    /// Numbers keep their rendered form, which differs between `1` and `1.0`.
    Number(String),
    String { text: String, safe: bool },
    Bytes(Vec<u8>),
    Seq(Vec<ValueKey>),
    Map(Vec<(ValueKey, ValueKey)>),
    /// Objects without a structural view, identified by kind and rendering.
    Opaque { kind: String, repr: String },
}

impl ValueKey {
    fn of(value: &Value) -> Self {
        match value.kind() {
            ValueKind::Undefined => ValueKey::Undefined,
            ValueKind::None => ValueKey::None,
            ValueKind::Bool => ValueKey::Bool(value.is_true()),
            ValueKind::Number => ValueKey::Number(value.to_string()),
            ValueKind::String => ValueKey::String {
                text: value.as_str().unwrap_or_default().to_string(),
                safe: value.is_safe(),
            },
            ValueKind::Bytes => ValueKey::Bytes(value.as_bytes().unwrap_or_default().to_vec()),
            ValueKind::Seq => match value.try_iter() {
                Ok(items) => ValueKey::Seq(items.map(|item| ValueKey::of(&item)).collect()),
                Err(_) => ValueKey::opaque(value),
            },
            ValueKind::Map => match value.try_iter() {
                Ok(keys) => ValueKey::Map(
                    keys.map(|key| {
                        let item = value.get_item(&key).unwrap_or_default();
                        (ValueKey::of(&key), ValueKey::of(&item))
                    })
                    .collect(),
                ),
                Err(_) => ValueKey::opaque(value),
            },
            _ => ValueKey::opaque(value),
        }
    }

    fn opaque(value: &Value) -> Self {
        ValueKey::Opaque {
            kind: format!("{:?}", value.kind()),
            repr: value.to_string(),
        }
    }
}

/// Shared, lock-guarded memo table.
///
/// Two threads missing on the same key at once both render; the second insert
/// overwrites the first with an equal value.
#[derive(Debug)]
pub struct PartialCache {
    entries: RwLock<HashMap<CacheKey, RenderOutput>>,
    enabled: bool,
    max_entries: usize,
}

impl PartialCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            enabled: config.enabled,
            max_entries: config.max_entries,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, key: &CacheKey) -> Option<RenderOutput> {
        if !self.enabled {
            return None;
        }
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores `output` unless caching is off or the table is full. Returns
    /// whether it was stored.
    pub fn insert(&self, key: CacheKey, output: RenderOutput) -> bool {
        if !self.enabled {
            return false;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, output);
        true
    }

    /// Returns the cached output for `key`, or runs `render` and caches a
    /// successful result. The lock is not held while rendering.
    pub fn get_or_render<F>(&self, key: CacheKey, render: F) -> Result<RenderOutput>
    where
        F: FnOnce() -> Result<RenderOutput>,
    {
        if let Some(hit) = self.get(&key) {
            trace!(partial = key.name(), "partial cache hit");
            return Ok(hit);
        }
        trace!(partial = key.name(), "partial cache miss");
        let output = render()?;
        self.insert(key, output.clone());
        Ok(output)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for PartialCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
