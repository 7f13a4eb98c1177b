//! The flat function registry handed to the template compiler.
//!
//! Every namespace's functions and the dispatcher's own entry points are
//! merged into one name → callable map. Names are global: if two sources
//! claim the same name, construction fails with
//! [`DispatchError::DuplicateFunctionName`] naming both sources. There is no
//! shadowing or "last one wins".
//!
//! ```rust
//! use tmpl_dispatch::FunctionRegistry;
//! use tmpl_funcs::MathNamespace;
//! use minijinja::Value;
//!
//! let registry = FunctionRegistry::builder()
//!     .namespace(&MathNamespace::new())
//!     .unwrap()
//!     .function("site", "site_name", Value::from_function(|| "Example"))
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(registry.source_of("add"), Some("math"));
//! assert_eq!(registry.source_of("site_name"), Some("site"));
//! ```

use std::collections::BTreeMap;

use minijinja::{Environment, Value};
use tmpl_funcs::Namespace;
use tracing::debug;

use crate::error::{DispatchError, Result};

#[derive(Debug, Clone)]
struct Entry {
    source: String,
    callable: Value,
}

/// Immutable name → callable map.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    entries: BTreeMap<String, Entry>,
}

impl FunctionRegistry {
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|entry| &entry.callable)
    }

    /// The namespace (or other source) that registered `name`.
    pub fn source_of(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|entry| entry.source.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Function names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers every function as a global callable in `env`.
    pub fn install(&self, env: &mut Environment<'static>) {
        for (name, entry) in &self.entries {
            env.add_global(name.clone(), entry.callable.clone());
        }
    }
}

/// Collects functions, rejecting duplicate names as they arrive.
#[derive(Debug, Default)]
pub struct FunctionRegistryBuilder {
    entries: BTreeMap<String, Entry>,
}

impl FunctionRegistryBuilder {
    /// Adds every function `namespace` exposes, attributed to its name.
    pub fn namespace<N: Namespace + ?Sized>(mut self, namespace: &N) -> Result<Self> {
        let source = namespace.name();
        for (name, callable) in namespace.functions() {
            self.insert(source, name, callable)?;
        }
        Ok(self)
    }

    /// Adds namespaces in order.
    pub fn namespaces<'a, I, N>(mut self, namespaces: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a N>,
        N: Namespace + ?Sized + 'a,
    {
        for namespace in namespaces {
            self = self.namespace(namespace)?;
        }
        Ok(self)
    }

    /// Adds a single function attributed to `source`.
    pub fn function(mut self, source: &str, name: &str, callable: Value) -> Result<Self> {
        self.insert(source, name, callable)?;
        Ok(self)
    }

    pub fn build(self) -> FunctionRegistry {
        debug!(functions = self.entries.len(), "built function registry");
        FunctionRegistry {
            entries: self.entries,
        }
    }

    fn insert(&mut self, source: &str, name: &str, callable: Value) -> Result<()> {
        if let Some(existing) = self.entries.get(name) {
            return Err(DispatchError::DuplicateFunctionName {
                name: name.to_string(),
                first: existing.source.clone(),
                second: source.to_string(),
            });
        }
        self.entries.insert(
            name.to_string(),
            Entry {
                source: source.to_string(),
                callable,
            },
        );
        Ok(())
    }
}
