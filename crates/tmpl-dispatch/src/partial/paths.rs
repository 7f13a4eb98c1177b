//! Candidate-name generation for partial lookup.

use crate::config::DispatchConfig;

/// The lookup policy: which prefix is stripped and which full names are
/// tried, in what order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialPaths {
    strip_prefix: String,
    roots: Vec<String>,
    suffixes: Vec<String>,
}

impl PartialPaths {
    pub fn new(
        strip_prefix: impl Into<String>,
        roots: Vec<String>,
        legacy_suffixes: Vec<String>,
    ) -> Self {
        Self {
            strip_prefix: strip_prefix.into(),
            roots,
            suffixes: legacy_suffixes,
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(
            config.strip_prefix.clone(),
            config.lookup_roots.clone(),
            config.legacy_suffixes.clone(),
        )
    }

    /// Strips the configured prefix once, if present.
    pub fn normalize<'n>(&self, name: &'n str) -> &'n str {
        if self.strip_prefix.is_empty() {
            return name;
        }
        name.strip_prefix(self.strip_prefix.as_str()).unwrap_or(name)
    }

    /// Full template names to try for an already-normalized `name`, in
    /// priority order. Lazy: stop iterating at the first hit.
    pub fn candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = String> + 'a {
        self.roots.iter().flat_map(move |root| {
            std::iter::once("")
                .chain(self.suffixes.iter().map(String::as_str))
                .map(move |suffix| format!("{}{}{}", root, name, suffix))
        })
    }

    /// Number of candidates generated per name.
    pub fn candidate_count(&self) -> usize {
        self.roots.len() * (1 + self.suffixes.len())
    }
}

impl Default for PartialPaths {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}
