//! Hashing helpers.

use minijinja::Value;
use sha2::{Digest, Sha256};

use crate::Namespace;

/// The `crypto` namespace.
#[derive(Debug, Clone, Default)]
pub struct CryptoNamespace;

impl CryptoNamespace {
    pub fn new() -> Self {
        Self
    }
}

impl Namespace for CryptoNamespace {
    fn name(&self) -> &'static str {
        "crypto"
    }

    fn functions(&self) -> Vec<(&'static str, Value)> {
        vec![("sha256", Value::from_function(|s: String| sha256_hex(&s)))]
    }
}

fn sha256_hex(s: &str) -> String {
    format!("{:x}", Sha256::digest(s.as_bytes()))
}
