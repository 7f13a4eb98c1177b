//! Encoding helpers: base64 and JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use minijinja::{Error, ErrorKind, Value};

use crate::Namespace;

/// The `encoding` namespace.
#[derive(Debug, Clone, Default)]
pub struct EncodingNamespace;

impl EncodingNamespace {
    pub fn new() -> Self {
        Self
    }
}

impl Namespace for EncodingNamespace {
    fn name(&self) -> &'static str {
        "encoding"
    }

    fn functions(&self) -> Vec<(&'static str, Value)> {
        vec![
            (
                "base64_encode",
                Value::from_function(|s: String| STANDARD.encode(s.as_bytes())),
            ),
            ("base64_decode", Value::from_function(base64_decode)),
            ("jsonify", Value::from_function(jsonify)),
        ]
    }
}

fn base64_decode(s: String) -> Result<String, Error> {
    let bytes = STANDARD.decode(s.trim()).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "base64_decode: invalid input").with_source(e)
    })?;
    String::from_utf8(bytes).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "base64_decode: not UTF-8").with_source(e)
    })
}

fn jsonify(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| {
        Error::new(ErrorKind::BadSerialization, "jsonify: cannot serialize value").with_source(e)
    })
}
