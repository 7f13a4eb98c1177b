//! Arithmetic helpers.
//!
//! Two integers produce an integer (overflow is an error); anything else is
//! computed in `f64`.

use minijinja::{Error, ErrorKind, Value};

use crate::Namespace;

/// The `math` namespace.
#[derive(Debug, Clone, Default)]
pub struct MathNamespace;

impl MathNamespace {
    pub fn new() -> Self {
        Self
    }
}

impl Namespace for MathNamespace {
    fn name(&self) -> &'static str {
        "math"
    }

    fn functions(&self) -> Vec<(&'static str, Value)> {
        vec![
            (
                "add",
                Value::from_function(|a: Value, b: Value| {
                    arith("add", &a, &b, i64::checked_add, |x, y| Ok(x + y))
                }),
            ),
            (
                "sub",
                Value::from_function(|a: Value, b: Value| {
                    arith("sub", &a, &b, i64::checked_sub, |x, y| Ok(x - y))
                }),
            ),
            (
                "mul",
                Value::from_function(|a: Value, b: Value| {
                    arith("mul", &a, &b, i64::checked_mul, |x, y| Ok(x * y))
                }),
            ),
            (
                "div",
                Value::from_function(|a: Value, b: Value| {
                    arith("div", &a, &b, i64::checked_div, |x, y| {
                        if y == 0.0 {
                            Err(Error::new(ErrorKind::InvalidOperation, "division by zero"))
                        } else {
                            Ok(x / y)
                        }
                    })
                }),
            ),
            (
                "modulo",
                Value::from_function(|a: i64, b: i64| -> Result<i64, Error> {
                    a.checked_rem(b).ok_or_else(|| {
                        Error::new(ErrorKind::InvalidOperation, "modulo by zero or overflow")
                    })
                }),
            ),
        ]
    }
}

fn arith(
    op: &str,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> Result<f64, Error>,
) -> Result<Value, Error> {
    if let (Ok(x), Ok(y)) = (i64::try_from(a.clone()), i64::try_from(b.clone())) {
        return int_op(x, y).map(Value::from).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("{} of {} and {} overflows or divides by zero", op, x, y),
            )
        });
    }

    let x = as_float(op, a)?;
    let y = as_float(op, b)?;
    float_op(x, y).map(Value::from)
}

fn as_float(op: &str, value: &Value) -> Result<f64, Error> {
    f64::try_from(value.clone()).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("{} expects numbers, got {}", op, value.kind()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::render;

    #[test]
    fn test_integer_arithmetic() {
        let ns = MathNamespace::new();
        assert_eq!(render(&ns, "{{ add(2, 3) }}").unwrap(), "5");
        assert_eq!(render(&ns, "{{ sub(2, 3) }}").unwrap(), "-1");
        assert_eq!(render(&ns, "{{ mul(4, 3) }}").unwrap(), "12");
        assert_eq!(render(&ns, "{{ div(7, 2) }}").unwrap(), "3");
        assert_eq!(render(&ns, "{{ modulo(7, 2) }}").unwrap(), "1");
    }

    #[test]
    fn test_float_arithmetic() {
        let ns = MathNamespace::new();
        assert_eq!(render(&ns, "{{ add(1.5, 1) }}").unwrap(), "2.5");
        assert_eq!(render(&ns, "{{ div(7.5, 2) }}").unwrap(), "3.75");
    }

    #[test]
    fn test_division_by_zero_errors() {
        let ns = MathNamespace::new();
        assert!(render(&ns, "{{ div(1, 0) }}").is_err());
        assert!(render(&ns, "{{ div(1.5, 0) }}").is_err());
        assert!(render(&ns, "{{ modulo(1, 0) }}").is_err());
    }

    #[test]
    fn test_non_numbers_error() {
        let ns = MathNamespace::new();
        let err = render(&ns, "{{ add('a', 1) }}").unwrap_err();
        assert!(err.to_string().contains("add expects numbers"));
    }
}
