use crate::callable::{LoxFunction, NativeFunction};
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Function(LoxFunction),
    Native(NativeFunction),
}

impl Value {
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(x) => *x,
            _ => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::String(l), Value::String(r)) => l == r,
            (Value::Function(l), Value::Function(r)) => l.equals(r),
            (Value::Native(l), Value::Native(r)) => l.name == r.name,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(x) => write!(f, "{}", x),
            Value::Number(x) => write_number(f, *x),
            Value::String(x) => write!(f, "{}", x),
            Value::Function(x) => write!(f, "{}", x),
            Value::Native(x) => write!(f, "{}", x),
        }
    }
}

// `Infinity` and `NaN` are spelled out, magnitudes outside [1e-6, 1e21) use
// exponent form with an explicit sign, and `-0` prints as `0`.
fn write_number(f: &mut Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return write!(f, "NaN");
    }
    if x.is_infinite() {
        return write!(f, "{}Infinity", if x < 0.0 { "-" } else { "" });
    }
    if x == 0.0 {
        return write!(f, "0");
    }
    let magnitude = x.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", x);
        return match exp.find('e') {
            Some(i) if !exp[i + 1..].starts_with('-') => {
                write!(f, "{}e+{}", &exp[..i], &exp[i + 1..])
            }
            _ => write!(f, "{}", exp),
        };
    }
    write!(f, "{}", x)
}

#[cfg(test)]
mod value_tests {
    use crate::value::Value;

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn equality_never_coerces() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_ne!(Value::Number(1.0), Value::String("1".to_string()));
        assert_ne!(Value::Nil, Value::Boolean(false));
        assert_eq!(Value::String("a".to_string()), Value::String("a".to_string()));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::String("ab".to_string()).to_string(), "ab");
    }

    #[test]
    fn display_special_numbers() {
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(1e23).to_string(), "1e+23");
        assert_eq!(Value::Number(-2.5e30).to_string(), "-2.5e+30");
        assert_eq!(Value::Number(1.5e-7).to_string(), "1.5e-7");
        assert_eq!(Value::Number(123456789.0).to_string(), "123456789");
        assert_eq!(Value::Number(0.001).to_string(), "0.001");
    }
}
