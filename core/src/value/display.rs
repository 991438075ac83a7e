use super::Value;
use std::fmt;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::String(s) => write!(f, "{s}"),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Object(entries) => {
                let pairs: Vec<String> = entries.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{ {} }}", pairs.join(", "))
            }
            Value::Error(err) => write!(f, "{err}"),
            // Nested promises print by identity only; a cell may hold itself.
            Value::Promise(promise) => write!(f, "Promise#{}", promise.id()),
            Value::Thenable(_) => write!(f, "[object Thenable]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ErrorValue;

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
    }

    #[test]
    fn nested_values_print_inline() {
        let value = Value::Array(vec![Value::from(1), Value::from("two"), Value::Null]);
        assert_eq!(value.to_string(), "[1, two, null]");
    }

    #[test]
    fn cancel_errors_print_their_payload() {
        let err = ErrorValue::cancel(Some(Value::from("timeout")));
        assert_eq!(Value::Error(err).to_string(), "CancelError: timeout");
    }
}
