use super::Value;

impl Value {
    /// Convert to a number (loose numeric coercion).
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::Number(n) => *n,
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            Value::Array(_)
            | Value::Object(_)
            | Value::Error(_)
            | Value::Promise(_)
            | Value::Thenable(_) => f64::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!(Value::from(" 21 ").to_number(), 21.0);
        assert!(Value::from("abc").to_number().is_nan());
        assert_eq!(Value::Null.to_number(), 0.0);
    }
}
