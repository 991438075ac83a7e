use serde::{Deserialize, Deserializer};

use super::Value;

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

// Any self-describing format (JSON, YAML) can produce plain values.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_documents_map_onto_values() {
        let value: Value = serde_json::from_str(r#"{"n": 42, "tags": ["a", null], "ok": true}"#)
            .expect("json should parse");
        let Value::Object(entries) = value else {
            panic!("expected an object");
        };
        assert_eq!(entries["n"], Value::Number(42.0));
        assert_eq!(
            entries["tags"],
            Value::Array(vec![Value::from("a"), Value::Null])
        );
        assert_eq!(entries["ok"], Value::Boolean(true));
    }
}
