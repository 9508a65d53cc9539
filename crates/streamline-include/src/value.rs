//! The plain-data result of resolution.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use streamline_yaml::Scalar;

/// A fully resolved document.
///
/// Contains only plain data: no nodes, tags, or directives. Mapping keys are
/// strings and keep source order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Sequence(Vec<ResolvedValue>),
    Mapping(IndexMap<String, ResolvedValue>),
}

impl ResolvedValue {
    /// An empty mapping, `{}`.
    pub fn empty_mapping() -> Self {
        ResolvedValue::Mapping(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResolvedValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ResolvedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ResolvedValue]> {
        match self {
            ResolvedValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ResolvedValue>> {
        match self {
            ResolvedValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a mapping entry.
    pub fn get(&self, key: &str) -> Option<&ResolvedValue> {
        self.as_mapping()?.get(key)
    }

    /// Keys of a mapping in order, or an empty list for anything else.
    pub fn keys(&self) -> Vec<&str> {
        self.as_mapping()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<Scalar> for ResolvedValue {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => ResolvedValue::Null,
            Scalar::Boolean(b) => ResolvedValue::Boolean(b),
            Scalar::Integer(i) => ResolvedValue::Integer(i),
            Scalar::Real(f) => ResolvedValue::Real(f),
            Scalar::String(s) => ResolvedValue::String(s),
        }
    }
}

impl Serialize for ResolvedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResolvedValue::Null => serializer.serialize_unit(),
            ResolvedValue::Boolean(b) => serializer.serialize_bool(*b),
            ResolvedValue::Integer(i) => serializer.serialize_i64(*i),
            ResolvedValue::Real(f) => serializer.serialize_f64(*f),
            ResolvedValue::String(s) => serializer.serialize_str(s),
            ResolvedValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ResolvedValue::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<ResolvedValue> for serde_json::Value {
    fn from(value: ResolvedValue) -> Self {
        match value {
            ResolvedValue::Null => serde_json::Value::Null,
            ResolvedValue::Boolean(b) => serde_json::Value::Bool(b),
            ResolvedValue::Integer(i) => serde_json::Value::from(i),
            // JSON has no NaN or infinities.
            ResolvedValue::Real(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ResolvedValue::String(s) => serde_json::Value::String(s),
            ResolvedValue::Sequence(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            ResolvedValue::Mapping(entries) => serde_json::Value::Object(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for ResolvedValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ResolvedValue::Null,
            serde_json::Value::Bool(b) => ResolvedValue::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ResolvedValue::Integer(i),
                None => ResolvedValue::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ResolvedValue::String(s),
            serde_json::Value::Array(items) => {
                ResolvedValue::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => ResolvedValue::Mapping(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_preserves_key_order() {
        let mut map = IndexMap::new();
        map.insert("z".to_string(), ResolvedValue::Integer(1));
        map.insert("a".to_string(), ResolvedValue::Null);
        let value = ResolvedValue::Mapping(map);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"z":1,"a":null}"#);
        assert_eq!(value.keys(), vec!["z", "a"]);
    }

    #[test]
    fn test_json_conversion() {
        let json = json!({"b": [1, 2.5, "x", true, null], "a": {}});
        let value = ResolvedValue::from(json.clone());
        assert_eq!(value.keys(), vec!["b", "a"]);
        assert_eq!(
            value.get("b").and_then(|b| b.as_sequence()).map(<[_]>::len),
            Some(5)
        );
        assert_eq!(serde_json::Value::from(value), json);
    }

    #[test]
    fn test_non_finite_reals_become_null() {
        assert_eq!(
            serde_json::Value::from(ResolvedValue::Real(f64::INFINITY)),
            serde_json::Value::Null
        );
    }
}
