//! Cache Value Module
//!
//! The dynamically typed payload stored under each key.

use std::fmt;

use serde::de::{self, DeserializeSeed, EnumAccess, SeqAccess, VariantAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CacheError, Result};

/// Deepest list nesting a value may have. `List([])` has depth 1.
pub const MAX_VALUE_DEPTH: usize = 64;

// == Value ==
/// A stored value. The variant doubles as the runtime type tag, which is
/// what lets a snapshot restore heterogeneous values without a schema.
///
/// Deserialization rejects lists nested deeper than [`MAX_VALUE_DEPTH`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// Name of the runtime type tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
        }
    }

    /// Returns true if lists nest more than `max` levels deep.
    ///
    /// Recursion stops at `max`, so arbitrarily deep values are safe to check.
    pub fn nests_deeper_than(&self, max: usize) -> bool {
        match self {
            Value::List(items) => max == 0 || items.iter().any(|v| v.nests_deeper_than(max - 1)),
            _ => false,
        }
    }

    // == JSON Conversion ==
    /// Converts a JSON document into a cache value.
    ///
    /// Objects have no counterpart and are rejected, as are arrays nested
    /// deeper than [`MAX_VALUE_DEPTH`]. Integers that fit in `i64` become
    /// `Int`, every other number becomes `Float`.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::from_json_at(json, 0)
    }

    fn from_json_at(json: serde_json::Value, depth: usize) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n.as_f64().map(Value::Float).ok_or_else(|| {
                    CacheError::InvalidRequest(format!("Unsupported number: {}", n))
                }),
            },
            serde_json::Value::String(s) => Ok(Value::Str(s)),
            serde_json::Value::Array(_) if depth >= MAX_VALUE_DEPTH => Err(
                CacheError::InvalidRequest(format!(
                    "Lists may nest at most {} levels deep",
                    MAX_VALUE_DEPTH
                )),
            ),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| Value::from_json_at(item, depth + 1))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            serde_json::Value::Object(_) => Err(CacheError::InvalidRequest(
                "Objects are not a supported value kind".to_string(),
            )),
        }
    }

    /// Renders the value as JSON. Bytes become an array of numbers and
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => serde_json::Value::from(bytes.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

// == Deserialize ==
// Same wire shape as a derived impl, with a depth counter threaded through
// nested lists so hostile input cannot exhaust the stack.

const VARIANTS: &[&str] = &["Null", "Bool", "Int", "Float", "Str", "Bytes", "List"];

#[derive(Deserialize)]
enum Tag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
}

/// Deserializes one value enclosed by `depth` lists.
#[derive(Clone, Copy)]
struct ValueSeed {
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_enum("Value", VARIANTS, self)
    }
}

impl<'de> Visitor<'de> for ValueSeed {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a cache value")
    }

    fn visit_enum<A>(self, data: A) -> std::result::Result<Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (tag, variant) = data.variant::<Tag>()?;
        match tag {
            Tag::Null => variant.unit_variant().map(|()| Value::Null),
            Tag::Bool => variant.newtype_variant().map(Value::Bool),
            Tag::Int => variant.newtype_variant().map(Value::Int),
            Tag::Float => variant.newtype_variant().map(Value::Float),
            Tag::Str => variant.newtype_variant().map(Value::Str),
            Tag::Bytes => variant.newtype_variant().map(Value::Bytes),
            Tag::List => {
                if self.depth >= MAX_VALUE_DEPTH {
                    return Err(de::Error::custom(format!(
                        "list nesting exceeds {} levels",
                        MAX_VALUE_DEPTH
                    )));
                }
                variant
                    .newtype_variant_seed(ListSeed {
                        depth: self.depth + 1,
                    })
                    .map(Value::List)
            }
        }
    }
}

/// Deserializes the items of a list that sits at `depth`.
struct ListSeed {
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for ListSeed {
    type Value = Vec<Value>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for ListSeed {
    type Value = Vec<Value>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a list of cache values")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Vec<Value>, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let item = ValueSeed { depth: self.depth };
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
        while let Some(value) = seq.next_element_seed(item)? {
            items.push(value);
        }
        Ok(items)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        ValueSeed { depth: 0 }.deserialize(deserializer)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}
