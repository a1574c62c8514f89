use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

/// String-keyed mapping that keeps runtime enumeration order.
///
/// Equality ignores order.
pub type Mapping = IndexMap<String, Value>;

/// Runtime-independent value tree produced by decoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	/// `nil`.
	#[default]
	Null,
	/// `true` or `false`.
	Bool(bool),
	/// Signed 64-bit integer.
	Int(i64),
	/// Double-precision float.
	Float(f64),
	/// Owned UTF-8 text.
	String(String),
	/// Ordered list.
	Sequence(Vec<Value>),
	/// String-keyed map.
	Mapping(Mapping),
}

impl Value {
	/// Short lowercase name of this variant.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::String(_) => "string",
			Value::Sequence(_) => "sequence",
			Value::Mapping(_) => "mapping",
		}
	}

	/// Whether this is [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Integer payload.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int(value) => Some(*value),
			_ => None,
		}
	}

	/// Float payload.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Float(value) => Some(*value),
			_ => None,
		}
	}

	/// String payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(value) => Some(value),
			_ => None,
		}
	}

	/// Sequence items.
	pub fn as_sequence(&self) -> Option<&[Value]> {
		match self {
			Value::Sequence(items) => Some(items),
			_ => None,
		}
	}

	/// Mapping entries.
	pub fn as_mapping(&self) -> Option<&Mapping> {
		match self {
			Value::Mapping(entries) => Some(entries),
			_ => None,
		}
	}

	/// Look up `key` when this is a mapping.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_mapping().and_then(|entries| entries.get(key))
	}

	/// Structural equality where floats may differ by at most `epsilon`.
	///
	/// Encoding renders floats as fixed-point text, so round-tripped floats are compared this way.
	pub fn approx_eq(&self, other: &Value, epsilon: f64) -> bool {
		match (self, other) {
			(Value::Float(a), Value::Float(b)) => (a - b).abs() <= epsilon || a == b,
			(Value::Sequence(a), Value::Sequence(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y, epsilon)),
			(Value::Mapping(a), Value::Mapping(b)) => {
				a.len() == b.len() && a.iter().all(|(key, x)| b.get(key).is_some_and(|y| x.approx_eq(y, epsilon)))
			}
			(a, b) => a == b,
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Value::Sequence(items)
	}
}

impl From<Mapping> for Value {
	fn from(entries: Mapping) -> Self {
		Value::Mapping(entries)
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Value::Null => serializer.serialize_unit(),
			Value::Bool(value) => serializer.serialize_bool(*value),
			Value::Int(value) => serializer.serialize_i64(*value),
			Value::Float(value) => serializer.serialize_f64(*value),
			Value::String(value) => serializer.serialize_str(value),
			Value::Sequence(items) => serializer.collect_seq(items),
			Value::Mapping(entries) => serializer.collect_map(entries),
		}
	}
}

impl<'de> Deserialize<'de> for Value {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(ValueVisitor)
	}
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
	type Value = Value;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("null, bool, number, string, sequence, or string-keyed map")
	}

	fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
		Ok(Value::Bool(value))
	}

	fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
		Ok(Value::Int(value))
	}

	fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
		// Integers past i64 become floats, matching the runtime's literal parser.
		Ok(i64::try_from(value).map(Value::Int).unwrap_or(Value::Float(value as f64)))
	}

	fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
		Ok(Value::Float(value))
	}

	fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
		Ok(Value::String(value.to_owned()))
	}

	fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
		Ok(Value::String(value))
	}

	fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
		Ok(Value::Null)
	}

	fn visit_none<E: de::Error>(self) -> Result<Value, E> {
		Ok(Value::Null)
	}

	fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
		Value::deserialize(deserializer)
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
		let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
		while let Some(item) = seq.next_element()? {
			items.push(item);
		}
		Ok(Value::Sequence(items))
	}

	fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
		let mut entries = Mapping::with_capacity(map.size_hint().unwrap_or(0));
		while let Some((key, value)) = map.next_entry::<String, Value>()? {
			entries.insert(key, value);
		}
		Ok(Value::Mapping(entries))
	}
}

#[cfg(test)]
mod tests;
