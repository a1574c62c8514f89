use std::fmt;

use thiserror::Error;

/// Runtime tag identifying a value's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discriminant {
	/// `nil`.
	Nil,
	/// `false`.
	False,
	/// `true`.
	True,
	/// Fixed-width integer.
	Integer,
	/// Double-precision float.
	Float,
	/// Byte string.
	String,
	/// Ordered array.
	Array,
	/// Hash table.
	Hash,
	/// Anything else: symbols, procs, plain objects, exceptions.
	Other,
}

impl Discriminant {
	/// Runtime-facing name of this kind.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Nil => "NilClass",
			Self::False => "FalseClass",
			Self::True => "TrueClass",
			Self::Integer => "Integer",
			Self::Float => "Float",
			Self::String => "String",
			Self::Array => "Array",
			Self::Hash => "Hash",
			Self::Other => "Object",
		}
	}

	/// Ruby truthiness: only `nil` and `false` are falsy.
	pub const fn is_truthy(self) -> bool {
		!matches!(self, Self::Nil | Self::False)
	}
}

impl fmt::Display for Discriminant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Exception raised inside the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{class}: {message}")]
pub struct RuntimeException {
	/// Exception class name, for example `NoMethodError`.
	pub class: String,
	/// Exception message text.
	pub message: String,
}

impl RuntimeException {
	/// Build an exception of `class` with `message`.
	pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			class: class.into(),
			message: message.into(),
		}
	}
}

/// Operations the bridge needs from an embedded runtime binding.
///
/// Handles are owned by the runtime; the bridge only clones them and passes them back. Implementations
/// are expected to be driven from the single thread that owns the runtime instance.
pub trait Runtime {
	/// Handle to a runtime-owned value.
	type Value: Clone;

	/// Kind tag of `value`.
	fn type_of(&self, value: &Self::Value) -> Discriminant;

	/// Class name of `value`, used in error messages.
	fn class_name(&self, value: &Self::Value) -> String;

	/// String conversion primitive (`to_s`); never fails.
	fn to_s(&self, value: &Self::Value) -> String;

	/// Integer conversion primitive (`to_i`); never fails.
	fn to_i(&self, value: &Self::Value) -> i64;

	/// Float conversion primitive (`to_f`); never fails.
	fn to_f(&self, value: &Self::Value) -> f64;

	/// Elements of an Array value in index order.
	fn array_items(&self, array: &Self::Value) -> Result<Vec<Self::Value>, RuntimeException>;

	/// Key/value pairs of a Hash value in the runtime's enumeration order.
	fn hash_entries(&self, hash: &Self::Value) -> Result<Vec<(Self::Value, Self::Value)>, RuntimeException>;

	/// The `nil` value.
	fn nil_value(&mut self) -> Self::Value;

	/// `true` or `false`.
	fn bool_value(&mut self, value: bool) -> Self::Value;

	/// New String holding `text`.
	fn string_value(&mut self, text: &str) -> Self::Value;

	/// Evaluate a literal expression such as `42` or `3.140000`.
	fn load_literal(&mut self, source: &str) -> Result<Self::Value, RuntimeException>;

	/// New empty Array.
	fn new_array(&mut self) -> Result<Self::Value, RuntimeException>;

	/// Append `item` to `array`.
	fn array_push(&mut self, array: &Self::Value, item: Self::Value) -> Result<(), RuntimeException>;

	/// New empty Hash.
	fn new_hash(&mut self) -> Result<Self::Value, RuntimeException>;

	/// Store `value` under `key` in `hash`.
	fn hash_store(&mut self, hash: &Self::Value, key: Self::Value, value: Self::Value) -> Result<(), RuntimeException>;

	/// Invoke method `name` on `receiver`.
	fn call_method(&mut self, receiver: &Self::Value, name: &str, args: &[Self::Value]) -> Result<Self::Value, RuntimeException>;

	/// Instantiate exception class `class` with `message`.
	fn new_exception(&mut self, class: &str, message: &str) -> Result<Self::Value, RuntimeException>;
}
