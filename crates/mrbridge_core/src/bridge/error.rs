use std::fmt::Display;

use thiserror::Error;

use crate::bridge::{Discriminant, PathSegment, RuntimeException, ValuePath};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors produced while decoding, encoding, or unmarshalling runtime values.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// Value kind has no counterpart on the other side of the bridge.
	#[error("unsupported type: {kind}")]
	UnsupportedType {
		/// Runtime class name or host type description.
		kind: String,
	},
	/// Runtime hash key was not a String while decoding.
	#[error("invalid hash key type {kind} (expected String)")]
	InvalidKeyType {
		/// Runtime class name of the offending key.
		kind: String,
	},
	/// Host map key did not serialize as a string while encoding.
	#[error("unsupported map key type {kind} (expected string)")]
	UnsupportedKeyType {
		/// Host-side description of the offending key.
		kind: String,
	},
	/// Unmarshal target schema cannot be populated.
	#[error("invalid unmarshal target {type_name}: {reason}")]
	InvalidTarget {
		/// Record type name.
		type_name: &'static str,
		/// What is wrong with the schema.
		reason: String,
	},
	/// Accessor call on the runtime object raised.
	#[error("accessor `{accessor}` for field {field} failed: {source}")]
	Accessor {
		/// Record field being populated.
		field: &'static str,
		/// Accessor method named by the field tag.
		accessor: &'static str,
		/// Exception raised by the runtime.
		source: RuntimeException,
	},
	/// Conversion of a nested element failed.
	#[error("at {path}: {source}")]
	Nested {
		/// Location of the failing element.
		path: ValuePath,
		/// Failure at that location.
		source: Box<BridgeError>,
	},
	/// Coercing an accessor result into its field failed.
	#[error("field {field}: {source}")]
	Field {
		/// Record field being populated.
		field: &'static str,
		/// Coercion failure.
		source: Box<BridgeError>,
	},
	/// Strict coercion found a value of the wrong kind.
	#[error("type mismatch: expected {expected}, got {got}")]
	TypeMismatch {
		/// Declared host kind.
		expected: String,
		/// Runtime discriminant actually received.
		got: Discriminant,
	},
	/// Some container elements fell back to their default during lenient coercion.
	#[error("{} element(s) failed coercion", .failures.len())]
	PartialCoercion {
		/// Every recorded element failure.
		failures: Vec<ElementFailure>,
	},
	/// Nesting exceeded the configured depth budget.
	#[error("conversion depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Runtime primitive (allocation, literal loading, container access) failed.
	#[error("runtime: {0}")]
	Runtime(#[from] RuntimeException),
	/// Custom message raised through serde.
	#[error("{0}")]
	Message(String),
}

/// One container element that failed coercion during unmarshal.
#[derive(Debug)]
pub struct ElementFailure {
	/// Record field containing the element.
	pub field: &'static str,
	/// Element location inside the field value.
	pub path: ValuePath,
	/// Why the element could not be coerced.
	pub error: BridgeError,
}

impl BridgeError {
	/// Innermost error, looking through [`BridgeError::Nested`] and [`BridgeError::Field`] wrappers.
	pub fn root_cause(&self) -> &BridgeError {
		match self {
			BridgeError::Nested { source, .. } | BridgeError::Field { source, .. } => source.root_cause(),
			other => other,
		}
	}

	/// Location of the failing element, if the error came from inside a container.
	pub fn path(&self) -> Option<&ValuePath> {
		match self {
			BridgeError::Nested { path, .. } => Some(path),
			BridgeError::Field { source, .. } => source.path(),
			_ => None,
		}
	}

	/// Attach one more outer path step, merging into an existing [`BridgeError::Nested`].
	pub(crate) fn within(self, segment: PathSegment) -> Self {
		match self {
			BridgeError::Nested { mut path, source } => {
				path.prepend(segment);
				BridgeError::Nested { path, source }
			}
			other => BridgeError::Nested {
				path: ValuePath::from(segment),
				source: Box::new(other),
			},
		}
	}
}

impl serde::ser::Error for BridgeError {
	fn custom<T: Display>(msg: T) -> Self {
		BridgeError::Message(msg.to_string())
	}
}
