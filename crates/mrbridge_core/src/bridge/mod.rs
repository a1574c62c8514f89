mod decode;
mod encode;
mod error;
mod heap;
mod path;
mod raise;
mod runtime;
mod unmarshal;
mod value;

/// Runtime-value to value-tree decoding.
pub use decode::{DecodeOptions, decode, decode_with};
/// Host-value to runtime-value encoding.
pub use encode::{EncodeOptions, Encoder, Number, encode, encode_number, encode_with};
/// Error and result aliases.
pub use error::{BridgeError, ElementFailure, Result};
/// In-memory reference runtime.
pub use heap::{Heap, Method, ObjRef};
/// Locations of nested values.
pub use path::{PathSegment, ValuePath};
/// Host error to runtime exception conversion.
pub use raise::{exception, runtime_error, try_exception};
/// Runtime abstraction consumed by the bridge.
pub use runtime::{Discriminant, Runtime, RuntimeException};
/// Record population from runtime objects.
pub use unmarshal::{Coerce, Coercion, CoercionPolicy, FieldSpec, FieldVisitor, Kind, Record, UnmarshalOptions, UnmarshalReport, unmarshal, unmarshal_with};
/// Generic value tree.
pub use value::{Mapping, Value};
