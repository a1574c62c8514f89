use tracing::{debug, trace};

use crate::bridge::{BridgeError, Discriminant, Mapping, PathSegment, Result, Runtime, Value};

/// Limits for runtime-value decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum nesting of arrays/hashes below the decoded root.
	pub max_depth: u32,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self { max_depth: 128 }
	}
}

/// Decode a runtime value into a [`Value`] tree with default limits.
pub fn decode<R: Runtime>(rt: &R, value: &R::Value) -> Result<Value> {
	decode_with(rt, value, &DecodeOptions::default())
}

/// Decode a runtime value into a [`Value`] tree.
///
/// Fails on the first unsupported value, non-String hash key, or depth overflow; no partial tree is
/// returned. Hash entries keep the runtime's enumeration order.
pub fn decode_with<R: Runtime>(rt: &R, value: &R::Value, opt: &DecodeOptions) -> Result<Value> {
	debug!(kind = %rt.type_of(value), max_depth = opt.max_depth, "decode");
	decode_impl(rt, value, opt, 0)
}

fn decode_impl<R: Runtime>(rt: &R, value: &R::Value, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	match rt.type_of(value) {
		Discriminant::Nil => Ok(Value::Null),
		Discriminant::False => Ok(Value::Bool(false)),
		Discriminant::True => Ok(Value::Bool(true)),
		Discriminant::Integer => Ok(Value::Int(rt.to_i(value))),
		Discriminant::Float => Ok(Value::Float(rt.to_f(value))),
		Discriminant::String => Ok(Value::String(rt.to_s(value))),
		Discriminant::Array => decode_array(rt, value, opt, depth),
		Discriminant::Hash => decode_hash(rt, value, opt, depth),
		Discriminant::Other => Err(BridgeError::UnsupportedType { kind: rt.class_name(value) }),
	}
}

fn decode_array<R: Runtime>(rt: &R, value: &R::Value, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	let depth = descend(opt, depth)?;
	let items = rt.array_items(value)?;
	trace!(len = items.len(), depth, "decode array");

	let mut out = Vec::with_capacity(items.len());
	for (index, item) in items.iter().enumerate() {
		let decoded = decode_impl(rt, item, opt, depth).map_err(|err| err.within(PathSegment::Index(index)))?;
		out.push(decoded);
	}
	Ok(Value::Sequence(out))
}

fn decode_hash<R: Runtime>(rt: &R, value: &R::Value, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	let depth = descend(opt, depth)?;
	let entries = rt.hash_entries(value)?;
	trace!(len = entries.len(), depth, "decode hash");

	let mut out = Mapping::with_capacity(entries.len());
	for (key, item) in &entries {
		if rt.type_of(key) != Discriminant::String {
			return Err(BridgeError::InvalidKeyType { kind: rt.class_name(key) });
		}
		let key = rt.to_s(key);
		let decoded = decode_impl(rt, item, opt, depth).map_err(|err| err.within(PathSegment::Key(key.clone())))?;
		out.insert(key, decoded);
	}
	Ok(Value::Mapping(out))
}

fn descend(opt: &DecodeOptions, depth: u32) -> Result<u32> {
	if depth >= opt.max_depth {
		return Err(BridgeError::DepthExceeded { max_depth: opt.max_depth });
	}
	Ok(depth + 1)
}

#[cfg(test)]
mod tests;
