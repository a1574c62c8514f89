use serde::{Serialize, ser};
use tracing::{debug, trace};

use crate::bridge::{BridgeError, PathSegment, Result, Runtime};

/// Limits for host-value encoding.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
	/// Maximum nesting of sequences/maps below the encoded root.
	pub max_depth: u32,
}

impl Default for EncodeOptions {
	fn default() -> Self {
		Self { max_depth: 128 }
	}
}

/// Host number handed to [`encode_number`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
	/// Any signed integer width.
	Int(i64),
	/// Any unsigned integer width.
	UInt(u64),
	/// Any float width.
	Float(f64),
}

/// Build a runtime number by rendering it as decimal text and loading that text as a literal.
///
/// Floats are rendered fixed-point with six fractional digits, so digits past the sixth are lost.
/// Unsigned values above `i64::MAX` come back as runtime floats.
pub fn encode_number<R: Runtime>(rt: &mut R, number: Number) -> Result<R::Value> {
	let source = match number {
		Number::Int(value) => value.to_string(),
		Number::UInt(value) => value.to_string(),
		Number::Float(value) => format!("{value:.6}"),
	};
	Ok(rt.load_literal(&source)?)
}

/// Encode any serializable host value into a runtime value with default limits.
pub fn encode<R: Runtime, T: ?Sized + Serialize>(rt: &mut R, value: &T) -> Result<R::Value> {
	encode_with(rt, value, &EncodeOptions::default())
}

/// Encode any serializable host value into a runtime value.
///
/// Sequences become runtime arrays and string-keyed maps become runtime hashes, filled one element at
/// a time. The first failing element aborts the whole call.
pub fn encode_with<R: Runtime, T: ?Sized + Serialize>(rt: &mut R, value: &T, opt: &EncodeOptions) -> Result<R::Value> {
	debug!(max_depth = opt.max_depth, "encode");
	let mut encoder = Encoder::new(rt, opt);
	value.serialize(&mut encoder)
}

/// Serde serializer writing into a [`Runtime`].
///
/// Prefer [`encode`] / [`encode_with`]; this type is public so it can be driven from custom
/// `Serialize` impls that need a runtime-backed serializer.
pub struct Encoder<'r, R: Runtime> {
	rt: &'r mut R,
	max_depth: u32,
	depth: u32,
}

impl<'r, R: Runtime> Encoder<'r, R> {
	/// Encoder over `rt` honoring `opt`.
	pub fn new(rt: &'r mut R, opt: &EncodeOptions) -> Self {
		Self {
			rt,
			max_depth: opt.max_depth,
			depth: 0,
		}
	}

	fn descend(&mut self) -> Result<()> {
		if self.depth >= self.max_depth {
			return Err(BridgeError::DepthExceeded { max_depth: self.max_depth });
		}
		self.depth += 1;
		Ok(())
	}

	fn ascend(&mut self) {
		self.depth = self.depth.saturating_sub(1);
	}
}

fn unsupported(kind: impl Into<String>) -> BridgeError {
	BridgeError::UnsupportedType { kind: kind.into() }
}

impl<'a, 'r, R: Runtime> ser::Serializer for &'a mut Encoder<'r, R> {
	type Ok = R::Value;
	type Error = BridgeError;

	type SerializeSeq = SeqEncoder<'a, 'r, R>;
	type SerializeTuple = SeqEncoder<'a, 'r, R>;
	type SerializeTupleStruct = SeqEncoder<'a, 'r, R>;
	type SerializeTupleVariant = ser::Impossible<R::Value, BridgeError>;
	type SerializeMap = MapEncoder<'a, 'r, R>;
	type SerializeStruct = ser::Impossible<R::Value, BridgeError>;
	type SerializeStructVariant = ser::Impossible<R::Value, BridgeError>;

	fn serialize_bool(self, v: bool) -> Result<R::Value> {
		Ok(self.rt.bool_value(v))
	}

	fn serialize_i8(self, v: i8) -> Result<R::Value> {
		encode_number(self.rt, Number::Int(i64::from(v)))
	}

	fn serialize_i16(self, v: i16) -> Result<R::Value> {
		encode_number(self.rt, Number::Int(i64::from(v)))
	}

	fn serialize_i32(self, v: i32) -> Result<R::Value> {
		encode_number(self.rt, Number::Int(i64::from(v)))
	}

	fn serialize_i64(self, v: i64) -> Result<R::Value> {
		encode_number(self.rt, Number::Int(v))
	}

	fn serialize_i128(self, _v: i128) -> Result<R::Value> {
		Err(unsupported("i128"))
	}

	fn serialize_u8(self, v: u8) -> Result<R::Value> {
		encode_number(self.rt, Number::UInt(u64::from(v)))
	}

	fn serialize_u16(self, v: u16) -> Result<R::Value> {
		encode_number(self.rt, Number::UInt(u64::from(v)))
	}

	fn serialize_u32(self, v: u32) -> Result<R::Value> {
		encode_number(self.rt, Number::UInt(u64::from(v)))
	}

	fn serialize_u64(self, v: u64) -> Result<R::Value> {
		encode_number(self.rt, Number::UInt(v))
	}

	fn serialize_u128(self, _v: u128) -> Result<R::Value> {
		Err(unsupported("u128"))
	}

	fn serialize_f32(self, v: f32) -> Result<R::Value> {
		encode_number(self.rt, Number::Float(f64::from(v)))
	}

	fn serialize_f64(self, v: f64) -> Result<R::Value> {
		encode_number(self.rt, Number::Float(v))
	}

	fn serialize_char(self, v: char) -> Result<R::Value> {
		let mut buf = [0_u8; 4];
		Ok(self.rt.string_value(v.encode_utf8(&mut buf)))
	}

	fn serialize_str(self, v: &str) -> Result<R::Value> {
		Ok(self.rt.string_value(v))
	}

	fn serialize_bytes(self, _v: &[u8]) -> Result<R::Value> {
		Err(unsupported("bytes"))
	}

	fn serialize_none(self) -> Result<R::Value> {
		Ok(self.rt.nil_value())
	}

	fn serialize_some<T>(self, value: &T) -> Result<R::Value>
	where
		T: ?Sized + Serialize,
	{
		value.serialize(self)
	}

	fn serialize_unit(self) -> Result<R::Value> {
		Ok(self.rt.nil_value())
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<R::Value> {
		Ok(self.rt.nil_value())
	}

	fn serialize_unit_variant(self, name: &'static str, _variant_index: u32, variant: &'static str) -> Result<R::Value> {
		Err(unsupported(format!("enum variant {name}::{variant}")))
	}

	fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<R::Value>
	where
		T: ?Sized + Serialize,
	{
		value.serialize(self)
	}

	fn serialize_newtype_variant<T>(self, name: &'static str, _variant_index: u32, variant: &'static str, _value: &T) -> Result<R::Value>
	where
		T: ?Sized + Serialize,
	{
		Err(unsupported(format!("enum variant {name}::{variant}")))
	}

	fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
		self.descend()?;
		let array = self.rt.new_array()?;
		trace!(len, depth = self.depth, "encode array");
		Ok(SeqEncoder {
			encoder: self,
			array,
			index: 0,
		})
	}

	fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_variant(
		self,
		name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant> {
		Err(unsupported(format!("enum variant {name}::{variant}")))
	}

	fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
		self.descend()?;
		let hash = self.rt.new_hash()?;
		trace!(len, depth = self.depth, "encode hash");
		Ok(MapEncoder {
			encoder: self,
			hash,
			key: None,
		})
	}

	fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
		Err(unsupported(format!("struct {name}")))
	}

	fn serialize_struct_variant(
		self,
		name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant> {
		Err(unsupported(format!("enum variant {name}::{variant}")))
	}
}

/// Array under construction for sequences and tuples.
pub struct SeqEncoder<'a, 'r, R: Runtime> {
	encoder: &'a mut Encoder<'r, R>,
	array: R::Value,
	index: usize,
}

impl<R: Runtime> SeqEncoder<'_, '_, R> {
	fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
		let item = value.serialize(&mut *self.encoder).map_err(|err| err.within(PathSegment::Index(self.index)))?;
		self.encoder.rt.array_push(&self.array, item)?;
		self.index += 1;
		Ok(())
	}

	fn finish(self) -> Result<R::Value> {
		self.encoder.ascend();
		Ok(self.array)
	}
}

impl<R: Runtime> ser::SerializeSeq for SeqEncoder<'_, '_, R> {
	type Ok = R::Value;
	type Error = BridgeError;

	fn serialize_element<T>(&mut self, value: &T) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		self.push(value)
	}

	fn end(self) -> Result<R::Value> {
		self.finish()
	}
}

impl<R: Runtime> ser::SerializeTuple for SeqEncoder<'_, '_, R> {
	type Ok = R::Value;
	type Error = BridgeError;

	fn serialize_element<T>(&mut self, value: &T) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		self.push(value)
	}

	fn end(self) -> Result<R::Value> {
		self.finish()
	}
}

impl<R: Runtime> ser::SerializeTupleStruct for SeqEncoder<'_, '_, R> {
	type Ok = R::Value;
	type Error = BridgeError;

	fn serialize_field<T>(&mut self, value: &T) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		self.push(value)
	}

	fn end(self) -> Result<R::Value> {
		self.finish()
	}
}

/// Hash under construction for maps.
pub struct MapEncoder<'a, 'r, R: Runtime> {
	encoder: &'a mut Encoder<'r, R>,
	hash: R::Value,
	key: Option<String>,
}

impl<R: Runtime> ser::SerializeMap for MapEncoder<'_, '_, R> {
	type Ok = R::Value;
	type Error = BridgeError;

	fn serialize_key<T>(&mut self, key: &T) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		self.key = Some(key.serialize(MapKeyEncoder)?);
		Ok(())
	}

	fn serialize_value<T>(&mut self, value: &T) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		let key = self
			.key
			.take()
			.ok_or_else(|| BridgeError::Message("map value serialized before its key".to_owned()))?;
		let item = value.serialize(&mut *self.encoder).map_err(|err| err.within(PathSegment::Key(key.clone())))?;
		let key = self.encoder.rt.string_value(&key);
		self.encoder.rt.hash_store(&self.hash, key, item)?;
		Ok(())
	}

	fn end(self) -> Result<R::Value> {
		self.encoder.ascend();
		Ok(self.hash)
	}
}

/// Accepts only string-like map keys.
struct MapKeyEncoder;

fn key_error(kind: impl Into<String>) -> BridgeError {
	BridgeError::UnsupportedKeyType { kind: kind.into() }
}

impl ser::Serializer for MapKeyEncoder {
	type Ok = String;
	type Error = BridgeError;

	type SerializeSeq = ser::Impossible<String, BridgeError>;
	type SerializeTuple = ser::Impossible<String, BridgeError>;
	type SerializeTupleStruct = ser::Impossible<String, BridgeError>;
	type SerializeTupleVariant = ser::Impossible<String, BridgeError>;
	type SerializeMap = ser::Impossible<String, BridgeError>;
	type SerializeStruct = ser::Impossible<String, BridgeError>;
	type SerializeStructVariant = ser::Impossible<String, BridgeError>;

	fn serialize_str(self, v: &str) -> Result<String> {
		Ok(v.to_owned())
	}

	fn serialize_char(self, v: char) -> Result<String> {
		Ok(v.to_string())
	}

	fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
	where
		T: ?Sized + Serialize,
	{
		value.serialize(self)
	}

	fn serialize_bool(self, _v: bool) -> Result<String> {
		Err(key_error("bool"))
	}

	fn serialize_i8(self, _v: i8) -> Result<String> {
		Err(key_error("i8"))
	}

	fn serialize_i16(self, _v: i16) -> Result<String> {
		Err(key_error("i16"))
	}

	fn serialize_i32(self, _v: i32) -> Result<String> {
		Err(key_error("i32"))
	}

	fn serialize_i64(self, _v: i64) -> Result<String> {
		Err(key_error("i64"))
	}

	fn serialize_u8(self, _v: u8) -> Result<String> {
		Err(key_error("u8"))
	}

	fn serialize_u16(self, _v: u16) -> Result<String> {
		Err(key_error("u16"))
	}

	fn serialize_u32(self, _v: u32) -> Result<String> {
		Err(key_error("u32"))
	}

	fn serialize_u64(self, _v: u64) -> Result<String> {
		Err(key_error("u64"))
	}

	fn serialize_f32(self, _v: f32) -> Result<String> {
		Err(key_error("f32"))
	}

	fn serialize_f64(self, _v: f64) -> Result<String> {
		Err(key_error("f64"))
	}

	fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
		Err(key_error("bytes"))
	}

	fn serialize_none(self) -> Result<String> {
		Err(key_error("none"))
	}

	fn serialize_some<T>(self, _value: &T) -> Result<String>
	where
		T: ?Sized + Serialize,
	{
		Err(key_error("option"))
	}

	fn serialize_unit(self) -> Result<String> {
		Err(key_error("unit"))
	}

	fn serialize_unit_struct(self, name: &'static str) -> Result<String> {
		Err(key_error(format!("struct {name}")))
	}

	fn serialize_unit_variant(self, name: &'static str, _variant_index: u32, variant: &'static str) -> Result<String> {
		Err(key_error(format!("enum variant {name}::{variant}")))
	}

	fn serialize_newtype_variant<T>(self, name: &'static str, _variant_index: u32, variant: &'static str, _value: &T) -> Result<String>
	where
		T: ?Sized + Serialize,
	{
		Err(key_error(format!("enum variant {name}::{variant}")))
	}

	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
		Err(key_error("sequence"))
	}

	fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
		Err(key_error("tuple"))
	}

	fn serialize_tuple_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
		Err(key_error(format!("struct {name}")))
	}

	fn serialize_tuple_variant(
		self,
		name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant> {
		Err(key_error(format!("enum variant {name}::{variant}")))
	}

	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
		Err(key_error("map"))
	}

	fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
		Err(key_error(format!("struct {name}")))
	}

	fn serialize_struct_variant(
		self,
		name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant> {
		Err(key_error(format!("enum variant {name}::{variant}")))
	}
}

#[cfg(test)]
mod tests;
