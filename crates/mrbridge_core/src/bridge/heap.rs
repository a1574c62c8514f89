use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::bridge::{Discriminant, Runtime, RuntimeException};

/// Handle to a value stored in a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef(u32);

impl ObjRef {
	const NIL: ObjRef = ObjRef(0);
	const FALSE: ObjRef = ObjRef(1);
	const TRUE: ObjRef = ObjRef(2);

	fn index(self) -> usize {
		self.0 as usize
	}
}

/// Host-defined method body: `(heap, receiver, args) -> result`.
pub type Method = Rc<dyn Fn(&mut Heap, ObjRef, &[ObjRef]) -> Result<ObjRef, RuntimeException>>;

#[derive(Debug, Clone)]
enum Object {
	Nil,
	False,
	True,
	Integer(i64),
	Float(f64),
	String(String),
	Symbol(String),
	Array(Vec<ObjRef>),
	Hash(IndexMap<HashKey, (ObjRef, ObjRef)>),
	Instance { class: String, ivars: IndexMap<String, ObjRef> },
	Exception { class: String, message: String },
}

/// Lookup key of a hash entry. Scalars compare by value, everything else by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum HashKey {
	String(String),
	Symbol(String),
	Integer(i64),
	Float(u64),
	Identity(ObjRef),
}

#[derive(Default)]
struct Class {
	attrs: Vec<String>,
	methods: IndexMap<String, Method>,
	exception: bool,
}

const BUILTIN_EXCEPTIONS: [&str; 8] = [
	"StandardError",
	"RuntimeError",
	"ArgumentError",
	"TypeError",
	"NameError",
	"NoMethodError",
	"SyntaxError",
	"IndexError",
];

/// In-memory runtime with Ruby-like value semantics.
///
/// Values live in an append-only arena and are never collected. The heap holds host closures behind
/// `Rc`, so it stays on the thread that created it.
pub struct Heap {
	objects: Vec<Object>,
	classes: IndexMap<String, Class>,
}

impl Default for Heap {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Heap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Heap")
			.field("objects", &self.objects.len())
			.field("classes", &self.classes.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl Heap {
	/// Empty heap with the builtin exception classes registered.
	pub fn new() -> Self {
		let mut classes = IndexMap::new();
		for name in BUILTIN_EXCEPTIONS {
			classes.insert(
				name.to_owned(),
				Class {
					exception: true,
					..Class::default()
				},
			);
		}
		Self {
			objects: vec![Object::Nil, Object::False, Object::True],
			classes,
		}
	}

	/// Number of values allocated so far, including the nil/true/false singletons.
	pub fn object_count(&self) -> usize {
		self.objects.len()
	}

	/// New Integer.
	pub fn integer(&mut self, value: i64) -> ObjRef {
		self.alloc(Object::Integer(value))
	}

	/// New Float.
	pub fn float(&mut self, value: f64) -> ObjRef {
		self.alloc(Object::Float(value))
	}

	/// New String.
	pub fn string(&mut self, text: &str) -> ObjRef {
		self.alloc(Object::String(text.to_owned()))
	}

	/// New Symbol.
	pub fn symbol(&mut self, name: &str) -> ObjRef {
		self.alloc(Object::Symbol(name.to_owned()))
	}

	/// New Array holding `items`.
	pub fn array(&mut self, items: Vec<ObjRef>) -> ObjRef {
		self.alloc(Object::Array(items))
	}

	/// New Hash holding `entries`; later duplicates replace earlier ones.
	pub fn hash(&mut self, entries: Vec<(ObjRef, ObjRef)>) -> ObjRef {
		let hash = self.alloc(Object::Hash(IndexMap::with_capacity(entries.len())));
		for (key, value) in entries {
			self.store_entry(hash, key, value);
		}
		hash
	}

	/// Register (or extend) class `name` with attribute accessors.
	pub fn define_class(&mut self, name: &str, attrs: &[&str]) {
		let class = self.classes.entry(name.to_owned()).or_default();
		for attr in attrs {
			if !class.attrs.iter().any(|known| known == attr) {
				class.attrs.push((*attr).to_owned());
			}
		}
	}

	/// Register a host-defined method on class `class`, creating the class if needed.
	pub fn define_method<F>(&mut self, class: &str, name: &str, body: F)
	where
		F: Fn(&mut Heap, ObjRef, &[ObjRef]) -> Result<ObjRef, RuntimeException> + 'static,
	{
		let method: Method = Rc::new(body);
		self.classes.entry(class.to_owned()).or_default().methods.insert(name.to_owned(), method);
	}

	/// Forget class `name`. Returns whether it existed.
	pub fn remove_class(&mut self, name: &str) -> bool {
		self.classes.shift_remove(name).is_some()
	}

	/// New instance of `class` with no instance variables set.
	pub fn instantiate(&mut self, class: &str) -> Result<ObjRef, RuntimeException> {
		if !self.classes.contains_key(class) {
			return Err(uninitialized_constant(class));
		}
		Ok(self.alloc(Object::Instance {
			class: class.to_owned(),
			ivars: IndexMap::new(),
		}))
	}

	/// Set instance variable `name` on `object`.
	pub fn set_ivar(&mut self, object: ObjRef, name: &str, value: ObjRef) -> Result<(), RuntimeException> {
		if let Object::Instance { ivars, .. } = &mut self.objects[object.index()] {
			ivars.insert(name.to_owned(), value);
			return Ok(());
		}
		Err(RuntimeException::new(
			"TypeError",
			format!("can't set instance variable on {}", self.class_of(object)),
		))
	}

	/// Class name and message of an exception value.
	pub fn exception_parts(&self, value: ObjRef) -> Option<(&str, &str)> {
		match &self.objects[value.index()] {
			Object::Exception { class, message } => Some((class, message)),
			_ => None,
		}
	}

	/// Ruby-like `inspect` rendering; cycles render as `[...]` / `{...}`.
	pub fn inspect(&self, value: ObjRef) -> String {
		let mut out = String::new();
		self.inspect_into(value, &mut Vec::new(), &mut out);
		out
	}

	fn alloc(&mut self, object: Object) -> ObjRef {
		let index = u32::try_from(self.objects.len()).unwrap_or(u32::MAX);
		self.objects.push(object);
		ObjRef(index)
	}

	fn class_of(&self, value: ObjRef) -> String {
		match &self.objects[value.index()] {
			Object::Nil => "NilClass".to_owned(),
			Object::False => "FalseClass".to_owned(),
			Object::True => "TrueClass".to_owned(),
			Object::Integer(_) => "Integer".to_owned(),
			Object::Float(_) => "Float".to_owned(),
			Object::String(_) => "String".to_owned(),
			Object::Symbol(_) => "Symbol".to_owned(),
			Object::Array(_) => "Array".to_owned(),
			Object::Hash(_) => "Hash".to_owned(),
			Object::Instance { class, .. } | Object::Exception { class, .. } => class.clone(),
		}
	}

	fn hash_key(&self, key: ObjRef) -> HashKey {
		match &self.objects[key.index()] {
			Object::String(text) => HashKey::String(text.clone()),
			Object::Symbol(name) => HashKey::Symbol(name.clone()),
			Object::Integer(number) => HashKey::Integer(*number),
			// -0.0 and 0.0 are the same key.
			Object::Float(number) if *number == 0.0 => HashKey::Float(0.0f64.to_bits()),
			Object::Float(number) => HashKey::Float(number.to_bits()),
			_ => HashKey::Identity(key),
		}
	}

	/// Insert or overwrite; an existing entry keeps its original key object and position.
	fn store_entry(&mut self, hash: ObjRef, key: ObjRef, value: ObjRef) {
		let lookup = self.hash_key(key);
		if let Object::Hash(entries) = &mut self.objects[hash.index()] {
			entries.entry(lookup).and_modify(|entry| entry.1 = value).or_insert((key, value));
		}
	}

	fn lookup(&self, entries: &IndexMap<HashKey, (ObjRef, ObjRef)>, key: ObjRef) -> ObjRef {
		entries.get(&self.hash_key(key)).map(|(_, value)| *value).unwrap_or(ObjRef::NIL)
	}

	fn inspect_into(&self, value: ObjRef, stack: &mut Vec<ObjRef>, out: &mut String) {
		match &self.objects[value.index()] {
			Object::String(text) => out.push_str(&format!("{text:?}")),
			Object::Symbol(name) => {
				out.push(':');
				out.push_str(name);
			}
			Object::Array(items) => {
				if stack.contains(&value) {
					out.push_str("[...]");
					return;
				}
				stack.push(value);
				out.push('[');
				for (position, item) in items.iter().enumerate() {
					if position > 0 {
						out.push_str(", ");
					}
					self.inspect_into(*item, stack, out);
				}
				out.push(']');
				stack.pop();
			}
			Object::Hash(entries) => {
				if stack.contains(&value) {
					out.push_str("{...}");
					return;
				}
				stack.push(value);
				out.push('{');
				for (position, (key, item)) in entries.values().enumerate() {
					if position > 0 {
						out.push_str(", ");
					}
					self.inspect_into(*key, stack, out);
					out.push_str(" => ");
					self.inspect_into(*item, stack, out);
				}
				out.push('}');
				stack.pop();
			}
			Object::Instance { class, ivars } => {
				if stack.contains(&value) {
					out.push_str(&format!("#<{class} ...>"));
					return;
				}
				stack.push(value);
				out.push_str("#<");
				out.push_str(class);
				for (position, (name, item)) in ivars.iter().enumerate() {
					out.push_str(if position == 0 { " @" } else { ", @" });
					out.push_str(name);
					out.push('=');
					self.inspect_into(*item, stack, out);
				}
				out.push('>');
				stack.pop();
			}
			Object::Exception { class, message } => out.push_str(&format!("#<{class}: {message}>")),
			Object::Nil => out.push_str("nil"),
			_ => out.push_str(&self.to_s(&value)),
		}
	}

	fn call_builtin(&mut self, receiver: ObjRef, name: &str, args: &[ObjRef]) -> Result<ObjRef, RuntimeException> {
		match (name, &self.objects[receiver.index()]) {
			("push", Object::Array(_)) => {
				if let Object::Array(items) = &mut self.objects[receiver.index()] {
					items.extend_from_slice(args);
				}
				Ok(receiver)
			}
			("store", Object::Hash(_)) => {
				check_arity(args, 2)?;
				self.store_entry(receiver, args[0], args[1]);
				Ok(args[1])
			}
			("keys", Object::Hash(entries)) => {
				check_arity(args, 0)?;
				let keys = entries.values().map(|(key, _)| *key).collect();
				Ok(self.array(keys))
			}
			("[]", Object::Array(items)) => {
				check_arity(args, 1)?;
				let Object::Integer(index) = self.objects[args[0].index()] else {
					return Err(RuntimeException::new(
						"TypeError",
						format!("no implicit conversion of {} into Integer", self.class_of(args[0])),
					));
				};
				let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
				let position = if index < 0 { index + len } else { index };
				Ok(usize::try_from(position).ok().and_then(|position| items.get(position).copied()).unwrap_or(ObjRef::NIL))
			}
			("[]", Object::Hash(entries)) => {
				check_arity(args, 1)?;
				Ok(self.lookup(entries, args[0]))
			}
			("length" | "size", Object::Array(items)) => {
				let len = items.len();
				Ok(self.integer(i64::try_from(len).unwrap_or(i64::MAX)))
			}
			("length" | "size", Object::Hash(entries)) => {
				let len = entries.len();
				Ok(self.integer(i64::try_from(len).unwrap_or(i64::MAX)))
			}
			("length" | "size", Object::String(text)) => {
				let len = text.chars().count();
				Ok(self.integer(i64::try_from(len).unwrap_or(i64::MAX)))
			}
			("message", Object::Exception { message, .. }) => {
				let message = message.clone();
				Ok(self.string(&message))
			}
			("to_s", _) => {
				let text = self.to_s(&receiver);
				Ok(self.string(&text))
			}
			("inspect", _) => {
				let text = self.inspect(receiver);
				Ok(self.string(&text))
			}
			("class", _) => {
				let class = self.class_of(receiver);
				Ok(self.string(&class))
			}
			("nil?", object) => {
				let is_nil = matches!(object, Object::Nil);
				Ok(self.bool_value(is_nil))
			}
			_ => Err(no_method(name, &self.class_of(receiver), receiver == ObjRef::NIL)),
		}
	}
}

impl Runtime for Heap {
	type Value = ObjRef;

	fn type_of(&self, value: &ObjRef) -> Discriminant {
		match &self.objects[value.index()] {
			Object::Nil => Discriminant::Nil,
			Object::False => Discriminant::False,
			Object::True => Discriminant::True,
			Object::Integer(_) => Discriminant::Integer,
			Object::Float(_) => Discriminant::Float,
			Object::String(_) => Discriminant::String,
			Object::Array(_) => Discriminant::Array,
			Object::Hash(_) => Discriminant::Hash,
			Object::Symbol(_) | Object::Instance { .. } | Object::Exception { .. } => Discriminant::Other,
		}
	}

	fn class_name(&self, value: &ObjRef) -> String {
		self.class_of(*value)
	}

	fn to_s(&self, value: &ObjRef) -> String {
		match &self.objects[value.index()] {
			Object::Nil => String::new(),
			Object::False => "false".to_owned(),
			Object::True => "true".to_owned(),
			Object::Integer(number) => number.to_string(),
			Object::Float(number) => float_to_s(*number),
			Object::String(text) | Object::Symbol(text) => text.clone(),
			Object::Exception { message, .. } => message.clone(),
			Object::Instance { class, .. } => format!("#<{class}>"),
			Object::Array(_) | Object::Hash(_) => self.inspect(*value),
		}
	}

	fn to_i(&self, value: &ObjRef) -> i64 {
		match &self.objects[value.index()] {
			Object::Integer(number) => *number,
			Object::Float(number) if number.is_nan() => 0,
			Object::Float(number) => number.trunc() as i64,
			Object::String(text) => leading_integer(text),
			_ => 0,
		}
	}

	fn to_f(&self, value: &ObjRef) -> f64 {
		match &self.objects[value.index()] {
			Object::Float(number) => *number,
			Object::Integer(number) => *number as f64,
			Object::String(text) => leading_float(text),
			_ => 0.0,
		}
	}

	fn array_items(&self, array: &ObjRef) -> Result<Vec<ObjRef>, RuntimeException> {
		match &self.objects[array.index()] {
			Object::Array(items) => Ok(items.clone()),
			_ => Err(type_error("Array", &self.class_of(*array))),
		}
	}

	fn hash_entries(&self, hash: &ObjRef) -> Result<Vec<(ObjRef, ObjRef)>, RuntimeException> {
		match &self.objects[hash.index()] {
			Object::Hash(entries) => Ok(entries.values().copied().collect()),
			_ => Err(type_error("Hash", &self.class_of(*hash))),
		}
	}

	fn nil_value(&mut self) -> ObjRef {
		ObjRef::NIL
	}

	fn bool_value(&mut self, value: bool) -> ObjRef {
		if value { ObjRef::TRUE } else { ObjRef::FALSE }
	}

	fn string_value(&mut self, text: &str) -> ObjRef {
		self.string(text)
	}

	fn load_literal(&mut self, source: &str) -> Result<ObjRef, RuntimeException> {
		let source = source.trim();
		match source {
			"nil" => return Ok(ObjRef::NIL),
			"true" => return Ok(ObjRef::TRUE),
			"false" => return Ok(ObjRef::FALSE),
			_ => {}
		}
		if !is_numeric_literal(source) {
			return Err(RuntimeException::new("SyntaxError", format!("unexpected token in literal `{source}`")));
		}
		if !source.contains(['.', 'e', 'E'])
			&& let Ok(number) = source.parse::<i64>()
		{
			return Ok(self.integer(number));
		}
		source
			.parse::<f64>()
			.map(|number| self.float(number))
			.map_err(|_| RuntimeException::new("SyntaxError", format!("invalid numeric literal `{source}`")))
	}

	fn new_array(&mut self) -> Result<ObjRef, RuntimeException> {
		Ok(self.array(Vec::new()))
	}

	fn array_push(&mut self, array: &ObjRef, item: ObjRef) -> Result<(), RuntimeException> {
		self.call_builtin(*array, "push", &[item]).map(|_| ())
	}

	fn new_hash(&mut self) -> Result<ObjRef, RuntimeException> {
		Ok(self.hash(Vec::new()))
	}

	fn hash_store(&mut self, hash: &ObjRef, key: ObjRef, value: ObjRef) -> Result<(), RuntimeException> {
		self.call_builtin(*hash, "store", &[key, value]).map(|_| ())
	}

	fn call_method(&mut self, receiver: &ObjRef, name: &str, args: &[ObjRef]) -> Result<ObjRef, RuntimeException> {
		let receiver = *receiver;
		let class_name = match &self.objects[receiver.index()] {
			Object::Instance { class, .. } => Some(class.clone()),
			_ => None,
		};
		let Some(class_name) = class_name else {
			return self.call_builtin(receiver, name, args);
		};

		let (method, is_reader, is_writer) = match self.classes.get(&class_name) {
			Some(class) => {
				let writer_attr = name.strip_suffix('=');
				(
					class.methods.get(name).cloned(),
					class.attrs.iter().any(|attr| attr == name),
					writer_attr.is_some_and(|attr| class.attrs.iter().any(|known| known == attr)),
				)
			}
			None => (None, false, false),
		};

		if let Some(method) = method {
			return (*method)(self, receiver, args);
		}
		if is_reader {
			check_arity(args, 0)?;
			return Ok(match &self.objects[receiver.index()] {
				Object::Instance { ivars, .. } => ivars.get(name).copied().unwrap_or(ObjRef::NIL),
				_ => ObjRef::NIL,
			});
		}
		if is_writer {
			check_arity(args, 1)?;
			let attr = name.trim_end_matches('=');
			self.set_ivar(receiver, attr, args[0])?;
			return Ok(args[0]);
		}
		self.call_builtin(receiver, name, args)
	}

	fn new_exception(&mut self, class: &str, message: &str) -> Result<ObjRef, RuntimeException> {
		match self.classes.get(class) {
			None => Err(uninitialized_constant(class)),
			Some(found) if !found.exception => Err(RuntimeException::new("TypeError", "exception class/object expected")),
			Some(_) => Ok(self.alloc(Object::Exception {
				class: class.to_owned(),
				message: message.to_owned(),
			})),
		}
	}
}

fn check_arity(args: &[ObjRef], expected: usize) -> Result<(), RuntimeException> {
	if args.len() == expected {
		return Ok(());
	}
	Err(RuntimeException::new(
		"ArgumentError",
		format!("wrong number of arguments (given {}, expected {expected})", args.len()),
	))
}

fn no_method(name: &str, class: &str, is_nil: bool) -> RuntimeException {
	let target = if is_nil { "nil".to_owned() } else { format!("an instance of {class}") };
	RuntimeException::new("NoMethodError", format!("undefined method '{name}' for {target}"))
}

fn type_error(expected: &str, got: &str) -> RuntimeException {
	RuntimeException::new("TypeError", format!("expected {expected}, got {got}"))
}

fn uninitialized_constant(name: &str) -> RuntimeException {
	RuntimeException::new("NameError", format!("uninitialized constant {name}"))
}

/// Ruby `Float#to_s`: plain decimals for exponents in `-4..16`, otherwise `1.0e+20` form.
fn float_to_s(number: f64) -> String {
	if number.is_nan() {
		return "NaN".to_owned();
	}
	if number.is_infinite() {
		return if number > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() };
	}
	let scientific = format!("{number:e}");
	let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
	let exponent: i32 = exponent.parse().unwrap_or(0);
	if number == 0.0 || (-4..16).contains(&exponent) {
		return with_fraction(number.to_string());
	}
	let sign = if exponent < 0 { '-' } else { '+' };
	format!("{}e{sign}{:02}", with_fraction(mantissa.to_owned()), exponent.unsigned_abs())
}

fn with_fraction(mut digits: String) -> String {
	if !digits.contains('.') {
		digits.push_str(".0");
	}
	digits
}

fn is_numeric_literal(source: &str) -> bool {
	let digits = source.strip_prefix(['-', '+']).unwrap_or(source);
	digits.starts_with(|ch: char| ch.is_ascii_digit())
		&& digits.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '-' | '+'))
}

fn numeric_prefix(text: &str, allow_fraction: bool) -> &str {
	let text = text.trim_start();
	let bytes = text.as_bytes();
	let mut end = 0;
	if matches!(bytes.first(), Some(b'-' | b'+')) {
		end = 1;
	}
	let digits_start = end;
	while end < bytes.len() && bytes[end].is_ascii_digit() {
		end += 1;
	}
	if allow_fraction && end > digits_start && end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
		end += 1;
		while end < bytes.len() && bytes[end].is_ascii_digit() {
			end += 1;
		}
	}
	if end == digits_start { "" } else { &text[..end] }
}

fn leading_integer(text: &str) -> i64 {
	numeric_prefix(text, false).parse().unwrap_or(0)
}

fn leading_float(text: &str) -> f64 {
	numeric_prefix(text, true).parse().unwrap_or(0.0)
}
