use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::bridge::{BridgeError, Discriminant, ElementFailure, PathSegment, Result, Runtime, ValuePath};

/// Declared host kind of a tagged field or container element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
	/// `String`.
	Str,
	/// Any signed integer width.
	Int,
	/// `f32` / `f64`.
	Float,
	/// `bool`.
	Bool,
	/// `Vec<T>`.
	Seq(Box<Kind>),
	/// String-keyed or otherwise keyed map.
	Map(Box<Kind>, Box<Kind>),
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Kind::Str => f.write_str("string"),
			Kind::Int => f.write_str("integer"),
			Kind::Float => f.write_str("float"),
			Kind::Bool => f.write_str("bool"),
			Kind::Seq(item) => write!(f, "sequence of {item}"),
			Kind::Map(key, value) => write!(f, "map of {key} to {value}"),
		}
	}
}

/// How accessor results that do not match the declared kind are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoercionPolicy {
	/// Convert through the runtime's `to_s`/`to_i`/`to_f`, fall back to empty containers, and record
	/// failing elements as defaults.
	#[default]
	Lenient,
	/// Reject discriminant mismatches and abort on the first failing element.
	Strict,
}

/// Mutable state threaded through one unmarshal call.
#[derive(Debug)]
pub struct Coercion {
	policy: CoercionPolicy,
	max_depth: u32,
	depth: u32,
	field: &'static str,
	path: ValuePath,
	failures: Vec<ElementFailure>,
}

impl Coercion {
	pub(crate) fn new(policy: CoercionPolicy, max_depth: u32) -> Self {
		Self {
			policy,
			max_depth,
			depth: 0,
			field: "",
			path: ValuePath::root(),
			failures: Vec::new(),
		}
	}

	pub(crate) fn begin_field(&mut self, field: &'static str) {
		self.field = field;
		self.depth = 0;
		self.path = ValuePath::root();
	}

	pub(crate) fn into_failures(self) -> Vec<ElementFailure> {
		self.failures
	}

	/// Active policy.
	pub fn policy(&self) -> CoercionPolicy {
		self.policy
	}

	/// Under [`CoercionPolicy::Strict`], fail unless `value` has one of the `accepted` discriminants.
	/// Always succeeds under [`CoercionPolicy::Lenient`].
	pub fn accept<R: Runtime>(&self, rt: &R, value: &R::Value, kind: &Kind, accepted: &[Discriminant]) -> Result<()> {
		let got = rt.type_of(value);
		if self.policy == CoercionPolicy::Lenient || accepted.contains(&got) {
			return Ok(());
		}
		Err(BridgeError::TypeMismatch {
			expected: kind.to_string(),
			got,
		})
	}

	/// Run `body` one container level deeper, failing once the depth budget is spent.
	pub fn container<T>(&mut self, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
		if self.depth >= self.max_depth {
			return Err(BridgeError::DepthExceeded { max_depth: self.max_depth });
		}
		self.depth += 1;
		let out = body(self);
		self.depth -= 1;
		out
	}

	/// Coerce one container element located at `segment`.
	///
	/// Lenient failures are recorded and replaced by `T::default()`; strict failures propagate with
	/// their path attached.
	pub fn element<T: Coerce, R: Runtime>(&mut self, rt: &R, value: &R::Value, segment: PathSegment) -> Result<T> {
		self.path.push(segment.clone());
		let out = T::coerce(rt, value, self);
		let path = self.path.clone();
		self.path.steps.pop();

		match out {
			Ok(item) => Ok(item),
			Err(err) if self.policy == CoercionPolicy::Strict => Err(err.within(segment)),
			Err(err) => {
				warn!(field = self.field, path = %path, error = %err, "element coercion failed, using default");
				self.failures.push(ElementFailure {
					field: self.field,
					path,
					error: err,
				});
				Ok(T::default())
			}
		}
	}

	fn fallback<R: Runtime>(&self, rt: &R, value: &R::Value, kind: &Kind, accepted: Discriminant) -> Result<()> {
		self.accept(rt, value, kind, &[accepted])?;
		trace!(field = self.field, path = %self.path, got = %rt.type_of(value), expected = %kind, "empty container fallback");
		Ok(())
	}
}

/// Host types a tagged field (or one of its elements) may be declared as.
pub trait Coerce: Default {
	/// Declared kind, used in schema listings and mismatch errors.
	fn kind() -> Kind;

	/// Convert an accessor result (or container element) into `Self`.
	fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self>;
}

impl Coerce for String {
	fn kind() -> Kind {
		Kind::Str
	}

	fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
		cx.accept(rt, value, &Kind::Str, &[Discriminant::String])?;
		Ok(rt.to_s(value))
	}
}

macro_rules! coerce_int {
	($($ty:ty),* $(,)?) => {
		$(
			impl Coerce for $ty {
				fn kind() -> Kind {
					Kind::Int
				}

				fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
					cx.accept(rt, value, &Kind::Int, &[Discriminant::Integer])?;
					// Narrowing wraps like a C cast.
					Ok(rt.to_i(value) as $ty)
				}
			}
		)*
	};
}

coerce_int!(i8, i16, i32, i64, isize);

macro_rules! coerce_float {
	($($ty:ty),* $(,)?) => {
		$(
			impl Coerce for $ty {
				fn kind() -> Kind {
					Kind::Float
				}

				fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
					cx.accept(rt, value, &Kind::Float, &[Discriminant::Float, Discriminant::Integer])?;
					Ok(rt.to_f(value) as $ty)
				}
			}
		)*
	};
}

coerce_float!(f32, f64);

impl Coerce for bool {
	fn kind() -> Kind {
		Kind::Bool
	}

	fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
		cx.accept(rt, value, &Kind::Bool, &[Discriminant::True, Discriminant::False])?;
		Ok(rt.type_of(value).is_truthy())
	}
}

impl<T: Coerce> Coerce for Vec<T> {
	fn kind() -> Kind {
		Kind::Seq(Box::new(T::kind()))
	}

	fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
		if rt.type_of(value) != Discriminant::Array {
			cx.fallback(rt, value, &Self::kind(), Discriminant::Array)?;
			return Ok(Vec::new());
		}
		cx.container(|cx| {
			let items = rt.array_items(value)?;
			let mut out: Vec<T> = Vec::with_capacity(items.len());
			for (index, item) in items.iter().enumerate() {
				out.push(cx.element(rt, item, PathSegment::Index(index))?);
			}
			Ok(out)
		})
	}
}

/// Coerced entries of a runtime hash in enumeration order; empty when a non-Hash is tolerated.
fn coerce_entries<K: Coerce, V: Coerce, R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion, kind: &Kind) -> Result<Vec<(K, V)>> {
	if rt.type_of(value) != Discriminant::Hash {
		cx.fallback(rt, value, kind, Discriminant::Hash)?;
		return Ok(Vec::new());
	}
	cx.container(|cx| {
		let entries = rt.hash_entries(value)?;
		let mut out: Vec<(K, V)> = Vec::with_capacity(entries.len());
		for (key, item) in &entries {
			let segment = PathSegment::Key(rt.to_s(key));
			let key = cx.element(rt, key, segment.clone())?;
			let item = cx.element(rt, item, segment)?;
			out.push((key, item));
		}
		Ok(out)
	})
}

impl<K: Coerce + Eq + Hash, V: Coerce> Coerce for HashMap<K, V> {
	fn kind() -> Kind {
		Kind::Map(Box::new(K::kind()), Box::new(V::kind()))
	}

	fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
		Ok(coerce_entries(rt, value, cx, &Self::kind())?.into_iter().collect())
	}
}

impl<K: Coerce + Ord, V: Coerce> Coerce for BTreeMap<K, V> {
	fn kind() -> Kind {
		Kind::Map(Box::new(K::kind()), Box::new(V::kind()))
	}

	fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
		Ok(coerce_entries(rt, value, cx, &Self::kind())?.into_iter().collect())
	}
}

impl<K: Coerce + Eq + Hash, V: Coerce> Coerce for IndexMap<K, V> {
	fn kind() -> Kind {
		Kind::Map(Box::new(K::kind()), Box::new(V::kind()))
	}

	fn coerce<R: Runtime>(rt: &R, value: &R::Value, cx: &mut Coercion) -> Result<Self> {
		Ok(coerce_entries(rt, value, cx, &Self::kind())?.into_iter().collect())
	}
}
