use tracing::{debug, trace};

use crate::bridge::{BridgeError, ElementFailure, Result, Runtime};

mod coerce;

pub use self::coerce::{Coerce, Coercion, CoercionPolicy, Kind};

/// Settings for [`unmarshal_with`].
#[derive(Debug, Clone)]
pub struct UnmarshalOptions {
	/// How mismatched accessor results are handled.
	pub policy: CoercionPolicy,
	/// Maximum container nesting inside one field value.
	pub max_depth: u32,
}

impl Default for UnmarshalOptions {
	fn default() -> Self {
		Self {
			policy: CoercionPolicy::Lenient,
			max_depth: 32,
		}
	}
}

impl UnmarshalOptions {
	/// Strict coercion with the default depth budget.
	pub fn strict() -> Self {
		Self {
			policy: CoercionPolicy::Strict,
			..Self::default()
		}
	}
}

/// Outcome of a successful [`unmarshal_with`].
#[derive(Debug, Default)]
pub struct UnmarshalReport {
	/// Container elements that were replaced by their default under lenient coercion.
	pub failures: Vec<ElementFailure>,
}

impl UnmarshalReport {
	/// Whether every element coerced cleanly.
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}

	/// Turn recorded element failures into [`BridgeError::PartialCoercion`].
	pub fn into_result(self) -> Result<()> {
		if self.failures.is_empty() {
			return Ok(());
		}
		Err(BridgeError::PartialCoercion { failures: self.failures })
	}
}

/// Static description of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
	/// Rust field name.
	pub name: &'static str,
	/// Accessor method named by the mapping tag; `None` for untagged fields.
	pub tag: Option<&'static str>,
	/// Declared kind of a tagged field.
	pub kind: Option<Kind>,
}

/// Receives each field of a [`Record`] in declaration order.
pub trait FieldVisitor {
	/// Field `name` is populated from accessor `tag`.
	fn tagged<T: Coerce>(&mut self, name: &'static str, tag: &'static str, slot: &mut T) -> Result<()>;

	/// Field `name` carries no mapping tag.
	fn untagged(&mut self, name: &'static str);
}

/// Host record whose tagged fields can be populated from a runtime object.
///
/// Normally implemented through [`record!`](crate::record).
pub trait Record {
	/// Type name used in error messages.
	const TYPE_NAME: &'static str;

	/// Hand every field to `visitor` in declaration order.
	fn visit_fields<V: FieldVisitor>(&mut self, visitor: &mut V) -> Result<()>;

	/// Field listing in declaration order.
	///
	/// Fails only when a hand-written `visit_fields` returns an error of its own.
	fn schema(&mut self) -> Result<Vec<FieldSpec>>
	where
		Self: Sized,
	{
		let mut collector = SchemaCollector::default();
		self.visit_fields(&mut collector)?;
		Ok(collector.fields)
	}
}

/// Declare a struct and implement [`Record`](crate::bridge::Record) for it.
///
/// Fields followed by `=> "accessor"` are populated by calling that zero-argument method on the runtime
/// object; other fields are left alone.
///
/// Tags must be plain method names (identifier characters with an optional trailing `?` or `!`).
/// Operator methods such as `[]` or `<=>` and setters ending in `=` take arguments, so they are
/// rejected with [`BridgeError::InvalidTarget`](crate::bridge::BridgeError::InvalidTarget).
///
/// ```
/// mrbridge::record! {
/// 	#[derive(Debug, Default)]
/// 	pub struct Planet {
/// 		pub id: i64 => "id",
/// 		pub name: String => "name",
/// 		pub moon: Vec<String> => "moon",
/// 		pub note: String,
/// 	}
/// }
/// ```
#[macro_export]
macro_rules! record {
	(@visit $visitor:ident, $this:ident, $field:ident, $tag:literal) => {
		$visitor.tagged(::core::stringify!($field), $tag, &mut $this.$field)?;
	};
	(@visit $visitor:ident, $this:ident, $field:ident) => {
		$visitor.untagged(::core::stringify!($field));
	};
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident {
			$(
				$(#[$fmeta:meta])*
				$fvis:vis $field:ident : $ty:ty $(=> $tag:literal)?
			),* $(,)?
		}
	) => {
		$(#[$meta])*
		$vis struct $name {
			$(
				$(#[$fmeta])*
				$fvis $field: $ty,
			)*
		}

		impl $crate::bridge::Record for $name {
			const TYPE_NAME: &'static str = ::core::stringify!($name);

			fn visit_fields<V: $crate::bridge::FieldVisitor>(&mut self, visitor: &mut V) -> $crate::bridge::Result<()> {
				$(
					$crate::record!(@visit visitor, self, $field $(, $tag)?);
				)*
				::core::result::Result::Ok(())
			}
		}
	};
}

#[derive(Default)]
struct SchemaCollector {
	fields: Vec<FieldSpec>,
}

impl FieldVisitor for SchemaCollector {
	fn tagged<T: Coerce>(&mut self, name: &'static str, tag: &'static str, _slot: &mut T) -> Result<()> {
		self.fields.push(FieldSpec {
			name,
			tag: Some(tag),
			kind: Some(T::kind()),
		});
		Ok(())
	}

	fn untagged(&mut self, name: &'static str) {
		self.fields.push(FieldSpec { name, tag: None, kind: None });
	}
}

struct Populate<'a, R: Runtime> {
	rt: &'a mut R,
	object: &'a R::Value,
	cx: Coercion,
}

impl<R: Runtime> FieldVisitor for Populate<'_, R> {
	fn tagged<T: Coerce>(&mut self, name: &'static str, tag: &'static str, slot: &mut T) -> Result<()> {
		trace!(field = name, accessor = tag, "unmarshal field");
		let value = self
			.rt
			.call_method(self.object, tag, &[])
			.map_err(|source| BridgeError::Accessor {
				field: name,
				accessor: tag,
				source,
			})?;

		self.cx.begin_field(name);
		*slot = T::coerce(&*self.rt, &value, &mut self.cx).map_err(|err| BridgeError::Field {
			field: name,
			source: Box::new(err),
		})?;
		Ok(())
	}

	fn untagged(&mut self, name: &'static str) {
		trace!(field = name, "skip untagged field");
	}
}

/// Populate `target` from `object` with lenient coercion.
///
/// Element failures fall back to defaults silently; use [`unmarshal_with`] to see them.
pub fn unmarshal<R: Runtime, T: Record>(rt: &mut R, object: &R::Value, target: &mut T) -> Result<()> {
	unmarshal_with(rt, object, target, &UnmarshalOptions::default()).map(|_| ())
}

/// Populate the tagged fields of `target` by calling their accessors on `object`.
///
/// The schema is checked before any accessor runs. Fields are filled in declaration order and an
/// accessor failure aborts the call, leaving earlier fields populated.
pub fn unmarshal_with<R: Runtime, T: Record>(rt: &mut R, object: &R::Value, target: &mut T, opt: &UnmarshalOptions) -> Result<UnmarshalReport> {
	let fields = target.schema()?;
	validate_schema(T::TYPE_NAME, &fields)?;
	debug!(record = T::TYPE_NAME, fields = fields.len(), policy = ?opt.policy, "unmarshal");

	let mut populate = Populate {
		rt,
		object,
		cx: Coercion::new(opt.policy, opt.max_depth),
	};
	target.visit_fields(&mut populate)?;
	Ok(UnmarshalReport {
		failures: populate.cx.into_failures(),
	})
}

fn validate_schema(type_name: &'static str, fields: &[FieldSpec]) -> Result<()> {
	for (index, field) in fields.iter().enumerate() {
		if fields[..index].iter().any(|earlier| earlier.name == field.name) {
			return Err(BridgeError::InvalidTarget {
				type_name,
				reason: format!("duplicate field `{}`", field.name),
			});
		}
		if let Some(tag) = field.tag
			&& !is_accessor_name(tag)
		{
			return Err(BridgeError::InvalidTarget {
				type_name,
				reason: format!("field `{}` has malformed accessor tag {tag:?}", field.name),
			});
		}
	}
	Ok(())
}

/// Ruby method name: identifier characters, optionally ending in `?` or `!`.
fn is_accessor_name(tag: &str) -> bool {
	let body = tag.strip_suffix(['?', '!']).unwrap_or(tag);
	let mut chars = body.chars();
	let Some(first) = chars.next() else {
		return false;
	};
	(first.is_alphabetic() || first == '_') && chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}
