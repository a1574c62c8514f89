use std::fmt::Display;

use tracing::error;

use crate::bridge::{Result, Runtime};

/// Build a runtime exception of class `class` whose message is `err`'s display text.
pub fn try_exception<R: Runtime, E: Display + ?Sized>(rt: &mut R, class: &str, err: &E) -> Result<R::Value> {
	Ok(rt.new_exception(class, &err.to_string())?)
}

/// Like [`try_exception`], for callers with no way to report a construction failure.
///
/// # Panics
///
/// Panics when the runtime cannot construct the exception (unknown or non-exception class).
pub fn exception<R: Runtime, E: Display + ?Sized>(rt: &mut R, class: &str, err: &E) -> R::Value {
	match try_exception(rt, class, err) {
		Ok(value) => value,
		Err(failure) => {
			error!(class, error = %failure, "cannot construct runtime exception");
			panic!("cannot construct {class} exception: {failure}");
		}
	}
}

/// Wrap a host error as a `RuntimeError` for handing back to scripts.
///
/// # Panics
///
/// Panics when the runtime has no usable `RuntimeError` class.
pub fn runtime_error<R: Runtime, E: Display + ?Sized>(rt: &mut R, err: &E) -> R::Value {
	exception(rt, "RuntimeError", err)
}
