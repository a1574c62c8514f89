use std::fmt;

/// One step from a container to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
	/// Array element by zero-based index.
	Index(usize),
	/// Hash entry by string key.
	Key(String),
}

/// Location of a nested value relative to the value passed to a conversion.
///
/// Rendered as `$` for the root, followed by `[index]` and `["key"]` selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuePath {
	/// Ordered steps from the root.
	pub steps: Vec<PathSegment>,
}

impl ValuePath {
	/// Path pointing at the root value.
	pub fn root() -> Self {
		Self::default()
	}

	/// Whether this path has no steps.
	pub fn is_root(&self) -> bool {
		self.steps.is_empty()
	}

	/// Append a step at the leaf end.
	pub fn push(&mut self, segment: PathSegment) {
		self.steps.push(segment);
	}

	pub(crate) fn prepend(&mut self, segment: PathSegment) {
		self.steps.insert(0, segment);
	}
}

impl From<PathSegment> for ValuePath {
	fn from(segment: PathSegment) -> Self {
		Self { steps: vec![segment] }
	}
}

impl fmt::Display for ValuePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("$")?;
		for step in &self.steps {
			match step {
				PathSegment::Index(index) => write!(f, "[{index}]")?,
				PathSegment::Key(key) => write!(f, "[{key:?}]")?,
			}
		}
		Ok(())
	}
}
