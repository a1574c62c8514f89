use std::path::Path;

use crate::error::CliError;

/// Read and parse a JSON document.
pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
	let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	Ok(serde_json::from_str(&text)?)
}

/// Pretty-print `value` as JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
