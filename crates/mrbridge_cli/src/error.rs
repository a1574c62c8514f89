use std::path::PathBuf;

use mrbridge::bridge::BridgeError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
	/// Input file could not be read.
	#[error("cannot read {}: {source}", .path.display())]
	Io {
		/// File that failed to open.
		path: PathBuf,
		/// Underlying I/O failure.
		source: std::io::Error,
	},
	/// Input was not valid JSON or could not be rendered as JSON.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Bridge conversion failed.
	#[error(transparent)]
	Bridge(#[from] BridgeError),
	/// Decoded tree differs from the input.
	#[error("round-trip mismatch for {}", .path.display())]
	Mismatch {
		/// Input file.
		path: PathBuf,
	},
}
