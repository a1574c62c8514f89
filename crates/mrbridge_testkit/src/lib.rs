//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Names of every `*.json` fixture, sorted.
pub fn json_fixtures() -> Vec<String> {
	let mut names: Vec<String> = std::fs::read_dir(workspace_root().join("fixtures"))
		.map(|entries| {
			entries
				.filter_map(|entry| entry.ok())
				.filter_map(|entry| entry.file_name().into_string().ok())
				.filter(|name| name.ends_with(".json"))
				.collect()
		})
		.unwrap_or_default();
	names.sort();
	names
}

/// Read and parse a JSON fixture, panicking with the fixture name on failure.
pub fn load_json_fixture(name: &str) -> serde_json::Value {
	let path = fixture_path(name);
	let text = std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("fixture {} unreadable: {err}", path.display()));
	serde_json::from_str(&text).unwrap_or_else(|err| panic!("fixture {} is not JSON: {err}", path.display()))
}
