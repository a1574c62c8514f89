use std::path::PathBuf;

use mrbridge::bridge::{DecodeOptions, EncodeOptions, Heap, Value, decode_with, encode_with};
use serde::Serialize;

use crate::cmd::print::{PrintOptions, render_value};
use crate::cmd::util::{emit_json, read_json};
use crate::error::CliError;

/// Floats pass through six-digit fixed-point text on the way in.
const FLOAT_EPSILON: f64 = 1e-6;

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth", default_value_t = 128)]
	pub max_depth: u32,
}

#[derive(Serialize)]
struct Report<'a> {
	path: String,
	ok: bool,
	objects: usize,
	value: &'a Value,
}

/// Encode the document into a fresh heap, decode it back, and report whether the trees agree.
pub fn run(args: Args) -> Result<(), CliError> {
	let json = read_json(&args.file)?;
	let expected: Value = serde_json::from_value(json.clone())?;

	let mut heap = Heap::new();
	let encoded = encode_with(&mut heap, &json, &EncodeOptions { max_depth: args.max_depth })?;
	let decoded = decode_with(&heap, &encoded, &DecodeOptions { max_depth: args.max_depth })?;
	let ok = decoded.approx_eq(&expected, FLOAT_EPSILON);

	if args.json {
		emit_json(&Report {
			path: args.file.display().to_string(),
			ok,
			objects: heap.object_count(),
			value: &decoded,
		})?;
	} else {
		println!("path: {}", args.file.display());
		println!("roundtrip: {}", if ok { "ok" } else { "mismatch" });
		println!("objects: {}", heap.object_count());
		println!("decoded:");
		print!("{}", render_value(&decoded, PrintOptions::default()));
	}

	if !ok {
		return Err(CliError::Mismatch { path: args.file });
	}
	Ok(())
}
