use std::path::PathBuf;

use mrbridge::bridge::{Heap, Runtime, encode};

use crate::cmd::util::read_json;
use crate::error::CliError;

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
}

/// Encode the document and print what the runtime sees.
pub fn run(args: Args) -> Result<(), CliError> {
	let json = read_json(&args.file)?;

	let mut heap = Heap::new();
	let encoded = encode(&mut heap, &json)?;

	println!("path: {}", args.file.display());
	println!("kind: {}", heap.type_of(&encoded));
	println!("inspect: {}", heap.inspect(encoded));
	Ok(())
}
