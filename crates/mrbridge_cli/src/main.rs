#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod error;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "mrbridge", about = "Runtime value bridge round-trip and inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Encode a JSON document into a fresh heap, decode it back, and compare.
	Roundtrip(cmd::roundtrip::Args),
	/// Encode a JSON document and show the runtime-side rendering.
	Inspect(cmd::inspect::Args),
}

fn main() {
	init_tracing();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), CliError> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Roundtrip(args) => cmd::roundtrip::run(args),
		Commands::Inspect(args) => cmd::inspect::run(args),
	}
}

fn init_tracing() {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.try_init();
}
