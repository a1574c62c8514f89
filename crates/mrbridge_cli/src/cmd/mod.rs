/// Runtime-side rendering command.
pub mod inspect;
/// Tree printer shared by commands.
pub mod print;
/// Encode/decode round-trip command.
pub mod roundtrip;
/// Input helpers shared by commands.
pub mod util;
