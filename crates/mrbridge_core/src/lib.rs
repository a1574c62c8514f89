//! Value bridge between an mruby-style embedded runtime and Rust host values.

/// Decoding, encoding, tag-directed unmarshal, and the reference runtime.
pub mod bridge;
