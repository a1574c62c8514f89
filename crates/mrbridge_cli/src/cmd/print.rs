use mrbridge::bridge::Value;

/// Output truncation and formatting limits for value trees.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of entries printed for a single mapping.
	pub max_mapping_entries: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for sequences.
	pub max_sequence_items: usize,
	/// Maximum recursive print depth for nested sequences/mappings.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_mapping_entries: 80,
			max_string_len: 200,
			max_sequence_items: 16,
			max_print_depth: 6,
		}
	}
}

/// Render `value` as an indented tree, one scalar per line.
pub fn render_value(value: &Value, options: PrintOptions) -> String {
	let mut out = String::new();
	render_into(&mut out, value, 0, 0, options);
	out
}

fn render_into(out: &mut String, value: &Value, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Null => out.push_str(&format!("{pad}null\n")),
		Value::Bool(v) => out.push_str(&format!("{pad}{v}\n")),
		Value::Int(v) => out.push_str(&format!("{pad}{v}\n")),
		Value::Float(v) => out.push_str(&format!("{pad}{v:?}\n")),
		Value::String(v) => out.push_str(&format!("{pad}\"{}\"\n", truncate(v, options.max_string_len))),
		Value::Sequence(items) => {
			if depth >= options.max_print_depth {
				out.push_str(&format!("{pad}[... {} items]\n", items.len()));
				return;
			}
			out.push_str(&format!("{pad}[\n"));
			for item in items.iter().take(options.max_sequence_items) {
				render_into(out, item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_sequence_items {
				out.push_str(&format!("{pad}  ... {} more\n", items.len() - options.max_sequence_items));
			}
			out.push_str(&format!("{pad}]\n"));
		}
		Value::Mapping(entries) => {
			if depth >= options.max_print_depth {
				out.push_str(&format!("{pad}{{ ... {} entries }}\n", entries.len()));
				return;
			}
			out.push_str(&format!("{pad}{{\n"));
			for (key, item) in entries.iter().take(options.max_mapping_entries) {
				if matches!(item, Value::Sequence(_) | Value::Mapping(_)) {
					out.push_str(&format!("{pad}  {key} =\n"));
					render_into(out, item, indent + 4, depth + 1, options);
				} else {
					out.push_str(&format!("{pad}  {key} = "));
					render_into(out, item, 0, depth + 1, options);
				}
			}
			if entries.len() > options.max_mapping_entries {
				out.push_str(&format!("{pad}  ... {} more entries\n", entries.len() - options.max_mapping_entries));
			}
			out.push_str(&format!("{pad}}}\n"));
		}
	}
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
