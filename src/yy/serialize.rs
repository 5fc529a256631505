use std::fmt::Write as _;

use crate::yy::value::{Number, Value};

/// Formatting conventions for serialized descriptor text.
///
/// The defaults reproduce the descriptor flavor this crate manages: two-space
/// indentation, one member per line, a trailing comma after every element
/// including the last, empty containers inline, LF endings, and a final
/// newline after the root. Text produced with a given style re-parses and
/// re-serializes to itself byte-for-byte.
#[derive(Debug, Clone)]
pub struct FormatStyle {
	/// Indentation unit emitted per nesting level.
	pub indent: &'static str,
	/// Emit a comma after the last element of objects and arrays.
	pub trailing_commas: bool,
	/// Emit a newline after the root value.
	pub final_newline: bool,
}

impl Default for FormatStyle {
	fn default() -> Self {
		Self {
			indent: "  ",
			trailing_commas: true,
			final_newline: true,
		}
	}
}

/// Serialize a value tree to descriptor text.
///
/// Object keys and array elements are emitted in tree order, so a tree
/// untouched since parsing keeps its original ordering.
pub fn serialize(value: &Value, style: &FormatStyle) -> String {
	let mut out = String::new();
	write_value(&mut out, value, style, 0);
	if style.final_newline {
		out.push('\n');
	}
	out
}

fn write_value(out: &mut String, value: &Value, style: &FormatStyle, depth: usize) {
	match value {
		Value::Null => out.push_str("null"),
		Value::Bool(true) => out.push_str("true"),
		Value::Bool(false) => out.push_str("false"),
		Value::Number(number) => write_number(out, *number),
		Value::String(text) => write_string(out, text),
		Value::Array(items) => write_array(out, items, style, depth),
		Value::Object(object) => write_object(out, object, style, depth),
	}
}

fn write_object(out: &mut String, object: &crate::yy::value::Object, style: &FormatStyle, depth: usize) {
	if object.is_empty() {
		out.push_str("{}");
		return;
	}

	out.push_str("{\n");
	let last = object.len() - 1;
	for (idx, entry) in object.entries().iter().enumerate() {
		write_indent(out, style, depth + 1);
		write_string(out, &entry.key);
		out.push_str(": ");
		write_value(out, &entry.value, style, depth + 1);
		if style.trailing_commas || idx < last {
			out.push(',');
		}
		out.push('\n');
	}
	write_indent(out, style, depth);
	out.push('}');
}

fn write_array(out: &mut String, items: &[Value], style: &FormatStyle, depth: usize) {
	if items.is_empty() {
		out.push_str("[]");
		return;
	}

	out.push_str("[\n");
	let last = items.len() - 1;
	for (idx, item) in items.iter().enumerate() {
		write_indent(out, style, depth + 1);
		write_value(out, item, style, depth + 1);
		if style.trailing_commas || idx < last {
			out.push(',');
		}
		out.push('\n');
	}
	write_indent(out, style, depth);
	out.push(']');
}

fn write_indent(out: &mut String, style: &FormatStyle, depth: usize) {
	for _ in 0..depth {
		out.push_str(style.indent);
	}
}

fn write_number(out: &mut String, number: Number) {
	match number {
		Number::Int(value) => {
			let _ = write!(out, "{value}");
		}
		Number::Float(value) => {
			let _ = write!(out, "{value}");
		}
	}
}

fn write_string(out: &mut String, text: &str) {
	out.push('"');
	for ch in text.chars() {
		match ch {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			'\u{0008}' => out.push_str("\\b"),
			'\u{000C}' => out.push_str("\\f"),
			ch if (ch as u32) < 0x20 => {
				let _ = write!(out, "\\u{:04x}", ch as u32);
			}
			ch => out.push(ch),
		}
	}
	out.push('"');
}
