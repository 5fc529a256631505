use std::fs;
use std::path::PathBuf;

use yydoc::yy::{FormatStyle, Result, parse, serialize};

/// Print one descriptor's parsed tree in canonical form.
///
/// `--json` emits strict JSON (no trailing commas) for downstream tools;
/// both modes preserve the file's key order.
pub fn run(path: PathBuf, json: bool) -> Result<()> {
	let text = fs::read_to_string(&path)?;
	let parsed = parse(&text)?;

	for warning in &parsed.warnings {
		eprintln!("warning: {warning}");
	}

	let style = if json {
		FormatStyle {
			trailing_commas: false,
			..FormatStyle::default()
		}
	} else {
		FormatStyle::default()
	};

	print!("{}", serialize(&parsed.value, &style));
	Ok(())
}
