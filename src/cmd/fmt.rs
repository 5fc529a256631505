use std::fs;
use std::path::PathBuf;

use yydoc::yy::{FormatStyle, Result, YyError, parse_value_only, serialize};

/// Reformat a descriptor file to the canonical style.
///
/// Default prints the canonical text to stdout; `--check` exits nonzero if
/// the file is not already canonical; `--write` rewrites it in place.
pub fn run(path: PathBuf, check: bool, write: bool) -> Result<()> {
	let text = fs::read_to_string(&path)?;
	let tree = parse_value_only(&text)?;
	let canonical = serialize(&tree, &FormatStyle::default());

	if check {
		if canonical != text {
			return Err(YyError::NotCanonical {
				path: path.display().to_string(),
			});
		}
		return Ok(());
	}

	if write {
		if canonical != text {
			fs::write(&path, &canonical)?;
		}
		return Ok(());
	}

	print!("{canonical}");
	Ok(())
}
