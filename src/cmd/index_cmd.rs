use std::path::PathBuf;

use crate::cmd::scan::scan_project;
use yydoc::yy::Result;

/// Print the scanned `(kind, name) -> path` project index.
pub fn run(root: PathBuf, json: bool) -> Result<()> {
	let (index, _) = scan_project(&root)?;

	let mut entries: Vec<_> = index
		.iter()
		.map(|(kind, name, path)| (kind.to_string(), name.to_owned(), path.to_owned()))
		.collect();
	entries.sort();

	if json {
		let payload: Vec<_> = entries
			.iter()
			.map(|(kind, name, path)| {
				serde_json::json!({
					"kind": kind,
					"name": name,
					"path": path,
				})
			})
			.collect();
		println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
	} else {
		for (kind, name, path) in entries {
			println!("{kind}\t{name}\t{path}");
		}
	}

	Ok(())
}
