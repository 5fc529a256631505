use std::fs;
use std::path::Path;

use yydoc::yy::{ProjectIndex, Result, ResourceKind, Value, parse_value_only};

/// One discovered descriptor file, path relative to the project root.
pub(crate) struct ScannedFile {
	/// Forward-slash relative path.
	pub rel_path: String,
}

/// Walk a project root for `.yy` descriptor files and build the
/// `(kind, name) -> path` index the core consumes.
///
/// Folders are virtual: they have no backing `.yy` file and are declared in
/// the project's `.yyp` manifest, which uses the same relaxed-JSON grammar.
pub(crate) fn scan_project(root: &Path) -> Result<(ProjectIndex, Vec<ScannedFile>)> {
	let mut index = ProjectIndex::new();
	let mut files = Vec::new();

	walk(root, "", &mut files)?;

	for file in &files {
		let Some(kind) = ResourceKind::of_path(&file.rel_path) else {
			continue;
		};
		if let Some(stem) = file_stem(&file.rel_path) {
			index.insert(kind, stem, file.rel_path.clone());
		}
	}

	index_manifest_folders(root, &mut index)?;

	Ok((index, files))
}

fn walk(dir: &Path, prefix: &str, out: &mut Vec<ScannedFile>) -> Result<()> {
	let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
	entries.sort_by_key(std::fs::DirEntry::file_name);

	for entry in entries {
		let name = entry.file_name();
		let Some(name) = name.to_str() else {
			continue;
		};
		if name.starts_with('.') {
			continue;
		}

		let rel = if prefix.is_empty() { name.to_owned() } else { format!("{prefix}/{name}") };
		let path = entry.path();
		if path.is_dir() {
			walk(&path, &rel, out)?;
		} else if name.ends_with(".yy") {
			out.push(ScannedFile { rel_path: rel });
		}
	}

	Ok(())
}

fn index_manifest_folders(root: &Path, index: &mut ProjectIndex) -> Result<()> {
	let Some(manifest) = find_manifest(root)? else {
		return Ok(());
	};

	let text = fs::read_to_string(manifest)?;
	let Ok(tree) = parse_value_only(&text) else {
		// A broken manifest only costs folder resolution; resource files
		// still index from the directory walk.
		return Ok(());
	};

	let folders = tree
		.as_object()
		.and_then(|object| object.get("Folders"))
		.and_then(Value::as_array)
		.unwrap_or_default();

	for folder in folders {
		let Some(object) = folder.as_object() else {
			continue;
		};
		let (Some(name), Some(folder_path)) = (
			object.get("name").and_then(Value::as_str),
			object.get("folderPath").and_then(Value::as_str),
		) else {
			continue;
		};
		index.insert(ResourceKind::Folder, name, folder_path);
	}

	Ok(())
}

fn find_manifest(root: &Path) -> Result<Option<std::path::PathBuf>> {
	for entry in fs::read_dir(root)? {
		let entry = entry?;
		let path = entry.path();
		if path.extension().is_some_and(|ext| ext == "yyp") {
			return Ok(Some(path));
		}
	}
	Ok(None)
}

pub(crate) fn file_stem(rel_path: &str) -> Option<&str> {
	let base = rel_path.rsplit('/').next()?;
	let stem = base.strip_suffix(".yy").unwrap_or(base);
	if stem.is_empty() { None } else { Some(stem) }
}
