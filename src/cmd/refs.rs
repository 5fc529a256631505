use std::fs;
use std::path::PathBuf;

use crate::cmd::scan::{file_stem, scan_project};
use yydoc::yy::{ResolveContext, Result, ResourceKind, ViolationKind, collect_references, parse_value_only, resolve};

/// List outbound references per descriptor, with resolution status.
pub fn run(root: PathBuf, file: Option<String>, broken_only: bool) -> Result<()> {
	let (index, files) = scan_project(&root)?;

	let selected: Vec<String> = match file {
		Some(rel_path) => vec![rel_path],
		None => files.into_iter().map(|file| file.rel_path).collect(),
	};

	for rel_path in selected {
		let text = fs::read_to_string(root.join(&rel_path))?;
		let tree = match parse_value_only(&text) {
			Ok(tree) => tree,
			Err(err) => {
				println!("{rel_path}: {err}");
				continue;
			}
		};

		let kind = ResourceKind::of_path(&rel_path);
		let name = file_stem(&rel_path).unwrap_or_default();
		let ctx = kind.as_ref().map(|kind| ResolveContext { kind, name });

		let violations = resolve(&tree, &index, ctx);
		for site in collect_references(&tree) {
			let at_site = |kind_matches: fn(&ViolationKind) -> bool| {
				violations
					.iter()
					.any(|violation| violation.path == site.location && kind_matches(&violation.kind))
			};
			let status = if at_site(|kind| matches!(kind, ViolationKind::BrokenReference { .. })) {
				"broken"
			} else if at_site(|kind| matches!(kind, ViolationKind::SelfReference { .. })) {
				"self"
			} else {
				"ok"
			};

			if broken_only && status == "ok" {
				continue;
			}
			println!("{rel_path}  {} -> {} ({}) [{status}]", site.location, site.name, site.path);
		}
	}

	Ok(())
}
