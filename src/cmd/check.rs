use std::path::PathBuf;

use serde::Serialize;

use crate::cmd::scan::scan_project;
use yydoc::yy::{DescriptorStore, SchemaRegistry, Severity, Violation, YyError};

#[derive(Serialize)]
struct ResourceReport {
	kind: String,
	name: String,
	path: String,
	violations: Vec<ViolationReport>,
}

#[derive(Serialize)]
struct ViolationReport {
	severity: Severity,
	message: String,
	#[serde(flatten)]
	violation: Violation,
}

/// Validate and resolve every descriptor under a project root.
pub fn run(root: PathBuf, json: bool) -> yydoc::yy::Result<()> {
	let (index, files) = scan_project(&root)?;
	let store = DescriptorStore::new(SchemaRegistry::builtin());
	store.set_index(index);

	// One descriptor's failure never aborts its siblings.
	let mut io_failures = Vec::new();
	for file in &files {
		if let Err(err) = store.load(&root, &file.rel_path) {
			io_failures.push((file.rel_path.clone(), err.to_string()));
		}
	}

	let mut reports = Vec::new();
	let mut fatal_total = 0_usize;
	let mut fatal_resources = 0_usize;
	let mut warning_total = 0_usize;

	for (id, violations) in store.diagnose_all() {
		let fatal = violations.iter().filter(|violation| violation.is_fatal()).count();
		fatal_total += fatal;
		if fatal > 0 {
			fatal_resources += 1;
		}
		warning_total += violations.len() - fatal;

		if violations.is_empty() {
			continue;
		}

		let descriptor = store.get(&id.kind, &id.name);
		reports.push(ResourceReport {
			kind: id.kind.to_string(),
			name: id.name.clone(),
			path: descriptor.map(|descriptor| descriptor.path().to_owned()).unwrap_or_default(),
			violations: violations
				.into_iter()
				.map(|violation| ViolationReport {
					severity: violation.severity(),
					message: violation.to_string(),
					violation,
				})
				.collect(),
		});
	}

	if json {
		let payload = serde_json::json!({
			"resources_checked": files.len(),
			"io_failures": io_failures.iter().map(|(path, error)| serde_json::json!({
				"path": path,
				"error": error,
			})).collect::<Vec<_>>(),
			"fatal": fatal_total,
			"warnings": warning_total,
			"reports": reports,
		});
		println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
	} else {
		for (path, error) in &io_failures {
			println!("{path}: io error: {error}");
		}
		for report in &reports {
			println!("{} {} ({})", report.kind, report.name, report.path);
			for violation in &report.violations {
				let marker = match violation.severity {
					Severity::Fatal => "error",
					Severity::Warning => "warning",
				};
				println!("  {marker}: {}", violation.message);
			}
		}
		println!(
			"checked {} resource(s): {} fatal, {} warning(s)",
			files.len(),
			fatal_total,
			warning_total
		);
	}

	if fatal_total > 0 {
		return Err(YyError::ChecksFailed {
			fatal: fatal_total,
			resources: fatal_resources,
		});
	}
	Ok(())
}
