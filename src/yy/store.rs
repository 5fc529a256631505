use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{info, warn};

use crate::yy::descriptor::{Descriptor, DescriptorId, DescriptorSource};
use crate::yy::parse::parse;
use crate::yy::resolve::{ProjectIndex, ResolveContext, ResourceKind, reference_parts, resolve};
use crate::yy::schema::SchemaRegistry;
use crate::yy::serialize::{FormatStyle, serialize};
use crate::yy::validate::{Violation, validate_descriptor};
use crate::yy::value::Value;
use crate::yy::{Result, YyError};

/// Orchestrator owning the `(kind, name) -> descriptor` mapping.
///
/// Each descriptor lives behind its own lock, so mutations on one identity
/// serialize while unrelated descriptors load, validate, and save in
/// parallel. The project index is an immutable snapshot swapped wholesale;
/// every resolution reads one consistent snapshot.
pub struct DescriptorStore {
	resources: RwLock<HashMap<DescriptorId, Arc<Mutex<Descriptor>>>>,
	index: RwLock<Arc<ProjectIndex>>,
	registry: SchemaRegistry,
	style: FormatStyle,
}

impl DescriptorStore {
	/// Empty store over a schema registry, with the default format style.
	pub fn new(registry: SchemaRegistry) -> Self {
		Self {
			resources: RwLock::new(HashMap::new()),
			index: RwLock::new(Arc::new(ProjectIndex::new())),
			registry,
			style: FormatStyle::default(),
		}
	}

	/// The schema registry in use.
	pub fn registry(&self) -> &SchemaRegistry {
		&self.registry
	}

	/// Swap in a new project index snapshot.
	pub fn set_index(&self, index: ProjectIndex) {
		*write_lock(&self.index) = Arc::new(index);
	}

	/// Current index snapshot.
	pub fn index_snapshot(&self) -> Arc<ProjectIndex> {
		read_lock(&self.index).clone()
	}

	/// Read and register the descriptor file at `root`/`rel_path`.
	///
	/// File I/O happens before any descriptor lock is taken. A file that
	/// fails to parse is still registered, marked unparseable with its raw
	/// text preserved untouched; only I/O failures error out.
	pub fn load(&self, root: &Path, rel_path: &str) -> Result<Descriptor> {
		let text = fs::read_to_string(root.join(rel_path))?;
		self.load_text(rel_path, &text)
	}

	/// Register descriptor text under a project-relative path.
	pub fn load_text(&self, rel_path: &str, text: &str) -> Result<Descriptor> {
		let file_stem = file_stem_of(rel_path)?;

		let (source, warnings) = match parse(text) {
			Ok(parsed) if parsed.value.as_object().is_some() => (DescriptorSource::Parsed(parsed.value), parsed.warnings),
			Ok(parsed) => {
				let error = YyError::RootNotObject {
					found: parsed.value.kind_name(),
				};
				(
					DescriptorSource::Unparseable {
						raw: text.to_owned(),
						error: error.to_string(),
					},
					Vec::new(),
				)
			}
			Err(error @ (YyError::Parse { .. } | YyError::DepthExceeded { .. })) => (
				DescriptorSource::Unparseable {
					raw: text.to_owned(),
					error: error.to_string(),
				},
				Vec::new(),
			),
			Err(error) => return Err(error),
		};

		let kind = match &source {
			DescriptorSource::Parsed(tree) => kind_of_tree(tree, rel_path),
			DescriptorSource::Unparseable { .. } => {
				ResourceKind::of_path(rel_path).unwrap_or(ResourceKind::Other(String::new()))
			}
		};

		let id = DescriptorId {
			kind,
			name: file_stem.clone(),
		};
		let descriptor = Descriptor::new(id.clone(), rel_path.to_owned(), file_stem, source, warnings);

		match descriptor.source() {
			DescriptorSource::Parsed(_) => info!(id = %id, path = rel_path, "loaded descriptor"),
			DescriptorSource::Unparseable { error, .. } => {
				warn!(id = %id, path = rel_path, error = %error, "descriptor failed to parse; raw text preserved");
			}
		}

		write_lock(&self.resources).insert(id, Arc::new(Mutex::new(descriptor.clone())));
		Ok(descriptor)
	}

	/// Snapshot of one descriptor, if held.
	pub fn get(&self, kind: &ResourceKind, name: &str) -> Option<Descriptor> {
		let entry = self.entry(kind, name)?;
		let guard = entry_lock(&entry);
		Some(guard.clone())
	}

	/// Identities of every held descriptor, ordered by kind then name.
	pub fn ids(&self) -> Vec<DescriptorId> {
		let mut out: Vec<_> = read_lock(&self.resources).keys().cloned().collect();
		out.sort_by(|left, right| left.kind.cmp(&right.kind).then_with(|| left.name.cmp(&right.name)));
		out
	}

	/// Drop a descriptor from the store. References elsewhere now dangle
	/// and surface on their next resolution; they are never silently
	/// dropped.
	pub fn remove(&self, kind: &ResourceKind, name: &str) -> Option<Descriptor> {
		let id = DescriptorId {
			kind: kind.clone(),
			name: name.to_owned(),
		};
		let entry = write_lock(&self.resources).remove(&id)?;
		let descriptor = entry_lock(&entry).clone();
		info!(id = %id, "removed descriptor");
		Some(descriptor)
	}

	/// Full per-descriptor report: parse warnings, name consistency,
	/// schema validation, and reference resolution against the current
	/// index snapshot.
	pub fn diagnostics(&self, kind: &ResourceKind, name: &str) -> Result<Vec<Violation>> {
		let entry = self.entry(kind, name).ok_or_else(|| not_found(kind, name))?;
		let guard = entry_lock(&entry);
		Ok(self.diagnose(&guard))
	}

	/// Reports for every held descriptor, ordered by identity. One
	/// descriptor's failures never abort its siblings.
	pub fn diagnose_all(&self) -> Vec<(DescriptorId, Vec<Violation>)> {
		self.ids()
			.into_iter()
			.filter_map(|id| {
				let violations = self.diagnostics(&id.kind, &id.name).ok()?;
				Some((id, violations))
			})
			.collect()
	}

	/// Apply an edit to one descriptor's tree, keeping it schema-valid.
	///
	/// The edit runs on a copy; if it changes `resourceType` or introduces
	/// any fatal violation, the edit is rejected and the stored tree is
	/// untouched. Warnings never block.
	pub fn mutate<F>(&self, kind: &ResourceKind, name: &str, edit: F) -> Result<()>
	where
		F: FnOnce(&mut Value),
	{
		let entry = self.entry(kind, name).ok_or_else(|| not_found(kind, name))?;
		let mut guard = entry_lock(&entry);

		let Some(tree) = guard.tree() else {
			return Err(YyError::Unparseable { name: name.to_owned() });
		};

		let before_type = resource_type_of(tree);
		let mut candidate = tree.clone();
		edit(&mut candidate);

		let after_type = resource_type_of(&candidate);
		if before_type != after_type {
			warn!(id = %guard.id(), "mutation rejected: resourceType changed");
			return Err(YyError::ResourceTypeChanged {
				from: before_type.unwrap_or_default(),
				to: after_type.unwrap_or_default(),
			});
		}

		let violations = self.violations_for(&guard, &candidate);
		let fatal: Vec<_> = violations.into_iter().filter(Violation::is_fatal).collect();
		if !fatal.is_empty() {
			warn!(id = %guard.id(), fatal = fatal.len(), "mutation rejected");
			return Err(YyError::MutationRejected { violations: fatal });
		}

		if let Some(slot) = guard.tree_mut() {
			*slot = candidate;
		}
		info!(id = %guard.id(), "mutation committed");
		Ok(())
	}

	/// Serialize one descriptor, refusing while fatal violations are
	/// outstanding.
	pub fn save(&self, kind: &ResourceKind, name: &str) -> Result<String> {
		let entry = self.entry(kind, name).ok_or_else(|| not_found(kind, name))?;
		let guard = entry_lock(&entry);

		let violations = self.diagnose(&guard);
		let fatal: Vec<_> = violations.into_iter().filter(Violation::is_fatal).collect();
		if !fatal.is_empty() {
			warn!(id = %guard.id(), fatal = fatal.len(), "save refused");
			return Err(YyError::NotSavable { violations: fatal });
		}

		// diagnose() passing implies the tree is present and parsed.
		let tree = guard.tree().ok_or_else(|| YyError::Unparseable { name: name.to_owned() })?;
		let text = serialize(tree, &self.style);
		info!(id = %guard.id(), bytes = text.len(), "serialized descriptor");
		Ok(text)
	}

	/// Rewrite stale reference paths from the current index snapshot.
	///
	/// The explicit repair counterpart to resolution's report-only stance:
	/// every reference whose name is indexed under the kind its path implies
	/// gets its path field rewritten to the indexed one. Returns how many
	/// references were rewritten; dangling names are left for reporting.
	pub fn repair_references(&self, kind: &ResourceKind, name: &str) -> Result<usize> {
		let index = self.index_snapshot();
		let entry = self.entry(kind, name).ok_or_else(|| not_found(kind, name))?;
		let mut guard = entry_lock(&entry);

		let Some(tree) = guard.tree_mut() else {
			return Err(YyError::Unparseable { name: name.to_owned() });
		};

		let repaired = repair_tree(tree, &index);
		if repaired > 0 {
			info!(id = %guard.id(), repaired, "repaired stale reference paths");
		}
		Ok(repaired)
	}

	fn entry(&self, kind: &ResourceKind, name: &str) -> Option<Arc<Mutex<Descriptor>>> {
		let id = DescriptorId {
			kind: kind.clone(),
			name: name.to_owned(),
		};
		read_lock(&self.resources).get(&id).cloned()
	}

	fn diagnose(&self, descriptor: &Descriptor) -> Vec<Violation> {
		let mut out = descriptor.intrinsic_violations();
		if let Some(tree) = descriptor.tree() {
			out.extend(self.violations_for(descriptor, tree));
		}
		out
	}

	fn violations_for(&self, descriptor: &Descriptor, tree: &Value) -> Vec<Violation> {
		let index = self.index_snapshot();
		let id = descriptor.id();

		let mut out = validate_descriptor(tree, &self.registry);
		out.extend(resolve(
			tree,
			&index,
			Some(ResolveContext {
				kind: &id.kind,
				name: &id.name,
			}),
		));

		if let Some(name) = tree.as_object().and_then(|object| object.get("name")).and_then(Value::as_str)
			&& name != descriptor.file_stem()
		{
			out.push(Violation {
				path: "name".to_owned(),
				kind: crate::yy::validate::ViolationKind::NameMismatch {
					file_stem: descriptor.file_stem().to_owned(),
					name: name.to_owned(),
				},
			});
		}

		out
	}
}

fn repair_tree(value: &mut Value, index: &ProjectIndex) -> usize {
	match value {
		Value::Object(object) => {
			if let Some((name, path)) = reference_parts(object).map(|(name, path)| (name.to_owned(), path.to_owned())) {
				let Some(kind) = ResourceKind::of_path(&path) else {
					return 0;
				};
				return match index.lookup(&kind, &name) {
					Some(indexed) if indexed != path => {
						let indexed = indexed.to_owned();
						object.set("path", Value::String(indexed));
						1
					}
					_ => 0,
				};
			}

			let mut repaired = 0;
			for idx in 0..object.len() {
				// Index-based walk keeps the borrow local to each member.
				let key = object.entries()[idx].key.clone();
				if let Some(member) = object.get_mut(&key) {
					repaired += repair_tree(member, index);
				}
			}
			repaired
		}
		Value::Array(items) => items.iter_mut().map(|item| repair_tree(item, index)).sum(),
		_ => 0,
	}
}

fn kind_of_tree(tree: &Value, rel_path: &str) -> ResourceKind {
	if let Some(resource_type) = tree.as_object().and_then(|object| object.get("resourceType")).and_then(Value::as_str) {
		return ResourceKind::parse_resource_type(resource_type);
	}
	ResourceKind::of_path(rel_path).unwrap_or(ResourceKind::Other(String::new()))
}

fn resource_type_of(tree: &Value) -> Option<String> {
	tree.as_object()?.get("resourceType")?.as_str().map(str::to_owned)
}

fn file_stem_of(rel_path: &str) -> Result<String> {
	let base = rel_path.rsplit('/').next().unwrap_or(rel_path);
	let stem = base.strip_suffix(".yy").unwrap_or(base);
	if stem.is_empty() {
		return Err(YyError::InvalidDescriptorPath {
			path: rel_path.to_owned(),
		});
	}
	Ok(stem.to_owned())
}

fn not_found(kind: &ResourceKind, name: &str) -> YyError {
	YyError::NotFound {
		kind: kind.to_string(),
		name: name.to_owned(),
	}
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
	lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
	lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn entry_lock(entry: &Arc<Mutex<Descriptor>>) -> MutexGuard<'_, Descriptor> {
	entry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
	use super::DescriptorStore;
	use crate::yy::YyError;
	use crate::yy::resolve::{ProjectIndex, ResourceKind};
	use crate::yy::schema::SchemaRegistry;
	use crate::yy::validate::ViolationKind;
	use crate::yy::value::{Number, Value};

	const SCRIPT: &str = "{\n  \"resourceType\": \"GMScript\",\n  \"resourceVersion\": \"1.0\",\n  \"name\": \"scr_move\",\n  \"isDnD\": false,\n  \"parent\": {\n    \"name\": \"Scripts\",\n    \"path\": \"folders/Scripts.yy\",\n  },\n  \"tags\": [],\n}\n";

	fn store_with_script() -> DescriptorStore {
		let store = DescriptorStore::new(SchemaRegistry::builtin());
		let mut index = ProjectIndex::new();
		index.insert(ResourceKind::Script, "scr_move", "scripts/scr_move/scr_move.yy");
		index.insert(ResourceKind::Folder, "Scripts", "folders/Scripts.yy");
		store.set_index(index);
		store.load_text("scripts/scr_move/scr_move.yy", SCRIPT).expect("load succeeds");
		store
	}

	#[test]
	fn load_keys_by_kind_and_name() {
		let store = store_with_script();
		let descriptor = store.get(&ResourceKind::Script, "scr_move").expect("held");
		assert_eq!(descriptor.path(), "scripts/scr_move/scr_move.yy");
		assert_eq!(descriptor.resource_type(), Some("GMScript"));
	}

	#[test]
	fn clean_descriptor_has_no_diagnostics_and_saves() {
		let store = store_with_script();
		let violations = store.diagnostics(&ResourceKind::Script, "scr_move").expect("held");
		assert!(violations.is_empty(), "unexpected: {violations:?}");
		assert_eq!(store.save(&ResourceKind::Script, "scr_move").expect("savable"), SCRIPT);
	}

	#[test]
	fn rejected_mutation_leaves_tree_untouched() {
		let store = store_with_script();
		let before = store.get(&ResourceKind::Script, "scr_move").expect("held");

		let err = store
			.mutate(&ResourceKind::Script, "scr_move", |tree| {
				if let Some(object) = tree.as_object_mut() {
					object.remove("resourceVersion");
					object.set("isDnD", Value::Number(Number::Int(1)));
				}
			})
			.expect_err("fatal violations reject");

		match err {
			YyError::MutationRejected { violations } => {
				assert_eq!(violations.len(), 2);
			}
			other => panic!("unexpected error {other:?}"),
		}

		let after = store.get(&ResourceKind::Script, "scr_move").expect("held");
		assert_eq!(before.tree(), after.tree());
	}

	#[test]
	fn warning_only_mutation_commits() {
		let store = store_with_script();
		store
			.mutate(&ResourceKind::Script, "scr_move", |tree| {
				if let Some(object) = tree.as_object_mut() {
					object.set("futureField", Value::Bool(true));
				}
			})
			.expect("warnings do not block");

		let after = store.get(&ResourceKind::Script, "scr_move").expect("held");
		assert!(after.tree().and_then(Value::as_object).is_some_and(|object| object.get("futureField").is_some()));
	}

	#[test]
	fn resource_type_is_immutable_under_mutation() {
		let store = store_with_script();
		let err = store
			.mutate(&ResourceKind::Script, "scr_move", |tree| {
				if let Some(object) = tree.as_object_mut() {
					object.set("resourceType", Value::String("GMSound".to_owned()));
				}
			})
			.expect_err("resourceType is immutable");
		assert!(matches!(err, YyError::ResourceTypeChanged { .. }));
	}

	#[test]
	fn renaming_the_name_field_is_rejected_as_mismatch() {
		let store = store_with_script();
		let err = store
			.mutate(&ResourceKind::Script, "scr_move", |tree| {
				if let Some(object) = tree.as_object_mut() {
					object.set("name", Value::String("scr_other".to_owned()));
				}
			})
			.expect_err("name must match file base name");
		match err {
			YyError::MutationRejected { violations } => {
				assert!(violations.iter().any(|violation| matches!(&violation.kind, ViolationKind::NameMismatch { .. })));
			}
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn broken_reference_introduced_by_edit_is_rejected() {
		let store = store_with_script();
		let err = store
			.mutate(&ResourceKind::Script, "scr_move", |tree| {
				if let Some(parent) = tree.as_object_mut().and_then(|object| object.get_mut("parent")).and_then(Value::as_object_mut) {
					parent.set("path", Value::String("folders/Elsewhere.yy".to_owned()));
				}
			})
			.expect_err("drifted reference rejects");
		assert!(matches!(err, YyError::MutationRejected { .. }));
	}

	#[test]
	fn unparseable_text_is_registered_with_raw_preserved_and_not_savable() {
		let store = DescriptorStore::new(SchemaRegistry::builtin());
		let raw = "{\"name\": \"obj_broken\", !!!";
		store.load_text("objects/obj_broken/obj_broken.yy", raw).expect("load registers");

		let descriptor = store.get(&ResourceKind::Object, "obj_broken").expect("held");
		assert!(!descriptor.is_parsed());
		match descriptor.source() {
			crate::yy::descriptor::DescriptorSource::Unparseable { raw: kept, .. } => assert_eq!(kept, raw),
			other => panic!("unexpected source {other:?}"),
		}

		assert!(matches!(
			store.save(&ResourceKind::Object, "obj_broken"),
			Err(YyError::NotSavable { .. })
		));
	}

	#[test]
	fn removing_a_target_dangles_references_on_next_resolve() {
		let store = store_with_script();
		let mut index = ProjectIndex::new();
		index.insert(ResourceKind::Script, "scr_move", "scripts/scr_move/scr_move.yy");
		// Folder entry gone: the parent reference now dangles.
		store.set_index(index);

		let violations = store.diagnostics(&ResourceKind::Script, "scr_move").expect("held");
		assert_eq!(violations.len(), 1);
		assert!(matches!(&violations[0].kind, ViolationKind::BrokenReference { name, .. } if name == "Scripts"));
	}

	#[test]
	fn repair_rewrites_stale_paths_from_index() {
		let store = store_with_script();
		let mut index = ProjectIndex::new();
		index.insert(ResourceKind::Script, "scr_move", "scripts/scr_move/scr_move.yy");
		index.insert(ResourceKind::Folder, "Scripts", "folders/Code/Scripts.yy");
		store.set_index(index);

		let repaired = store.repair_references(&ResourceKind::Script, "scr_move").expect("held");
		assert_eq!(repaired, 1);

		let violations = store.diagnostics(&ResourceKind::Script, "scr_move").expect("held");
		assert!(violations.is_empty(), "unexpected: {violations:?}");
	}
}
