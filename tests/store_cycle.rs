#![allow(missing_docs)]

use std::fs;

use yydoc::yy::{
	DescriptorStore, Number, ProjectIndex, ResourceKind, SchemaRegistry, Value, ViolationKind, YyError,
	parse_value_only,
};

const OBJ_PARENT: &str = r#"{
  "resourceType": "GMObject",
  "resourceVersion": "1.0",
  "name": "obj_arrow_parent",
  "solid": false,
  "visible": true,
  "persistent": false,
  "physicsObject": false,
  "eventList": [],
  "parent": null,
  "tags": [],
}
"#;

const BROKEN: &str = "{\n  \"resourceType\": \"GMObject\",\n  \"name\": \"obj_broken\"";

fn project_index() -> ProjectIndex {
	let mut index = ProjectIndex::new();
	index.insert(
		ResourceKind::Object,
		"obj_arrow_parent",
		"objects/obj_arrow_parent/obj_arrow_parent.yy",
	);
	index
}

#[test]
fn on_disk_load_then_save_is_byte_identical() {
	let dir = tempfile::tempdir().expect("tempdir");
	let object_dir = dir.path().join("objects/obj_arrow_parent");
	fs::create_dir_all(&object_dir).expect("mkdir");
	fs::write(object_dir.join("obj_arrow_parent.yy"), OBJ_PARENT).expect("write fixture");

	let store = DescriptorStore::new(SchemaRegistry::builtin());
	store.set_index(project_index());

	let descriptor = store
		.load(dir.path(), "objects/obj_arrow_parent/obj_arrow_parent.yy")
		.expect("load succeeds");
	assert!(descriptor.is_parsed());

	let saved = store.save(&ResourceKind::Object, "obj_arrow_parent").expect("savable");
	assert_eq!(saved, OBJ_PARENT);
}

#[test]
fn unparseable_file_keeps_raw_text_and_never_rewrites() {
	let dir = tempfile::tempdir().expect("tempdir");
	let object_dir = dir.path().join("objects/obj_broken");
	fs::create_dir_all(&object_dir).expect("mkdir");
	fs::write(object_dir.join("obj_broken.yy"), BROKEN).expect("write fixture");

	let store = DescriptorStore::new(SchemaRegistry::builtin());
	let descriptor = store
		.load(dir.path(), "objects/obj_broken/obj_broken.yy")
		.expect("load registers unparseable text");
	assert!(!descriptor.is_parsed());

	match descriptor.source() {
		yydoc::yy::DescriptorSource::Unparseable { raw, .. } => assert_eq!(raw, BROKEN),
		other => panic!("unexpected source {other:?}"),
	}

	assert!(matches!(
		store.save(&ResourceKind::Object, "obj_broken"),
		Err(YyError::NotSavable { .. })
	));
	// The on-disk text was never touched by the failed load.
	let on_disk = fs::read_to_string(object_dir.join("obj_broken.yy")).expect("read back");
	assert_eq!(on_disk, BROKEN);
}

#[test]
fn mutate_then_save_round_trips_through_parse() {
	let store = DescriptorStore::new(SchemaRegistry::builtin());
	store.set_index(project_index());
	store
		.load_text("objects/obj_arrow_parent/obj_arrow_parent.yy", OBJ_PARENT)
		.expect("load succeeds");

	store
		.mutate(&ResourceKind::Object, "obj_arrow_parent", |tree| {
			if let Some(object) = tree.as_object_mut() {
				object.set("visible", Value::Bool(false));
			}
		})
		.expect("valid edit commits");

	let saved = store.save(&ResourceKind::Object, "obj_arrow_parent").expect("savable");
	assert!(saved.contains("\"visible\": false,"));

	// The saved text is itself a fixed point of the load/save cycle.
	let store2 = DescriptorStore::new(SchemaRegistry::builtin());
	store2.set_index(project_index());
	store2
		.load_text("objects/obj_arrow_parent/obj_arrow_parent.yy", &saved)
		.expect("reload succeeds");
	let resaved = store2.save(&ResourceKind::Object, "obj_arrow_parent").expect("savable");
	assert_eq!(resaved, saved);
}

#[test]
fn non_finite_number_edit_never_reaches_saved_text() {
	let store = DescriptorStore::new(SchemaRegistry::builtin());
	store.set_index(project_index());
	store
		.load_text("objects/obj_arrow_parent/obj_arrow_parent.yy", OBJ_PARENT)
		.expect("load succeeds");

	let err = store
		.mutate(&ResourceKind::Object, "obj_arrow_parent", |tree| {
			if let Some(object) = tree.as_object_mut() {
				object.set("physicsDensity", Value::Number(Number::Float(f64::NAN)));
			}
		})
		.expect_err("NaN has no literal form");
	match err {
		YyError::MutationRejected { violations } => {
			assert!(violations.iter().any(|violation| {
				matches!(&violation.kind, ViolationKind::NonFiniteNumber { .. }) && violation.path == "physicsDensity"
			}));
		}
		other => panic!("unexpected error {other:?}"),
	}

	// The stored tree is untouched and its saved text still reloads.
	let saved = store.save(&ResourceKind::Object, "obj_arrow_parent").expect("savable");
	assert_eq!(saved, OBJ_PARENT);
	parse_value_only(&saved).expect("saved text reloads");
}

#[test]
fn missing_resource_type_blocks_save_with_missing_field() {
	let store = DescriptorStore::new(SchemaRegistry::builtin());
	store
		.load_text("objects/obj_x/obj_x.yy", "{\n  \"name\": \"obj_x\",\n}\n")
		.expect("load succeeds");

	match store.save(&ResourceKind::Object, "obj_x") {
		Err(YyError::NotSavable { violations }) => {
			assert_eq!(violations.len(), 1);
			assert!(matches!(
				&violations[0].kind,
				ViolationKind::MissingField { field } if field == "resourceType"
			));
		}
		other => panic!("unexpected result {other:?}"),
	}
}

#[test]
fn sibling_failures_do_not_abort_a_batch() {
	let dir = tempfile::tempdir().expect("tempdir");
	let parent_dir = dir.path().join("objects/obj_arrow_parent");
	let broken_dir = dir.path().join("objects/obj_broken");
	fs::create_dir_all(&parent_dir).expect("mkdir");
	fs::create_dir_all(&broken_dir).expect("mkdir");
	fs::write(parent_dir.join("obj_arrow_parent.yy"), OBJ_PARENT).expect("write fixture");
	fs::write(broken_dir.join("obj_broken.yy"), BROKEN).expect("write fixture");

	let store = DescriptorStore::new(SchemaRegistry::builtin());
	store.set_index(project_index());
	store
		.load(dir.path(), "objects/obj_arrow_parent/obj_arrow_parent.yy")
		.expect("load succeeds");
	store
		.load(dir.path(), "objects/obj_broken/obj_broken.yy")
		.expect("load registers unparseable text");

	let reports = store.diagnose_all();
	assert_eq!(reports.len(), 2);

	let clean = reports
		.iter()
		.find(|(id, _)| id.name == "obj_arrow_parent")
		.map(|(_, violations)| violations.is_empty());
	assert_eq!(clean, Some(true));

	let broken_fatal = reports
		.iter()
		.find(|(id, _)| id.name == "obj_broken")
		.map(|(_, violations)| violations.iter().any(yydoc::yy::Violation::is_fatal));
	assert_eq!(broken_fatal, Some(true));
}
