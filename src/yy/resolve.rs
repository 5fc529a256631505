use std::collections::HashMap;
use std::fmt;

use crate::yy::validate::{Violation, ViolationKind};
use crate::yy::value::{Object, Value};

/// Resource kinds of the descriptor graph.
///
/// The closed variants are the kinds the project format ships with; anything
/// else is carried as [`ResourceKind::Other`] so newer kinds pass through as
/// soft warnings rather than errors. Two kinds may share a descriptor name
/// without collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
	/// Game object.
	Object,
	/// Sprite.
	Sprite,
	/// Script.
	Script,
	/// Sound.
	Sound,
	/// Room.
	Room,
	/// Virtual folder in the project tree.
	Folder,
	/// Tile set.
	TileSet,
	/// Font.
	Font,
	/// Shader.
	Shader,
	/// Note.
	Note,
	/// Motion path.
	Path,
	/// Sequence.
	Sequence,
	/// Timeline.
	Timeline,
	/// Animation curve.
	AnimationCurve,
	/// Extension.
	Extension,
	/// Unrecognized `resourceType`, kept verbatim.
	Other(String),
}

impl ResourceKind {
	/// Leading project directory holding this kind's resources.
	pub fn subpath_name(&self) -> Option<&'static str> {
		match self {
			ResourceKind::Object => Some("objects"),
			ResourceKind::Sprite => Some("sprites"),
			ResourceKind::Script => Some("scripts"),
			ResourceKind::Sound => Some("sounds"),
			ResourceKind::Room => Some("rooms"),
			ResourceKind::Folder => Some("folders"),
			ResourceKind::TileSet => Some("tilesets"),
			ResourceKind::Font => Some("fonts"),
			ResourceKind::Shader => Some("shaders"),
			ResourceKind::Note => Some("notes"),
			ResourceKind::Path => Some("paths"),
			ResourceKind::Sequence => Some("sequences"),
			ResourceKind::Timeline => Some("timelines"),
			ResourceKind::AnimationCurve => Some("animcurves"),
			ResourceKind::Extension => Some("extensions"),
			ResourceKind::Other(_) => None,
		}
	}

	/// Map a leading project directory back to a kind.
	pub fn parse_subpath(subpath: &str) -> Option<ResourceKind> {
		match subpath {
			"objects" => Some(ResourceKind::Object),
			"sprites" => Some(ResourceKind::Sprite),
			"scripts" => Some(ResourceKind::Script),
			"sounds" => Some(ResourceKind::Sound),
			"rooms" => Some(ResourceKind::Room),
			"folders" => Some(ResourceKind::Folder),
			"tilesets" => Some(ResourceKind::TileSet),
			"fonts" => Some(ResourceKind::Font),
			"shaders" => Some(ResourceKind::Shader),
			"notes" => Some(ResourceKind::Note),
			"paths" => Some(ResourceKind::Path),
			"sequences" => Some(ResourceKind::Sequence),
			"timelines" => Some(ResourceKind::Timeline),
			"animcurves" => Some(ResourceKind::AnimationCurve),
			"extensions" => Some(ResourceKind::Extension),
			_ => None,
		}
	}

	/// The `resourceType` discriminator for this kind.
	pub fn resource_type(&self) -> &str {
		match self {
			ResourceKind::Object => "GMObject",
			ResourceKind::Sprite => "GMSprite",
			ResourceKind::Script => "GMScript",
			ResourceKind::Sound => "GMSound",
			ResourceKind::Room => "GMRoom",
			ResourceKind::Folder => "GMFolder",
			ResourceKind::TileSet => "GMTileSet",
			ResourceKind::Font => "GMFont",
			ResourceKind::Shader => "GMShader",
			ResourceKind::Note => "GMNotes",
			ResourceKind::Path => "GMPath",
			ResourceKind::Sequence => "GMSequence",
			ResourceKind::Timeline => "GMTimeline",
			ResourceKind::AnimationCurve => "GMAnimCurve",
			ResourceKind::Extension => "GMExtension",
			ResourceKind::Other(resource_type) => resource_type,
		}
	}

	/// Map a `resourceType` discriminator to a kind; unknown values are
	/// carried as [`ResourceKind::Other`].
	pub fn parse_resource_type(resource_type: &str) -> ResourceKind {
		match resource_type {
			"GMObject" => ResourceKind::Object,
			"GMSprite" => ResourceKind::Sprite,
			"GMScript" => ResourceKind::Script,
			"GMSound" => ResourceKind::Sound,
			"GMRoom" => ResourceKind::Room,
			"GMFolder" => ResourceKind::Folder,
			"GMTileSet" => ResourceKind::TileSet,
			"GMFont" => ResourceKind::Font,
			"GMShader" => ResourceKind::Shader,
			"GMNotes" => ResourceKind::Note,
			"GMPath" => ResourceKind::Path,
			"GMSequence" => ResourceKind::Sequence,
			"GMTimeline" => ResourceKind::Timeline,
			"GMAnimCurve" => ResourceKind::AnimationCurve,
			"GMExtension" => ResourceKind::Extension,
			other => ResourceKind::Other(other.to_owned()),
		}
	}

	/// Infer the kind a reference path points into from its leading
	/// directory, e.g. `objects/obj_a/obj_a.yy` is an object.
	pub fn of_path(path: &str) -> Option<ResourceKind> {
		let leading = path.split('/').next()?;
		ResourceKind::parse_subpath(leading)
	}
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceKind::Object => write!(f, "object"),
			ResourceKind::Sprite => write!(f, "sprite"),
			ResourceKind::Script => write!(f, "script"),
			ResourceKind::Sound => write!(f, "sound"),
			ResourceKind::Room => write!(f, "room"),
			ResourceKind::Folder => write!(f, "folder"),
			ResourceKind::TileSet => write!(f, "tile set"),
			ResourceKind::Font => write!(f, "font"),
			ResourceKind::Shader => write!(f, "shader"),
			ResourceKind::Note => write!(f, "note"),
			ResourceKind::Path => write!(f, "path"),
			ResourceKind::Sequence => write!(f, "sequence"),
			ResourceKind::Timeline => write!(f, "timeline"),
			ResourceKind::AnimationCurve => write!(f, "animation curve"),
			ResourceKind::Extension => write!(f, "extension"),
			ResourceKind::Other(resource_type) if resource_type.is_empty() => write!(f, "unknown"),
			ResourceKind::Other(resource_type) => write!(f, "{resource_type}"),
		}
	}
}

/// Immutable `(kind, name) -> path` snapshot of the project's resource set.
///
/// Built by an external scanning collaborator, swapped wholesale on project
/// changes; the core only reads it.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
	buckets: HashMap<ResourceKind, HashMap<String, String>>,
}

impl ProjectIndex {
	/// Empty index.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record one descriptor's project-relative path.
	pub fn insert(&mut self, kind: ResourceKind, name: impl Into<String>, path: impl Into<String>) {
		self.buckets.entry(kind).or_default().insert(name.into(), path.into());
	}

	/// Path held for `(kind, name)`, if any.
	pub fn lookup(&self, kind: &ResourceKind, name: &str) -> Option<&str> {
		self.buckets.get(kind)?.get(name).map(String::as_str)
	}

	/// Drop one descriptor from the index.
	pub fn remove(&mut self, kind: &ResourceKind, name: &str) -> Option<String> {
		self.buckets.get_mut(kind)?.remove(name)
	}

	/// Number of indexed descriptors.
	pub fn len(&self) -> usize {
		self.buckets.values().map(HashMap::len).sum()
	}

	/// Whether the index holds no descriptors.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Iterate `(kind, name, path)` entries in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, &str, &str)> {
		self.buckets
			.iter()
			.flat_map(|(kind, names)| names.iter().map(move |(name, path)| (kind, name.as_str(), path.as_str())))
	}
}

/// One `{name, path}` reference found while walking a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
	/// Dotted/indexed location of the reference object.
	pub location: String,
	/// Referenced descriptor name.
	pub name: String,
	/// Path the reference carries.
	pub path: String,
}

/// Identity of the descriptor being resolved, for self-reference detection.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
	/// Kind of the containing descriptor.
	pub kind: &'a ResourceKind,
	/// Name of the containing descriptor.
	pub name: &'a str,
}

/// Recognize an object of exactly `{name, path}` with string values.
pub(crate) fn reference_parts(object: &Object) -> Option<(&str, &str)> {
	if object.len() != 2 {
		return None;
	}
	let name = object.get("name")?.as_str()?;
	let path = object.get("path")?.as_str()?;
	Some((name, path))
}

/// Collect every reference-shaped sub-object in tree order.
///
/// `null` references are intentionally unset and are not collected.
pub fn collect_references(tree: &Value) -> Vec<ReferenceSite> {
	let mut out = Vec::new();
	collect_into(tree, "", &mut out);
	out
}

fn collect_into(value: &Value, path: &str, out: &mut Vec<ReferenceSite>) {
	match value {
		Value::Object(object) => {
			if let Some((name, ref_path)) = reference_parts(object) {
				out.push(ReferenceSite {
					location: path.to_owned(),
					name: name.to_owned(),
					path: ref_path.to_owned(),
				});
				return;
			}
			for entry in object.entries() {
				let member_path = if path.is_empty() {
					entry.key.clone()
				} else {
					format!("{path}.{}", entry.key)
				};
				collect_into(&entry.value, &member_path, out);
			}
		}
		Value::Array(items) => {
			for (idx, item) in items.iter().enumerate() {
				collect_into(item, &format!("{path}[{idx}]"), out);
			}
		}
		_ => {}
	}
}

/// Resolve every reference in a tree against an index snapshot.
///
/// A reference resolves iff the index holds exactly its path for its name
/// under the kind inferred from the path's leading directory. Each failing
/// reference contributes exactly one `BrokenReference`; nothing is
/// auto-corrected. A reference back to the containing descriptor additionally
/// raises a `SelfReference` warning.
pub fn resolve(tree: &Value, index: &ProjectIndex, ctx: Option<ResolveContext<'_>>) -> Vec<Violation> {
	let mut out = Vec::new();

	for site in collect_references(tree) {
		let kind = ResourceKind::of_path(&site.path);

		if let Some(ctx) = ctx
			&& kind.as_ref() == Some(ctx.kind)
			&& site.name == ctx.name
		{
			out.push(Violation {
				path: site.location.clone(),
				kind: ViolationKind::SelfReference { name: site.name.clone() },
			});
		}

		let expected = kind.as_ref().and_then(|kind| index.lookup(kind, &site.name));
		match expected {
			Some(path) if path == site.path => {}
			expected => out.push(Violation {
				path: site.location,
				kind: ViolationKind::BrokenReference {
					name: site.name,
					expected_path: expected.map(str::to_owned),
					actual_path: site.path,
				},
			}),
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::{ProjectIndex, ResolveContext, ResourceKind, collect_references, resolve};
	use crate::yy::parse::parse_value_only;
	use crate::yy::validate::ViolationKind;

	fn sample_tree() -> crate::yy::value::Value {
		parse_value_only(
			"{\"resourceType\": \"GMObject\", \"name\": \"obj_a\", \
			 \"parentObjectId\": {\"name\": \"obj_b\", \"path\": \"objects/obj_b/obj_b.yy\",}, \
			 \"spriteId\": null,}",
		)
		.expect("parse succeeds")
	}

	#[test]
	fn null_references_are_not_reference_sites() {
		let sites = collect_references(&sample_tree());
		assert_eq!(sites.len(), 1);
		assert_eq!(sites[0].location, "parentObjectId");
		assert_eq!(sites[0].name, "obj_b");
	}

	#[test]
	fn matching_index_entry_resolves_cleanly() {
		let mut index = ProjectIndex::new();
		index.insert(ResourceKind::Object, "obj_b", "objects/obj_b/obj_b.yy");
		assert!(resolve(&sample_tree(), &index, None).is_empty());
	}

	#[test]
	fn absent_name_reports_one_broken_reference_with_no_expected_path() {
		let violations = resolve(&sample_tree(), &ProjectIndex::new(), None);
		assert_eq!(violations.len(), 1);
		assert_eq!(violations[0].path, "parentObjectId");
		assert!(matches!(
			&violations[0].kind,
			ViolationKind::BrokenReference { name, expected_path: None, actual_path }
				if name == "obj_b" && actual_path == "objects/obj_b/obj_b.yy"
		));
	}

	#[test]
	fn drifted_path_reports_expected_and_actual() {
		let mut index = ProjectIndex::new();
		index.insert(ResourceKind::Object, "obj_b", "objects/obj_b_moved/obj_b.yy");

		let violations = resolve(&sample_tree(), &index, None);
		assert_eq!(violations.len(), 1);
		assert!(matches!(
			&violations[0].kind,
			ViolationKind::BrokenReference { expected_path: Some(expected), .. }
				if expected == "objects/obj_b_moved/obj_b.yy"
		));
	}

	#[test]
	fn kinds_share_names_without_collision() {
		let mut index = ProjectIndex::new();
		index.insert(ResourceKind::Sprite, "obj_b", "sprites/obj_b/obj_b.yy");
		// Same name under the wrong kind must not satisfy an object reference.
		let violations = resolve(&sample_tree(), &index, None);
		assert_eq!(violations.len(), 1);
	}

	#[test]
	fn self_reference_is_flagged_as_warning_alongside_resolution() {
		let tree = parse_value_only(
			"{\"resourceType\": \"GMObject\", \"name\": \"obj_a\", \
			 \"parentObjectId\": {\"name\": \"obj_a\", \"path\": \"objects/obj_a/obj_a.yy\",},}",
		)
		.expect("parse succeeds");

		let mut index = ProjectIndex::new();
		index.insert(ResourceKind::Object, "obj_a", "objects/obj_a/obj_a.yy");

		let kind = ResourceKind::Object;
		let violations = resolve(&tree, &index, Some(ResolveContext { kind: &kind, name: "obj_a" }));
		assert_eq!(violations.len(), 1);
		assert!(matches!(&violations[0].kind, ViolationKind::SelfReference { name } if name == "obj_a"));
		assert!(!violations[0].is_fatal());
	}

	#[test]
	fn unknown_leading_directory_is_broken_with_no_expected_path() {
		let tree = parse_value_only("{\"ref\": {\"name\": \"x\", \"path\": \"widgets/x/x.yy\",},}").expect("parse succeeds");
		let violations = resolve(&tree, &ProjectIndex::new(), None);
		assert_eq!(violations.len(), 1);
		assert!(matches!(
			&violations[0].kind,
			ViolationKind::BrokenReference { expected_path: None, .. }
		));
	}
}
