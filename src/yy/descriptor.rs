use crate::yy::resolve::ResourceKind;
use crate::yy::validate::{Violation, ViolationKind};
use crate::yy::value::Value;

/// Store identity of one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorId {
	/// Resource kind, from `resourceType` or the file's leading directory.
	pub kind: ResourceKind,
	/// Descriptor name, from the file's base name.
	pub name: String,
}

impl std::fmt::Display for DescriptorId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.kind, self.name)
	}
}

/// Parsed or raw content of one descriptor.
#[derive(Debug, Clone)]
pub enum DescriptorSource {
	/// Parsed value tree.
	Parsed(Value),
	/// Text that failed to parse, preserved byte-for-byte so nothing is
	/// lost or partially rewritten.
	Unparseable {
		/// Original file text, untouched.
		raw: String,
		/// Parse failure description.
		error: String,
	},
}

/// One resource's structured metadata record.
#[derive(Debug, Clone)]
pub struct Descriptor {
	id: DescriptorId,
	path: String,
	file_stem: String,
	source: DescriptorSource,
	parse_warnings: Vec<Violation>,
}

impl Descriptor {
	/// Assemble a descriptor from its identity, project-relative path, and
	/// parsed or raw content.
	pub fn new(
		id: DescriptorId,
		path: String,
		file_stem: String,
		source: DescriptorSource,
		parse_warnings: Vec<Violation>,
	) -> Self {
		Self {
			id,
			path,
			file_stem,
			source,
			parse_warnings,
		}
	}

	/// Store identity.
	pub fn id(&self) -> &DescriptorId {
		&self.id
	}

	/// Project-relative path of the backing file, forward slashes.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Base name of the backing file; the source of truth for `name`.
	pub fn file_stem(&self) -> &str {
		&self.file_stem
	}

	/// Parsed or raw content.
	pub fn source(&self) -> &DescriptorSource {
		&self.source
	}

	/// Parsed tree, if the text parsed.
	pub fn tree(&self) -> Option<&Value> {
		match &self.source {
			DescriptorSource::Parsed(value) => Some(value),
			DescriptorSource::Unparseable { .. } => None,
		}
	}

	pub(crate) fn tree_mut(&mut self) -> Option<&mut Value> {
		match &mut self.source {
			DescriptorSource::Parsed(value) => Some(value),
			DescriptorSource::Unparseable { .. } => None,
		}
	}

	/// Whether the text parsed.
	pub fn is_parsed(&self) -> bool {
		matches!(self.source, DescriptorSource::Parsed(_))
	}

	/// The `resourceType` field, if present.
	pub fn resource_type(&self) -> Option<&str> {
		self.tree()?.as_object()?.get("resourceType")?.as_str()
	}

	/// The `name` field, if present.
	pub fn name_field(&self) -> Option<&str> {
		self.tree()?.as_object()?.get("name")?.as_str()
	}

	/// Warnings recorded at parse time (duplicate-key collapses).
	pub fn parse_warnings(&self) -> &[Violation] {
		&self.parse_warnings
	}

	/// Findings recorded before schema or index checks run: the unparseable
	/// marker, or the duplicate-key collapses seen at parse time.
	pub fn intrinsic_violations(&self) -> Vec<Violation> {
		match &self.source {
			DescriptorSource::Unparseable { error, .. } => vec![Violation {
				path: String::new(),
				kind: ViolationKind::Unparseable { message: error.clone() },
			}],
			DescriptorSource::Parsed(_) => self.parse_warnings.clone(),
		}
	}
}
