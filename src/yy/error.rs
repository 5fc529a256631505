use thiserror::Error;

use crate::yy::validate::Violation;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, YyError>;

/// Errors produced while parsing, validating, and storing `.yy` descriptors.
#[derive(Debug, Error)]
pub enum YyError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Malformed descriptor text; aborts the parse of that one file.
	#[error("parse error at {line}:{column}: expected {expected}, found {found}")]
	Parse {
		/// One-based line of the offending token.
		line: u32,
		/// One-based column of the offending token.
		column: u32,
		/// Description of what the parser was looking for.
		expected: &'static str,
		/// Description of what was actually present.
		found: String,
	},
	/// Parser recursion depth exceeded configured limit.
	#[error("nesting depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Descriptor root value is not an object.
	#[error("descriptor root is not an object (found {found})")]
	RootNotObject {
		/// Kind label of the actual root value.
		found: &'static str,
	},
	/// Requested descriptor is not held by the store.
	#[error("descriptor not found: {kind}/{name}")]
	NotFound {
		/// Resource kind label.
		kind: String,
		/// Descriptor name.
		name: String,
	},
	/// Descriptor text never parsed; raw text is preserved untouched.
	#[error("descriptor is unparseable: {name}")]
	Unparseable {
		/// Descriptor name.
		name: String,
	},
	/// Save refused because fatal violations are outstanding.
	#[error("descriptor is not savable: {} fatal violation(s)", violations.len())]
	NotSavable {
		/// The blocking violations.
		violations: Vec<Violation>,
	},
	/// Mutation rolled back because it introduced fatal violations.
	#[error("mutation rejected: {} fatal violation(s)", violations.len())]
	MutationRejected {
		/// The violations introduced by the edit.
		violations: Vec<Violation>,
	},
	/// An edit attempted to change the immutable `resourceType` field.
	#[error("resourceType is immutable (was {from:?}, edit produced {to:?})")]
	ResourceTypeChanged {
		/// The `resourceType` before the edit.
		from: String,
		/// The `resourceType` the edit produced.
		to: String,
	},
	/// A descriptor file path had no usable base name.
	#[error("invalid descriptor path: {path}")]
	InvalidDescriptorPath {
		/// Offending path string.
		path: String,
	},
	/// Batch check found fatal violations.
	#[error("{fatal} fatal violation(s) across {resources} resource(s)")]
	ChecksFailed {
		/// Total fatal violations found.
		fatal: usize,
		/// Number of resources with at least one fatal violation.
		resources: usize,
	},
	/// Formatting check found the file differs from canonical output.
	#[error("not canonically formatted: {path}")]
	NotCanonical {
		/// Offending file path.
		path: String,
	},
}
