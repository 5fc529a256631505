use std::fmt;

use serde::Serialize;

use crate::yy::resolve::reference_parts;
use crate::yy::schema::{FieldType, SchemaRegistry, Shape};
use crate::yy::value::{Number, Value};

/// Whether a violation blocks `mutate`/`save` or is merely surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	/// Reported but never blocking.
	Warning,
	/// Blocks mutation commit and save.
	Fatal,
}

/// One structural or referential finding against a descriptor tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
	/// Dotted/indexed location inside the tree, e.g. `eventList[0].eventType`.
	/// Empty for findings about the root.
	pub path: String,
	/// What went wrong.
	#[serde(flatten)]
	pub kind: ViolationKind,
}

/// Violation taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
	/// A required field is absent.
	MissingField {
		/// The missing field key.
		field: String,
	},
	/// A field's runtime type disagrees with its declared type.
	TypeMismatch {
		/// Declared type label.
		expected: &'static str,
		/// Actual runtime kind label.
		found: &'static str,
	},
	/// A field value is outside its declared enumeration.
	EnumViolation {
		/// Compact rendering of the offending value.
		found: String,
	},
	/// A field is present but not declared in the shape.
	UnknownField {
		/// The undeclared field key.
		field: String,
	},
	/// The registry has no shape for this `resourceType`.
	UnknownResourceKind {
		/// The unrecognized `resourceType` value.
		resource_type: String,
	},
	/// The parser collapsed a duplicated object key.
	DuplicateKey {
		/// The duplicated key.
		key: String,
	},
	/// A `{name, path}` reference does not match the project index.
	BrokenReference {
		/// Referenced descriptor name.
		name: String,
		/// Path the index holds for that name, if any.
		expected_path: Option<String>,
		/// Path the reference carries.
		actual_path: String,
	},
	/// A descriptor references itself; usually a broken save.
	SelfReference {
		/// The referenced (own) name.
		name: String,
	},
	/// The descriptor's `name` field disagrees with its file base name.
	NameMismatch {
		/// Base name of the backing file.
		file_stem: String,
		/// The `name` field value.
		name: String,
	},
	/// The descriptor text never parsed; its raw text is preserved.
	Unparseable {
		/// Parse failure description.
		message: String,
	},
	/// A numeric value is NaN or infinite. Such values have no literal
	/// form, so serializing them would produce text the parser rejects.
	NonFiniteNumber {
		/// Compact rendering of the offending value.
		found: String,
	},
}

impl ViolationKind {
	/// Severity class of this kind.
	pub fn severity(&self) -> Severity {
		match self {
			ViolationKind::MissingField { .. }
			| ViolationKind::TypeMismatch { .. }
			| ViolationKind::EnumViolation { .. }
			| ViolationKind::BrokenReference { .. }
			| ViolationKind::NameMismatch { .. }
			| ViolationKind::Unparseable { .. }
			| ViolationKind::NonFiniteNumber { .. } => Severity::Fatal,
			ViolationKind::UnknownField { .. }
			| ViolationKind::UnknownResourceKind { .. }
			| ViolationKind::DuplicateKey { .. }
			| ViolationKind::SelfReference { .. } => Severity::Warning,
		}
	}
}

impl Violation {
	/// Severity class of this violation.
	pub fn severity(&self) -> Severity {
		self.kind.severity()
	}

	/// Whether this violation blocks mutation and save.
	pub fn is_fatal(&self) -> bool {
		self.severity() == Severity::Fatal
	}
}

impl fmt::Display for Violation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let location = if self.path.is_empty() { "<root>" } else { &self.path };
		match &self.kind {
			ViolationKind::MissingField { field } => write!(f, "{location}: missing required field {field:?}"),
			ViolationKind::TypeMismatch { expected, found } => {
				write!(f, "{location}: expected {expected}, found {found}")
			}
			ViolationKind::EnumViolation { found } => write!(f, "{location}: value {found} is out of range"),
			ViolationKind::UnknownField { field } => write!(f, "{location}: unknown field {field:?}"),
			ViolationKind::UnknownResourceKind { resource_type } => {
				write!(f, "{location}: unknown resource kind {resource_type:?}")
			}
			ViolationKind::DuplicateKey { key } => write!(f, "{location}: duplicate key {key:?} (last wins)"),
			ViolationKind::BrokenReference {
				name,
				expected_path,
				actual_path,
			} => match expected_path {
				Some(expected) => write!(
					f,
					"{location}: reference {name:?} points at {actual_path:?}, index has {expected:?}"
				),
				None => write!(f, "{location}: reference {name:?} not in project index (path {actual_path:?})"),
			},
			ViolationKind::SelfReference { name } => write!(f, "{location}: descriptor references itself ({name:?})"),
			ViolationKind::NameMismatch { file_stem, name } => {
				write!(f, "{location}: name field {name:?} does not match file base name {file_stem:?}")
			}
			ViolationKind::Unparseable { message } => write!(f, "{location}: unparseable: {message}"),
			ViolationKind::NonFiniteNumber { found } => {
				write!(f, "{location}: non-finite number {found} has no literal form")
			}
		}
	}
}

/// Validate a descriptor tree against the shape selected by its
/// `resourceType` field.
///
/// Pure and total: never mutates the tree, never panics, and recursion is
/// bounded by tree depth. A missing `resourceType` yields a single
/// `MissingField`; an unrecognized one yields one `UnknownResourceKind`
/// warning and no field checks, so newer resource kinds pass through.
/// Non-finite numbers are reported wherever they appear, shaped or not,
/// since they have no literal form.
pub fn validate_descriptor(tree: &Value, registry: &SchemaRegistry) -> Vec<Violation> {
	let mut out = Vec::new();
	scan_non_finite(tree, "", &mut out);

	let Some(object) = tree.as_object() else {
		out.push(Violation {
			path: String::new(),
			kind: ViolationKind::TypeMismatch {
				expected: "object",
				found: tree.kind_name(),
			},
		});
		return out;
	};

	let Some(resource_type) = object.get("resourceType").and_then(Value::as_str) else {
		out.push(Violation {
			path: String::new(),
			kind: ViolationKind::MissingField {
				field: "resourceType".to_owned(),
			},
		});
		return out;
	};

	let Some(shape) = registry.shape_for(resource_type) else {
		out.push(Violation {
			path: String::new(),
			kind: ViolationKind::UnknownResourceKind {
				resource_type: resource_type.to_owned(),
			},
		});
		return out;
	};

	out.extend(validate(tree, shape, registry));
	out
}

// The parser only ever produces finite floats; NaN and infinities can
// enter a tree through mutation. They must never reach serialization.
fn scan_non_finite(value: &Value, path: &str, out: &mut Vec<Violation>) {
	match value {
		Value::Number(Number::Float(float)) if !float.is_finite() => out.push(Violation {
			path: path.to_owned(),
			kind: ViolationKind::NonFiniteNumber { found: float.to_string() },
		}),
		Value::Object(object) => {
			for entry in object.entries() {
				scan_non_finite(&entry.value, &join_path(path, &entry.key), out);
			}
		}
		Value::Array(items) => {
			for (idx, item) in items.iter().enumerate() {
				scan_non_finite(item, &format!("{path}[{idx}]"), out);
			}
		}
		_ => {}
	}
}

/// Validate a tree against one specific shape.
pub fn validate(tree: &Value, shape: &Shape, registry: &SchemaRegistry) -> Vec<Violation> {
	let mut out = Vec::new();
	validate_object(tree, shape, registry, "", &mut out);
	out
}

fn validate_object(value: &Value, shape: &Shape, registry: &SchemaRegistry, path: &str, out: &mut Vec<Violation>) {
	let Some(object) = value.as_object() else {
		out.push(Violation {
			path: path.to_owned(),
			kind: ViolationKind::TypeMismatch {
				expected: "object",
				found: value.kind_name(),
			},
		});
		return;
	};

	for spec in shape.fields() {
		let member_path = join_path(path, spec.name);
		match object.get(spec.name) {
			Some(member) => {
				check_type(member, &spec.field_type, registry, &member_path, out);
				if let Some(allowed) = &spec.enum_values
					&& !allowed.contains(member)
				{
					out.push(Violation {
						path: member_path,
						kind: ViolationKind::EnumViolation {
							found: member.to_string(),
						},
					});
				}
			}
			None if spec.required => out.push(Violation {
				path: path.to_owned(),
				kind: ViolationKind::MissingField {
					field: spec.name.to_owned(),
				},
			}),
			None => {}
		}
	}

	for key in object.keys() {
		if shape.field_spec(key).is_none() {
			out.push(Violation {
				path: path.to_owned(),
				kind: ViolationKind::UnknownField { field: key.to_owned() },
			});
		}
	}
}

fn check_type(value: &Value, field_type: &FieldType, registry: &SchemaRegistry, path: &str, out: &mut Vec<Violation>) {
	let mismatch = |found: &'static str| Violation {
		path: path.to_owned(),
		kind: ViolationKind::TypeMismatch {
			expected: field_type.label(),
			found,
		},
	};

	match field_type {
		FieldType::Any => {}
		FieldType::Bool => {
			if value.as_bool().is_none() {
				out.push(mismatch(value.kind_name()));
			}
		}
		FieldType::Number => {
			if value.as_number().is_none() {
				out.push(mismatch(value.kind_name()));
			}
		}
		FieldType::String => {
			if value.as_str().is_none() {
				out.push(mismatch(value.kind_name()));
			}
		}
		FieldType::Reference => {
			// Null is "intentionally unset" and always valid.
			if !value.is_null() && value.as_object().and_then(reference_parts).is_none() {
				out.push(mismatch(value.kind_name()));
			}
		}
		FieldType::Array(element_type) => match value.as_array() {
			Some(items) => {
				for (idx, item) in items.iter().enumerate() {
					check_type(item, element_type, registry, &format!("{path}[{idx}]"), out);
				}
			}
			None => out.push(mismatch(value.kind_name())),
		},
		FieldType::Nested(shape_name) => {
			// An unregistered sub-shape name is a registry gap, not a
			// document fault; only the object-ness is checked then.
			match registry.sub_shape(shape_name) {
				Some(sub_shape) => validate_object(value, sub_shape, registry, path, out),
				None => {
					if value.as_object().is_none() {
						out.push(mismatch(value.kind_name()));
					}
				}
			}
		}
	}
}

fn join_path(path: &str, key: &str) -> String {
	if path.is_empty() { key.to_owned() } else { format!("{path}.{key}") }
}

#[cfg(test)]
mod tests {
	use super::{Severity, ViolationKind, validate_descriptor};
	use crate::yy::parse::parse_value_only;
	use crate::yy::schema::SchemaRegistry;

	fn check(text: &str) -> Vec<super::Violation> {
		let tree = parse_value_only(text).expect("parse succeeds");
		validate_descriptor(&tree, &SchemaRegistry::builtin())
	}

	#[test]
	fn missing_resource_type_is_exactly_one_missing_field() {
		let violations = check("{\"name\": \"obj_thing\",}");
		assert_eq!(violations.len(), 1);
		assert!(matches!(&violations[0].kind, ViolationKind::MissingField { field } if field == "resourceType"));
		assert_eq!(violations[0].severity(), Severity::Fatal);
	}

	#[test]
	fn unknown_resource_kind_is_a_single_warning() {
		let violations = check("{\"resourceType\": \"GMWidget\", \"name\": \"w\",}");
		assert_eq!(violations.len(), 1);
		assert!(matches!(
			&violations[0].kind,
			ViolationKind::UnknownResourceKind { resource_type } if resource_type == "GMWidget"
		));
		assert_eq!(violations[0].severity(), Severity::Warning);
	}

	#[test]
	fn unknown_field_is_a_warning_not_fatal() {
		let violations = check(
			"{\"resourceType\": \"GMFolder\", \"resourceVersion\": \"1.0\", \"name\": \"Arrows\", \
			 \"folderPath\": \"folders/Arrows.yy\", \"mystery\": 1,}",
		);
		assert_eq!(violations.len(), 1);
		assert!(matches!(&violations[0].kind, ViolationKind::UnknownField { field } if field == "mystery"));
		assert_eq!(violations[0].severity(), Severity::Warning);
	}

	#[test]
	fn type_mismatch_reports_expected_and_found() {
		let violations = check(
			"{\"resourceType\": \"GMFolder\", \"resourceVersion\": \"1.0\", \"name\": \"Arrows\", \
			 \"folderPath\": 12,}",
		);
		assert_eq!(violations.len(), 1);
		assert_eq!(violations[0].path, "folderPath");
		assert!(matches!(
			&violations[0].kind,
			ViolationKind::TypeMismatch { expected: "string", found: "number" }
		));
	}

	#[test]
	fn nested_event_violations_carry_indexed_paths() {
		let violations = check(
			"{\"resourceType\": \"GMObject\", \"resourceVersion\": \"1.0\", \"name\": \"obj_a\", \
			 \"solid\": false, \"visible\": true, \"persistent\": false, \"physicsObject\": false, \
			 \"parent\": null, \
			 \"eventList\": [{\"eventNum\": 0, \"eventType\": 99,},],}",
		);
		assert_eq!(violations.len(), 1);
		assert_eq!(violations[0].path, "eventList[0].eventType");
		assert!(matches!(&violations[0].kind, ViolationKind::EnumViolation { found } if found == "99"));
	}

	#[test]
	fn null_reference_fields_are_valid() {
		let violations = check(
			"{\"resourceType\": \"GMScript\", \"resourceVersion\": \"1.0\", \"name\": \"scr_a\", \
			 \"parent\": null,}",
		);
		assert!(violations.is_empty(), "unexpected: {violations:?}");
	}

	#[test]
	fn malformed_reference_object_is_a_type_mismatch() {
		let violations = check(
			"{\"resourceType\": \"GMScript\", \"resourceVersion\": \"1.0\", \"name\": \"scr_a\", \
			 \"parent\": {\"name\": \"Scripts\",},}",
		);
		assert_eq!(violations.len(), 1);
		assert_eq!(violations[0].path, "parent");
		assert!(matches!(
			&violations[0].kind,
			ViolationKind::TypeMismatch { expected: "reference", .. }
		));
	}

	#[test]
	fn non_finite_numbers_are_fatal_wherever_they_appear() {
		use crate::yy::value::{Number, Value};

		for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
			let mut tree = parse_value_only(
				"{\"resourceType\": \"GMSound\", \"resourceVersion\": \"1.0\", \"name\": \"snd_a\", \
				 \"parent\": null,}",
			)
			.expect("parse succeeds");
			tree.as_object_mut()
				.expect("root is object")
				.set("volume", Value::Number(Number::Float(bad)));

			let violations = validate_descriptor(&tree, &SchemaRegistry::builtin());
			let non_finite: Vec<_> = violations
				.iter()
				.filter(|violation| matches!(violation.kind, ViolationKind::NonFiniteNumber { .. }))
				.collect();
			assert_eq!(non_finite.len(), 1, "for {bad}: {violations:?}");
			assert_eq!(non_finite[0].path, "volume");
			assert_eq!(non_finite[0].severity(), Severity::Fatal);
		}
	}

	#[test]
	fn validation_is_total_on_arbitrary_trees() {
		for text in ["null", "[1,2,3]", "\"hello\"", "{\"resourceType\": 7,}"] {
			let tree = parse_value_only(text).expect("parse succeeds");
			let _ = validate_descriptor(&tree, &SchemaRegistry::builtin());
		}
	}
}
