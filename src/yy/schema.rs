use std::collections::HashMap;

use crate::yy::value::{Number, Value};

/// Declared type of one descriptor field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
	/// Boolean scalar.
	Bool,
	/// Numeric scalar, integer or floating.
	Number,
	/// String scalar.
	String,
	/// A `{name, path}` cross-resource reference; `null` means unset.
	Reference,
	/// Ordered array of one element type.
	Array(Box<FieldType>),
	/// Nested object validated against a registered sub-shape.
	Nested(&'static str),
	/// Any value; opted out of type checking.
	Any,
}

impl FieldType {
	/// Short label used in violation messages.
	pub fn label(&self) -> &'static str {
		match self {
			FieldType::Bool => "bool",
			FieldType::Number => "number",
			FieldType::String => "string",
			FieldType::Reference => "reference",
			FieldType::Array(_) => "array",
			FieldType::Nested(_) => "object",
			FieldType::Any => "any",
		}
	}
}

/// Declared expectations for one field of a shape.
#[derive(Debug, Clone)]
pub struct FieldSpec {
	/// Field key.
	pub name: &'static str,
	/// Whether the field must be present.
	pub required: bool,
	/// Expected runtime type.
	pub field_type: FieldType,
	/// Closed set of allowed values, when the field is an enumeration.
	pub enum_values: Option<Vec<Value>>,
}

/// Declarative schema for one resource kind or nested record.
///
/// Shapes are data: registering a new resource kind touches neither the
/// parser, the validator, nor the serializer.
#[derive(Debug, Clone)]
pub struct Shape {
	name: &'static str,
	fields: Vec<FieldSpec>,
}

impl Shape {
	/// Start an empty shape for `name` (a `resourceType` value or a nested
	/// record name).
	pub fn new(name: &'static str) -> Self {
		Self { name, fields: Vec::new() }
	}

	/// Shape name.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Add a required field.
	pub fn required(mut self, name: &'static str, field_type: FieldType) -> Self {
		self.fields.push(FieldSpec {
			name,
			required: true,
			field_type,
			enum_values: None,
		});
		self
	}

	/// Add an optional field.
	pub fn optional(mut self, name: &'static str, field_type: FieldType) -> Self {
		self.fields.push(FieldSpec {
			name,
			required: false,
			field_type,
			enum_values: None,
		});
		self
	}

	/// Add a required field restricted to a closed value set.
	pub fn required_enum(mut self, name: &'static str, field_type: FieldType, values: Vec<Value>) -> Self {
		self.fields.push(FieldSpec {
			name,
			required: true,
			field_type,
			enum_values: Some(values),
		});
		self
	}

	/// Add an optional field restricted to a closed value set.
	pub fn optional_enum(mut self, name: &'static str, field_type: FieldType, values: Vec<Value>) -> Self {
		self.fields.push(FieldSpec {
			name,
			required: false,
			field_type,
			enum_values: Some(values),
		});
		self
	}

	/// Declared fields in declaration order.
	pub fn fields(&self) -> &[FieldSpec] {
		&self.fields
	}

	/// Look up one declared field by key.
	pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
		self.fields.iter().find(|spec| spec.name == name)
	}
}

/// Registry of shapes keyed by `resourceType`, plus sub-shapes for nested
/// records referenced via [`FieldType::Nested`].
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
	shapes: HashMap<&'static str, Shape>,
	sub_shapes: HashMap<&'static str, Shape>,
}

impl SchemaRegistry {
	/// Registry with no shapes; every kind is "unknown".
	pub fn empty() -> Self {
		Self::default()
	}

	/// Registry pre-loaded with the built-in GameMaker resource shapes.
	pub fn builtin() -> Self {
		let mut registry = Self::empty();
		registry.register(gm_object_shape());
		registry.register(gm_sprite_shape());
		registry.register(gm_script_shape());
		registry.register(gm_sound_shape());
		registry.register(gm_folder_shape());
		registry.register_sub(gm_event_shape());
		registry.register_sub(gm_object_property_shape());
		registry.register_sub(gm_point_shape());
		registry
	}

	/// Register a top-level resource shape, replacing any previous one.
	pub fn register(&mut self, shape: Shape) {
		self.shapes.insert(shape.name, shape);
	}

	/// Register a nested-record shape, replacing any previous one.
	pub fn register_sub(&mut self, shape: Shape) {
		self.sub_shapes.insert(shape.name, shape);
	}

	/// Shape for a `resourceType`, if known. `None` is not an error: it
	/// means "unknown resource kind", which validation downgrades to a
	/// warning for forward compatibility.
	pub fn shape_for(&self, resource_type: &str) -> Option<&Shape> {
		self.shapes.get(resource_type)
	}

	/// Nested-record shape by name, if known.
	pub fn sub_shape(&self, name: &str) -> Option<&Shape> {
		self.sub_shapes.get(name)
	}
}

fn int_enum(range: std::ops::RangeInclusive<i64>) -> Vec<Value> {
	range.map(|value| Value::Number(Number::Int(value))).collect()
}

fn gm_object_shape() -> Shape {
	Shape::new("GMObject")
		.required_enum("resourceType", FieldType::String, vec![Value::String("GMObject".to_owned())])
		.required("resourceVersion", FieldType::String)
		.required("name", FieldType::String)
		.optional("spriteId", FieldType::Reference)
		.required("solid", FieldType::Bool)
		.required("visible", FieldType::Bool)
		.optional("managed", FieldType::Bool)
		.optional("spriteMaskId", FieldType::Reference)
		.required("persistent", FieldType::Bool)
		.optional("parentObjectId", FieldType::Reference)
		.required("physicsObject", FieldType::Bool)
		.optional("physicsSensor", FieldType::Bool)
		.optional_enum("physicsShape", FieldType::Number, int_enum(0..=2))
		.optional("physicsGroup", FieldType::Number)
		.optional("physicsDensity", FieldType::Number)
		.optional("physicsRestitution", FieldType::Number)
		.optional("physicsLinearDamping", FieldType::Number)
		.optional("physicsAngularDamping", FieldType::Number)
		.optional("physicsFriction", FieldType::Number)
		.optional("physicsStartAwake", FieldType::Bool)
		.optional("physicsKinematic", FieldType::Bool)
		.optional("physicsShapePoints", FieldType::Array(Box::new(FieldType::Nested("GMPoint"))))
		.required("eventList", FieldType::Array(Box::new(FieldType::Nested("GMEvent"))))
		.optional("properties", FieldType::Array(Box::new(FieldType::Nested("GMObjectProperty"))))
		.optional("overriddenProperties", FieldType::Array(Box::new(FieldType::Any)))
		.required("parent", FieldType::Reference)
		.optional("tags", FieldType::Array(Box::new(FieldType::String)))
}

fn gm_event_shape() -> Shape {
	Shape::new("GMEvent")
		.optional_enum("resourceType", FieldType::String, vec![Value::String("GMEvent".to_owned())])
		.optional("resourceVersion", FieldType::String)
		.optional("name", FieldType::String)
		.optional("isDnD", FieldType::Bool)
		.required("eventNum", FieldType::Number)
		.required_enum("eventType", FieldType::Number, int_enum(0..=13))
		.optional("collisionObjectId", FieldType::Reference)
}

fn gm_object_property_shape() -> Shape {
	Shape::new("GMObjectProperty")
		.optional_enum("resourceType", FieldType::String, vec![Value::String("GMObjectProperty".to_owned())])
		.optional("resourceVersion", FieldType::String)
		.required("name", FieldType::String)
		.required_enum("varType", FieldType::Number, int_enum(0..=9))
		.optional("value", FieldType::String)
		.optional("rangeEnabled", FieldType::Bool)
		.optional("rangeMin", FieldType::Number)
		.optional("rangeMax", FieldType::Number)
		.optional("listItems", FieldType::Array(Box::new(FieldType::String)))
		.optional("multiselect", FieldType::Bool)
		.optional("filters", FieldType::Array(Box::new(FieldType::String)))
}

fn gm_point_shape() -> Shape {
	Shape::new("GMPoint")
		.required("x", FieldType::Number)
		.required("y", FieldType::Number)
}

fn gm_sprite_shape() -> Shape {
	Shape::new("GMSprite")
		.required_enum("resourceType", FieldType::String, vec![Value::String("GMSprite".to_owned())])
		.required("resourceVersion", FieldType::String)
		.required("name", FieldType::String)
		.required("width", FieldType::Number)
		.required("height", FieldType::Number)
		.optional_enum("bboxMode", FieldType::Number, int_enum(0..=2))
		.optional_enum("collisionKind", FieldType::Number, int_enum(0..=5))
		.optional_enum("origin", FieldType::Number, int_enum(0..=9))
		.optional("textureGroupId", FieldType::Reference)
		.required("parent", FieldType::Reference)
		.optional("tags", FieldType::Array(Box::new(FieldType::String)))
}

fn gm_script_shape() -> Shape {
	Shape::new("GMScript")
		.required_enum("resourceType", FieldType::String, vec![Value::String("GMScript".to_owned())])
		.required("resourceVersion", FieldType::String)
		.required("name", FieldType::String)
		.optional("isDnD", FieldType::Bool)
		.optional("isCompatibility", FieldType::Bool)
		.required("parent", FieldType::Reference)
		.optional("tags", FieldType::Array(Box::new(FieldType::String)))
}

fn gm_sound_shape() -> Shape {
	Shape::new("GMSound")
		.required_enum("resourceType", FieldType::String, vec![Value::String("GMSound".to_owned())])
		.required("resourceVersion", FieldType::String)
		.required("name", FieldType::String)
		.optional("volume", FieldType::Number)
		.optional("audioGroupId", FieldType::Reference)
		.required("parent", FieldType::Reference)
		.optional("tags", FieldType::Array(Box::new(FieldType::String)))
}

fn gm_folder_shape() -> Shape {
	Shape::new("GMFolder")
		.required_enum("resourceType", FieldType::String, vec![Value::String("GMFolder".to_owned())])
		.required("resourceVersion", FieldType::String)
		.required("name", FieldType::String)
		.required("folderPath", FieldType::String)
		.optional("order", FieldType::Number)
		.optional("tags", FieldType::Array(Box::new(FieldType::String)))
}

#[cfg(test)]
mod tests {
	use super::SchemaRegistry;

	#[test]
	fn builtin_registry_knows_objects_and_sub_shapes() {
		let registry = SchemaRegistry::builtin();
		let shape = registry.shape_for("GMObject").expect("GMObject shape");
		assert!(shape.field_spec("eventList").is_some_and(|spec| spec.required));
		assert!(registry.sub_shape("GMEvent").is_some());
		assert!(registry.shape_for("GMWidget").is_none());
	}
}
