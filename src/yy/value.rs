use std::fmt;

/// One parsed descriptor value.
///
/// Objects and arrays preserve the order in which members were encountered;
/// re-serialization emits them in that order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Explicit `null`.
	Null,
	/// Boolean literal.
	Bool(bool),
	/// Numeric literal, integer or floating.
	Number(Number),
	/// String literal, unescaped.
	String(String),
	/// Ordered array of values.
	Array(Vec<Value>),
	/// Ordered key/value object.
	Object(Object),
}

/// Numeric literal preserving the integer/float distinction so `0.5`
/// round-trips as `0.5` and integers never grow decimal points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
	/// Integer literal.
	Int(i64),
	/// Floating literal.
	Float(f64),
}

/// Ordered key/value members of one object.
///
/// Insertion order is preserved. Duplicate keys are collapsed by the parser
/// (first position kept, last value wins), so an `Object` holds each key at
/// most once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
	entries: Vec<ObjectEntry>,
}

/// One key/value member of an [`Object`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
	/// Member key.
	pub key: String,
	/// Member value.
	pub value: Value,
}

impl Object {
	/// Create an empty object.
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up a member value by key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.entries.iter().find(|entry| entry.key == key).map(|entry| &entry.value)
	}

	/// Look up a member value mutably by key.
	pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
		self.entries.iter_mut().find(|entry| entry.key == key).map(|entry| &mut entry.value)
	}

	/// Replace the value for `key` in place, or append a new member.
	pub fn set(&mut self, key: impl Into<String>, value: Value) {
		let key = key.into();
		match self.entries.iter_mut().find(|entry| entry.key == key) {
			Some(entry) => entry.value = value,
			None => self.entries.push(ObjectEntry { key, value }),
		}
	}

	/// Remove a member by key, preserving the order of the rest.
	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.entries
			.iter()
			.position(|entry| entry.key == key)
			.map(|idx| self.entries.remove(idx).value)
	}

	/// Ordered member slice.
	pub fn entries(&self) -> &[ObjectEntry] {
		&self.entries
	}

	/// Iterate member keys in order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|entry| entry.key.as_str())
	}

	/// Number of members.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the object has no members.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Value {
	/// Borrow as string, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow as bool, if this is a bool.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow as number, if this is a number.
	pub fn as_number(&self) -> Option<Number> {
		match self {
			Value::Number(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow as object, if this is an object.
	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Value::Object(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow as object mutably, if this is an object.
	pub fn as_object_mut(&mut self) -> Option<&mut Object> {
		match self {
			Value::Object(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow as array, if this is an array.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(value) => Some(value),
			_ => None,
		}
	}

	/// Whether this is `null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Short label for the runtime kind, used in violation messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Number(_) => "number",
			Value::String(_) => "string",
			Value::Array(_) => "array",
			Value::Object(_) => "object",
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Number::Int(value) => write!(f, "{value}"),
			Number::Float(value) => write!(f, "{value}"),
		}
	}
}

impl fmt::Display for Value {
	/// Compact single-line rendering for messages and logs; the
	/// [`serialize`](crate::yy::serialize::serialize) function owns the
	/// canonical on-disk form.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Bool(value) => write!(f, "{value}"),
			Value::Number(value) => write!(f, "{value}"),
			Value::String(value) => write!(f, "{value:?}"),
			Value::Array(items) => {
				write!(f, "[")?;
				for (idx, item) in items.iter().enumerate() {
					if idx > 0 {
						write!(f, ",")?;
					}
					write!(f, "{item}")?;
				}
				write!(f, "]")
			}
			Value::Object(object) => {
				write!(f, "{{")?;
				for (idx, entry) in object.entries().iter().enumerate() {
					if idx > 0 {
						write!(f, ",")?;
					}
					write!(f, "{:?}:{}", entry.key, entry.value)?;
				}
				write!(f, "}}")
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{Number, Object, Value};

	#[test]
	fn object_set_replaces_in_place_and_appends_at_end() {
		let mut object = Object::new();
		object.set("a", Value::Number(Number::Int(1)));
		object.set("b", Value::Number(Number::Int(2)));
		object.set("a", Value::Number(Number::Int(3)));

		let keys: Vec<_> = object.keys().collect();
		assert_eq!(keys, vec!["a", "b"]);
		assert_eq!(object.get("a"), Some(&Value::Number(Number::Int(3))));
	}

	#[test]
	fn remove_preserves_remaining_order() {
		let mut object = Object::new();
		object.set("a", Value::Null);
		object.set("b", Value::Bool(true));
		object.set("c", Value::Null);

		assert_eq!(object.remove("b"), Some(Value::Bool(true)));
		let keys: Vec<_> = object.keys().collect();
		assert_eq!(keys, vec!["a", "c"]);
	}
}
