mod descriptor;
mod error;
mod parse;
mod resolve;
mod schema;
mod serialize;
mod store;
mod validate;
mod value;

/// Descriptor record and identity types.
pub use descriptor::{Descriptor, DescriptorId, DescriptorSource};
/// Error and result aliases.
pub use error::{Result, YyError};
/// Relaxed-JSON parsing entry points.
pub use parse::{Parsed, parse, parse_value_only};
/// Project index, resource kinds, and reference resolution.
pub use resolve::{ProjectIndex, ReferenceSite, ResolveContext, ResourceKind, collect_references, resolve};
/// Declarative shape registry types.
pub use schema::{FieldSpec, FieldType, SchemaRegistry, Shape};
/// Fixed-point serialization entry points.
pub use serialize::{FormatStyle, serialize};
/// Descriptor store orchestration.
pub use store::DescriptorStore;
/// Validation entry points and violation taxonomy.
pub use validate::{Severity, Violation, ViolationKind, validate, validate_descriptor};
/// Ordered value tree types.
pub use value::{Number, Object, ObjectEntry, Value};
