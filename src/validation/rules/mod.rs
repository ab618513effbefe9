//! Validation Rules
//!
//! Each file in this module contains one validation rule:
//!
//! - `unknown_block_type.rs` - Block types without a registered executor
//! - `block_properties.rs` - Unknown, missing and mistyped block properties
//! - `runtime_parameters.rs` - Runtime parameters that are unset or unparsable
//! - `pipe_structure.rs` - Pipe endpoints, single inputs, cycles, IO types
//! - `transform_types.rs` - Transform bodies against their declared output
//! - `valuetype_definitions.rs` - Constraints referenced by value types
//! - `constraint_definitions.rs` - Constraint kinds, properties and bodies

mod block_properties;
mod constraint_definitions;
mod pipe_structure;
mod runtime_parameters;
mod transform_types;
mod unknown_block_type;
mod valuetype_definitions;

pub use block_properties::BlockPropertiesRule;
pub use constraint_definitions::ConstraintDefinitionsRule;
pub use pipe_structure::PipeStructureRule;
pub use runtime_parameters::RuntimeParametersRule;
pub use transform_types::TransformTypesRule;
pub use unknown_block_type::UnknownBlockTypeRule;
pub use valuetype_definitions::ValuetypeDefinitionsRule;
