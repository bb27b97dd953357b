//! # Mapping Module
//!
//! Textual key specifications and the bindings built from them.
//!
//! - [`keyspec`] parses and serializes the `kind(slot,...)` token format
//! - [`binding`] holds the control table and folds captured keys into bindings

pub mod binding;
pub mod keyspec;

pub use binding::{merge_key, project, Binding, ButtonMapping, ControlId, Parameter, BUTTON_MAPPINGS};
pub use keyspec::{parse_all, serialize_all, Direction, KeyKind, KeySpec, Sign, Value};
