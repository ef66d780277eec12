//! Builder API for machine definitions.
//!
//! This module provides a fluent builder and a declaration macro for state
//! tables, validating the table once up front so the engine can index it
//! without further checks.

pub mod definition;
pub mod error;
pub mod macros;

pub use definition::MachineDefinitionBuilder;
pub use error::BuildError;
