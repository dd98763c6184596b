//! Routine invocation: validated names from code, values always as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
