//! Request extractors and input validation for the HTTP layer.

mod path;
mod validation;
pub use path::ValidatedPath;
pub use validation::ValidationErrors;
