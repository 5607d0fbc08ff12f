// Flow graph validation, instantiation, and completion cascade

pub mod instantiate;
pub mod lifecycle;
pub mod validator;

pub use instantiate::instantiate;
pub use lifecycle::{activate, complete, CompletionDelta};
pub use validator::{detect_cycle, validate, ValidationReport};
