// Core types and execution engine for Cadence dependency-driven workflows

pub mod engine;
pub mod flow;
pub mod schedule;
pub mod template;
pub mod types;

pub use engine::{EngineError, FlowEngine};
pub use flow::{CompletionDelta, ValidationReport};
pub use types::*;
