//! Logging and tracing setup for Tablesmith

pub mod attributes;
pub mod spans;
pub mod tracer;

pub use spans::{OperationSpanAttributes, operation_span, stage_span};
pub use tracer::{init_telemetry, register_span_processor, tracer_provider};
