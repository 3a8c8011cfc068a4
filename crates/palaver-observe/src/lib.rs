//! Observability setup for Palaver: structured logging via `tracing`, with an
//! optional OpenTelemetry bridge for span export.

pub mod tracing_setup;
