//! Guardrail engine - safety checks on inbound and outbound text

pub mod config;
pub mod engine;
pub mod violation;

pub use config::GuardrailConfig;
pub use engine::{Direction, GuardrailEngine};
pub use violation::{max_severity, Severity, Violation, ViolationCategory};
