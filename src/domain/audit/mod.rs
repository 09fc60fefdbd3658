//! Audit recording and trace persistence

pub mod recorder;
pub mod store;
pub mod trace;

pub use recorder::AuditRecorder;
pub use store::{ChatTurn, TraceStore};
pub use trace::{StageStatus, StageTrace};
