//! Audit recorder - append-only accumulation of stage traces

use tracing::info;

use super::trace::StageTrace;

/// Accumulates the execution trace for one pipeline invocation.
///
/// Append-only: the recorder is called exactly once per scheduled stage,
/// whatever the outcome, so the number of accumulated traces always equals
/// the number of stages the request actually passed through. There is no
/// removal or mutation path.
#[derive(Debug, Default)]
pub struct AuditRecorder {
    traces: Vec<StageTrace>,
}

impl AuditRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage trace
    pub fn record(&mut self, trace: StageTrace) {
        info!(
            stage = %trace.stage_name,
            status = %trace.status,
            duration_ms = trace.duration_ms,
            "Pipeline stage recorded"
        );

        self.traces.push(trace);
    }

    /// Number of traces recorded so far
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Whether any trace has been recorded
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// The traces recorded so far, in execution order
    pub fn traces(&self) -> &[StageTrace] {
        &self.traces
    }

    /// Consume the recorder and return the accumulated traces
    pub fn into_traces(self) -> Vec<StageTrace> {
        self.traces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::trace::StageStatus;
    use std::time::Duration;

    #[test]
    fn test_records_in_order() {
        let mut recorder = AuditRecorder::new();
        assert!(recorder.is_empty());

        recorder.record(StageTrace::success("received", Duration::ZERO));
        recorder.record(StageTrace::failure("retrieve", Duration::from_millis(5)));
        recorder.record(StageTrace::skipped("generate"));

        assert_eq!(recorder.len(), 3);

        let traces = recorder.into_traces();
        assert_eq!(traces[0].stage_name, "received");
        assert_eq!(traces[1].status, StageStatus::Failure);
        assert_eq!(traces[2].status, StageStatus::Skipped);
    }
}
