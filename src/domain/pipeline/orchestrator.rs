//! Pipeline orchestrator - the per-request state machine

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::state::{PipelineStage, PipelineState, QueryOptions, QueryOutcome};
use crate::domain::audit::{ChatTurn, StageTrace, TraceStore};
use crate::domain::citation::CitationLinker;
use crate::domain::generation::{AnswerGenerator, NO_EVIDENCE_ANSWER, SERVICE_FALLBACK_ANSWER};
use crate::domain::guardrail::{max_severity, Direction, GuardrailEngine, Severity, ViolationCategory};
use crate::domain::retrieval::{best_score, EvidenceRetriever};
use crate::domain::risk::{ClassificationContext, RiskClassifier, RiskTier};
use crate::domain::DomainError;

/// Fixed refusal returned when a guardrail checkpoint blocks the request.
pub const REFUSAL_ANSWER: &str = "This request was blocked because it conflicts with the \
     content safety policy. Remove any sensitive identifiers or restricted topics and try \
     again.";

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Violations at or above this severity abort the pipeline
    #[serde(default = "default_blocking_severity")]
    pub blocking_severity: Severity,
    /// Queries longer than this are rejected before the pipeline starts
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,
}

fn default_blocking_severity() -> Severity {
    Severity::Critical
}

fn default_max_query_chars() -> usize {
    4000
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            blocking_severity: default_blocking_severity(),
            max_query_chars: default_max_query_chars(),
        }
    }
}

impl OrchestratorConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the blocking severity threshold
    pub fn with_blocking_severity(mut self, severity: Severity) -> Self {
        self.blocking_severity = severity;
        self
    }

    /// Set the maximum accepted query length
    pub fn with_max_query_chars(mut self, chars: usize) -> Self {
        self.max_query_chars = chars;
        self
    }
}

/// Owns the shared pipeline state and drives the stage sequence
/// `received -> sanitize_check -> retrieve -> pre_classify -> generate ->
/// outbound_check -> cite -> final_classify -> complete`, with `aborted`
/// reachable from the two guardrail checkpoints.
///
/// Every transition invokes its component and then unconditionally records
/// a stage trace, including on the abort path. Collaborator failures are
/// absorbed locally: the stage is traced as failed, the defined fallback
/// output is substituted, and the machine continues - a degraded, labeled
/// response is always preferred over a caller-visible error.
///
/// Cancellation: the request future can be dropped between any two stages
/// (each stage boundary is an await point); no stage performs a side effect
/// that would need compensation.
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator {
    guardrails: Arc<GuardrailEngine>,
    retriever: EvidenceRetriever,
    classifier: RiskClassifier,
    generator: AnswerGenerator,
    linker: CitationLinker,
    store: Arc<dyn TraceStore>,
    config: OrchestratorConfig,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator from its components
    pub fn new(
        guardrails: Arc<GuardrailEngine>,
        retriever: EvidenceRetriever,
        classifier: RiskClassifier,
        generator: AnswerGenerator,
        linker: CitationLinker,
        store: Arc<dyn TraceStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            guardrails,
            retriever,
            classifier,
            generator,
            linker,
            store,
            config,
        }
    }

    /// Process one query through the full pipeline.
    ///
    /// Malformed input (empty or oversized query) is rejected here, before
    /// any pipeline state exists; everything after this point produces a
    /// well-formed outcome.
    pub async fn handle_query(
        &self,
        session_id: &str,
        query_text: &str,
        options: QueryOptions,
    ) -> Result<QueryOutcome, DomainError> {
        let trimmed = query_text.trim();

        if trimmed.is_empty() {
            return Err(DomainError::validation("Query cannot be empty"));
        }

        if trimmed.chars().count() > self.config.max_query_chars {
            return Err(DomainError::validation(format!(
                "Query exceeds the maximum length of {} characters",
                self.config.max_query_chars
            )));
        }

        let started = Instant::now();
        let mut state = PipelineState::new(session_id, trimmed);

        self.run_pipeline(&mut state, &options).await;

        let message_id = Uuid::new_v4().to_string();
        let answer = state
            .final_answer
            .clone()
            .unwrap_or_else(|| REFUSAL_ANSWER.to_string());

        self.flush(&state, &message_id, &answer).await;

        Ok(QueryOutcome {
            message_id,
            answer,
            risk_tier: state.risk_tier,
            confidence: state.confidence,
            citations: state.citations.clone(),
            violations: state.violations().to_vec(),
            trace: options
                .return_traces
                .then(|| state.stage_traces().to_vec()),
            processing_time_ms: started.elapsed().as_millis() as u64,
            aborted: state.aborted,
        })
    }

    async fn run_pipeline(&self, state: &mut PipelineState, options: &QueryOptions) {
        self.run_received(state, options);

        if let Some(blocked) = self.run_sanitize_check(state, options) {
            self.abort(state, PipelineStage::SanitizeCheck, blocked);
            return;
        }

        self.run_retrieve(state).await;
        self.run_pre_classify(state);
        self.run_generate(state).await;

        if let Some(blocked) = self.run_outbound_check(state, options) {
            self.abort(state, PipelineStage::OutboundCheck, blocked);
            return;
        }

        self.run_cite(state);
        self.run_final_classify(state);
        self.run_complete(state);
    }

    fn run_received(&self, state: &mut PipelineState, options: &QueryOptions) {
        let started = Instant::now();

        state.record_trace(
            StageTrace::success(PipelineStage::Received.name(), started.elapsed())
                .with_summary("query_chars", state.query.chars().count())
                .with_summary("guardrails_enabled", options.enable_guardrails),
        );
    }

    /// Inbound checkpoint. Returns the category that tripped the blocking
    /// threshold, if any.
    fn run_sanitize_check(
        &self,
        state: &mut PipelineState,
        options: &QueryOptions,
    ) -> Option<ViolationCategory> {
        let started = Instant::now();

        // Checkpoints always evaluate; enable_guardrails only gates blocking.
        let violations = self.guardrails.evaluate(&state.query, Direction::Inbound);

        let has_pii = violations
            .iter()
            .any(|v| v.category == ViolationCategory::Pii);

        state.sanitized_query = Some(if has_pii {
            self.guardrails.redact_pii(&state.query)
        } else {
            state.query.clone()
        });

        let blocked = self.blocking_category(&violations, options);
        let violation_count = violations.len();
        state.record_violations(violations);

        state.record_trace(
            StageTrace::success(PipelineStage::SanitizeCheck.name(), started.elapsed())
                .with_summary("violations", violation_count)
                .with_summary("redacted", has_pii),
        );

        blocked
    }

    async fn run_retrieve(&self, state: &mut PipelineState) {
        let started = Instant::now();

        match self.retriever.retrieve(state.effective_query()).await {
            Ok(evidence) => {
                let top_score = best_score(&evidence).unwrap_or(0.0);
                let trace =
                    StageTrace::success(PipelineStage::Retrieve.name(), started.elapsed())
                        .with_summary("evidence_count", evidence.len())
                        .with_summary("top_score", top_score as f64);

                state.retrieved_evidence = evidence;
                state.record_trace(trace);
            }
            Err(error) => {
                warn!(%error, "Retrieval failed, continuing with empty evidence");

                state.retrieved_evidence = Vec::new();
                state.record_trace(
                    StageTrace::failure(PipelineStage::Retrieve.name(), started.elapsed())
                        .with_summary("error", error.to_string())
                        .with_summary("evidence_count", 0),
                );
            }
        }
    }

    fn run_pre_classify(&self, state: &mut PipelineState) {
        let started = Instant::now();

        let assessment = self.classifier.classify(&ClassificationContext {
            query: state.effective_query(),
            evidence: &state.retrieved_evidence,
            violations: state.violations(),
        });

        state.escalate_tier(assessment.tier);
        state.confidence = assessment.confidence;

        state.record_trace(
            StageTrace::success(PipelineStage::PreClassify.name(), started.elapsed())
                .with_summary("risk_tier", state.risk_tier.to_string())
                .with_summary("confidence", assessment.confidence as f64),
        );
    }

    async fn run_generate(&self, state: &mut PipelineState) {
        let started = Instant::now();
        let query = state.effective_query().to_string();

        match self
            .generator
            .generate(&query, &state.retrieved_evidence)
            .await
        {
            Ok(draft) => {
                let trace =
                    StageTrace::success(PipelineStage::Generate.name(), started.elapsed())
                        .with_summary("answer_chars", draft.chars().count())
                        .with_summary("grounded", !state.retrieved_evidence.is_empty());

                state.draft_answer = Some(draft);
                state.record_trace(trace);
            }
            Err(error) => {
                warn!(%error, "Generation failed, substituting canned fallback");

                state.draft_answer = Some(SERVICE_FALLBACK_ANSWER.to_string());
                state.record_trace(
                    StageTrace::failure(PipelineStage::Generate.name(), started.elapsed())
                        .with_summary("error", error.to_string())
                        .with_summary("fallback", true),
                );
            }
        }
    }

    /// Outbound checkpoint over the draft answer.
    fn run_outbound_check(
        &self,
        state: &mut PipelineState,
        options: &QueryOptions,
    ) -> Option<ViolationCategory> {
        let started = Instant::now();
        let draft = state.draft_answer.clone().unwrap_or_default();

        let mut violations = self.guardrails.evaluate(&draft, Direction::Outbound);

        // The grounding heuristic only applies to substantive generated
        // answers; the canned responses already label themselves.
        let canned = draft == NO_EVIDENCE_ANSWER || draft == SERVICE_FALLBACK_ANSWER;
        if !canned {
            if let Some(violation) = self
                .guardrails
                .evaluate_grounding(best_score(&state.retrieved_evidence))
            {
                violations.push(violation);
            }
        }

        let blocked = self.blocking_category(&violations, options);
        let violation_count = violations.len();
        state.record_violations(violations);

        state.record_trace(
            StageTrace::success(PipelineStage::OutboundCheck.name(), started.elapsed())
                .with_summary("violations", violation_count)
                .with_summary("answer_chars", draft.chars().count()),
        );

        blocked
    }

    fn run_cite(&self, state: &mut PipelineState) {
        let started = Instant::now();
        let draft = state.draft_answer.clone().unwrap_or_default();

        let (final_answer, citations) = self.linker.link(&draft, &state.retrieved_evidence);

        debug_assert!(
            citations.len()
                <= state
                    .retrieved_evidence
                    .iter()
                    .map(|e| e.document_id.as_str())
                    .collect::<std::collections::HashSet<_>>()
                    .len(),
            "citation count must not exceed distinct evidence documents"
        );

        state.final_answer = Some(final_answer);
        state.citations = citations;

        state.record_trace(
            StageTrace::success(PipelineStage::Cite.name(), started.elapsed())
                .with_summary("citation_count", state.citations.len()),
        );
    }

    fn run_final_classify(&self, state: &mut PipelineState) {
        let started = Instant::now();

        let assessment = self.classifier.classify(&ClassificationContext {
            query: state.effective_query(),
            evidence: &state.retrieved_evidence,
            violations: state.violations(),
        });

        state.escalate_tier(assessment.tier);
        state.confidence = assessment.confidence;

        state.record_trace(
            StageTrace::success(PipelineStage::FinalClassify.name(), started.elapsed())
                .with_summary("risk_tier", state.risk_tier.to_string())
                .with_summary("confidence", assessment.confidence as f64),
        );
    }

    fn run_complete(&self, state: &mut PipelineState) {
        let started = Instant::now();

        state.record_trace(
            StageTrace::success(PipelineStage::Complete.name(), started.elapsed())
                .with_summary("risk_tier", state.risk_tier.to_string())
                .with_summary("citation_count", state.citations.len())
                .with_summary("violation_count", state.violations().len()),
        );
    }

    /// Terminal abort path. The refusal answer replaces any draft, the tier
    /// is forced to at least `high`, and the abort itself is traced so the
    /// audit record reflects the early termination.
    fn abort(
        &self,
        state: &mut PipelineState,
        checkpoint: PipelineStage,
        category: ViolationCategory,
    ) {
        let started = Instant::now();

        state.aborted = true;
        state.final_answer = Some(REFUSAL_ANSWER.to_string());
        state.escalate_tier(RiskTier::High);

        let violation_tier = state
            .violations()
            .iter()
            .map(|v| v.implied_tier())
            .max()
            .unwrap_or(RiskTier::High);
        state.escalate_tier(violation_tier);

        let assessment = self.classifier.classify(&ClassificationContext {
            query: state.effective_query(),
            evidence: &state.retrieved_evidence,
            violations: state.violations(),
        });
        state.confidence = assessment.confidence;

        debug!(checkpoint = %checkpoint, category = %category, "Pipeline aborted");

        state.record_trace(
            StageTrace::success(PipelineStage::Aborted.name(), started.elapsed())
                .with_summary("checkpoint", checkpoint.name())
                .with_summary("blocked_category", category.to_string())
                .with_summary("risk_tier", state.risk_tier.to_string()),
        );
    }

    /// The category of the worst checkpoint violation, when it meets the
    /// blocking threshold and blocking is enabled.
    fn blocking_category(
        &self,
        violations: &[crate::domain::guardrail::Violation],
        options: &QueryOptions,
    ) -> Option<ViolationCategory> {
        if !options.enable_guardrails {
            return None;
        }

        let worst = max_severity(violations)?;
        if worst < self.config.blocking_severity {
            return None;
        }

        violations
            .iter()
            .filter(|v| v.severity == worst)
            .map(|v| v.category)
            .next()
    }

    /// Persist traces and the chat turn. Storage failures are logged, never
    /// surfaced: the response is already complete and must not fail late.
    async fn flush(&self, state: &PipelineState, message_id: &str, answer: &str) {
        if let Err(error) = self
            .store
            .append_traces(&state.session_id, state.stage_traces().to_vec())
            .await
        {
            warn!(%error, session_id = %state.session_id, "Failed to persist stage traces");
        }

        let turn = ChatTurn::new(
            &state.session_id,
            message_id,
            &state.query,
            answer,
            state.risk_tier,
            state.confidence,
        )
        .with_violation_count(state.violations().len())
        .with_aborted(state.aborted);

        if let Err(error) = self.store.record_turn(turn).await {
            warn!(%error, session_id = %state.session_id, "Failed to persist chat turn");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::StageStatus;
    use crate::domain::generation::completion::mock::MockCompletionProvider;
    use crate::domain::generation::GeneratorConfig;
    use crate::domain::guardrail::GuardrailConfig;
    use crate::domain::retrieval::search::mock::MockSimilaritySearch;
    use crate::domain::retrieval::{RetrieverConfig, SearchHit};
    use crate::domain::risk::ClassifierConfig;
    use crate::infrastructure::audit::InMemoryTraceStore;

    const NORMAL_STAGES: [&str; 9] = [
        "received",
        "sanitize_check",
        "retrieve",
        "pre_classify",
        "generate",
        "outbound_check",
        "cite",
        "final_classify",
        "complete",
    ];

    fn orchestrator(
        index: MockSimilaritySearch,
        completion: MockCompletionProvider,
    ) -> PipelineOrchestrator {
        orchestrator_with_config(index, completion, OrchestratorConfig::default())
    }

    fn orchestrator_with_config(
        index: MockSimilaritySearch,
        completion: MockCompletionProvider,
        config: OrchestratorConfig,
    ) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            Arc::new(GuardrailEngine::new(GuardrailConfig::default())),
            EvidenceRetriever::new(Arc::new(index), RetrieverConfig::default()),
            RiskClassifier::new(ClassifierConfig::default()),
            AnswerGenerator::new(Arc::new(completion), GeneratorConfig::default()),
            CitationLinker::default(),
            Arc::new(InMemoryTraceStore::new()),
            config,
        )
    }

    fn stage_names(outcome: &QueryOutcome) -> Vec<String> {
        outcome
            .trace
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.stage_name.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_grounded_query_completes_with_nine_traces() {
        let index = MockSimilaritySearch::new().with_hits(vec![SearchHit::new(
            "model_risk_management_policy",
            "Model risk is the potential for adverse consequences from model errors.",
            0.91,
        )]);
        let completion = MockCompletionProvider::new()
            .with_response("Model risk is the potential for adverse consequences ...");

        let orchestrator = orchestrator(index, completion);
        let outcome = orchestrator
            .handle_query(
                "session-1",
                "What is model risk?",
                QueryOptions::new().with_return_traces(true),
            )
            .await
            .unwrap();

        assert!(!outcome.aborted);
        assert!(outcome.risk_tier <= RiskTier::Limited);
        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(
            outcome.citations[0].document_id,
            "model_risk_management_policy"
        );
        assert!(outcome.violations.is_empty());
        assert_eq!(stage_names(&outcome), NORMAL_STAGES);
    }

    #[tokio::test]
    async fn test_pii_query_aborts_with_three_traces() {
        let index = MockSimilaritySearch::new();
        let completion = MockCompletionProvider::new().with_response("unused");

        let orchestrator = orchestrator(index, completion);
        let outcome = orchestrator
            .handle_query(
                "session-1",
                "Is account 4111 1111 1111 1111 within policy limits?",
                QueryOptions::new().with_return_traces(true),
            )
            .await
            .unwrap();

        assert!(outcome.aborted);
        assert_eq!(outcome.answer, REFUSAL_ANSWER);
        assert!(outcome.risk_tier >= RiskTier::High);
        assert!(outcome
            .violations
            .iter()
            .any(|v| v.category == ViolationCategory::Pii));
        assert_eq!(
            stage_names(&outcome),
            vec!["received", "sanitize_check", "aborted"]
        );
    }

    #[tokio::test]
    async fn test_disabled_guardrails_record_but_never_block() {
        let index = MockSimilaritySearch::new().with_hits(vec![SearchHit::new(
            "policy",
            "Some passage",
            0.9,
        )]);
        let completion = MockCompletionProvider::new().with_response("An answer.");

        let orchestrator = orchestrator(index, completion);
        let outcome = orchestrator
            .handle_query(
                "session-1",
                "Is account 4111 1111 1111 1111 within policy limits?",
                QueryOptions::new()
                    .with_enable_guardrails(false)
                    .with_return_traces(true),
            )
            .await
            .unwrap();

        assert!(!outcome.aborted);
        assert!(outcome
            .violations
            .iter()
            .any(|v| v.category == ViolationCategory::Pii));
        assert_eq!(stage_names(&outcome).len(), 9);
    }

    #[tokio::test]
    async fn test_sanitized_query_redacts_pii_for_downstream_stages() {
        let index = MockSimilaritySearch::new();
        let completion = MockCompletionProvider::new().with_response("unused");

        let orchestrator = orchestrator(index, completion);

        // An email is a medium violation: recorded and redacted, not blocked.
        let mut state = PipelineState::new("s", "Reach me at jane.doe@example.com please");
        let options = QueryOptions::default();
        assert!(orchestrator.run_sanitize_check(&mut state, &options).is_none());

        let sanitized = state.sanitized_query.as_deref().unwrap();
        assert!(!sanitized.contains("jane.doe@example.com"));
        assert!(sanitized.contains("ja***@***"));
    }

    #[tokio::test]
    async fn test_retrieval_outage_degrades_to_empty_evidence() {
        let index = MockSimilaritySearch::new().with_error("index down");
        let completion = MockCompletionProvider::new().with_response("unused");

        let orchestrator = orchestrator(index, completion);
        let outcome = orchestrator
            .handle_query(
                "session-1",
                "What is model risk?",
                QueryOptions::new().with_return_traces(true),
            )
            .await
            .unwrap();

        assert!(!outcome.aborted);

        let traces = outcome.trace.as_ref().unwrap();
        let retrieve = traces.iter().find(|t| t.stage_name == "retrieve").unwrap();
        assert_eq!(retrieve.status, StageStatus::Failure);

        // No evidence means the no-policy answer and an escalated tier.
        assert_eq!(outcome.answer, NO_EVIDENCE_ANSWER);
        assert!(outcome.risk_tier >= RiskTier::Limited);
        assert_eq!(traces.len(), 9);
    }

    #[tokio::test]
    async fn test_empty_retrieval_yields_no_policy_answer() {
        let index = MockSimilaritySearch::new();
        let completion = MockCompletionProvider::new().with_error("must not be called");

        let orchestrator = orchestrator(index, completion);
        let outcome = orchestrator
            .handle_query("session-1", "What is model risk?", QueryOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.answer, NO_EVIDENCE_ANSWER);
        assert!(outcome.citations.is_empty());
        assert!(outcome.risk_tier >= RiskTier::Limited);
    }

    #[tokio::test]
    async fn test_completion_outage_substitutes_canned_fallback() {
        let index = MockSimilaritySearch::new().with_hits(vec![SearchHit::new(
            "policy",
            "Relevant passage",
            0.9,
        )]);
        let completion = MockCompletionProvider::new().with_error("service down");

        let orchestrator = orchestrator(index, completion);
        let outcome = orchestrator
            .handle_query(
                "session-1",
                "What is model risk?",
                QueryOptions::new().with_return_traces(true),
            )
            .await
            .unwrap();

        assert!(!outcome.answer.is_empty());
        assert_eq!(outcome.answer, SERVICE_FALLBACK_ANSWER);

        let traces = outcome.trace.as_ref().unwrap();
        let generate = traces.iter().find(|t| t.stage_name == "generate").unwrap();
        assert_eq!(generate.status, StageStatus::Failure);
        assert_eq!(traces.len(), 9);
    }

    #[tokio::test]
    async fn test_ungrounded_answer_gets_hallucination_violation() {
        // Evidence exists but scores below the relevance threshold, and the
        // completion service still produces a confident answer.
        let index = MockSimilaritySearch::new().with_hits(vec![SearchHit::new(
            "policy",
            "Barely related",
            0.3,
        )]);
        let completion =
            MockCompletionProvider::new().with_response("The limit is definitely 5%.");

        let orchestrator = orchestrator(index, completion);
        let outcome = orchestrator
            .handle_query("session-1", "What is the exposure limit?", QueryOptions::default())
            .await
            .unwrap();

        assert!(outcome
            .violations
            .iter()
            .any(|v| v.category == ViolationCategory::HallucinationRisk));
        assert!(outcome.risk_tier >= RiskTier::Limited);
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_pipeline() {
        let orchestrator = orchestrator(
            MockSimilaritySearch::new(),
            MockCompletionProvider::new().with_response("unused"),
        );

        let result = orchestrator
            .handle_query("session-1", "   ", QueryOptions::default())
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_oversized_query_rejected_before_pipeline() {
        let orchestrator = orchestrator_with_config(
            MockSimilaritySearch::new(),
            MockCompletionProvider::new().with_response("unused"),
            OrchestratorConfig::new().with_max_query_chars(10),
        );

        let result = orchestrator
            .handle_query("session-1", "a query well beyond ten characters", QueryOptions::default())
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_traces_omitted_unless_requested_but_always_persisted() {
        let store = Arc::new(InMemoryTraceStore::new());
        let orchestrator = PipelineOrchestrator::new(
            Arc::new(GuardrailEngine::default()),
            EvidenceRetriever::new(
                Arc::new(MockSimilaritySearch::new().with_hits(vec![SearchHit::new(
                    "policy",
                    "Passage",
                    0.9,
                )])),
                RetrieverConfig::default(),
            ),
            RiskClassifier::default(),
            AnswerGenerator::new(
                Arc::new(MockCompletionProvider::new().with_response("Answer.")),
                GeneratorConfig::default(),
            ),
            CitationLinker::default(),
            store.clone(),
            OrchestratorConfig::default(),
        );

        let outcome = orchestrator
            .handle_query("session-42", "What is model risk?", QueryOptions::default())
            .await
            .unwrap();

        assert!(outcome.trace.is_none());

        let persisted = store.traces_for_session("session-42").await.unwrap();
        assert_eq!(persisted.len(), 9);

        let turns = store.turns_for_session("session-42").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].answer, "Answer.");
    }

    #[tokio::test]
    async fn test_lower_blocking_threshold_blocks_medium_violations() {
        let orchestrator = orchestrator_with_config(
            MockSimilaritySearch::new(),
            MockCompletionProvider::new().with_response("unused"),
            OrchestratorConfig::new().with_blocking_severity(Severity::Medium),
        );

        // A banned topic is a medium violation; with the lowered threshold
        // it blocks.
        let outcome = orchestrator
            .handle_query(
                "session-1",
                "Explain how insider trading works",
                QueryOptions::new().with_return_traces(true),
            )
            .await
            .unwrap();

        assert!(outcome.aborted);
        assert_eq!(stage_names(&outcome).len(), 3);
    }
}
