use std::collections::VecDeque;

use chrono::Utc;
use tracing::{debug, info};

use super::error::WorkflowError;
use super::types::{
    Advance, EngineSnapshot, EngineStatus, Evidence, Step, TransitionKind, TransitionRecord,
    WorkflowDefinition,
};
use crate::telemetry::generate_session_id;

pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Guarded linear stepper.
///
/// Owns the current index, the evidence ledger and the completion status.
/// Renderers read [`WorkflowEngine::snapshot`] and drive it through
/// `submit_evidence`, `advance`, `retreat` and `reset`.
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    definition: WorkflowDefinition,
    session_id: String,
    current_index: usize,
    evidence: Evidence,
    status: EngineStatus,
    history: VecDeque<TransitionRecord>,
    history_limit: usize,
}

impl WorkflowEngine {
    pub fn new(definition: WorkflowDefinition) -> Self {
        let evidence = Evidence::for_definition(&definition);
        Self {
            definition,
            session_id: generate_session_id(),
            current_index: 0,
            evidence,
            status: EngineStatus::Active,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        while self.history.len() > limit {
            self.history.pop_front();
        }
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> &Step {
        &self.definition.steps()[self.current_index]
    }

    pub fn step_count(&self) -> usize {
        self.definition.len()
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == EngineStatus::Completed
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index + 1 == self.definition.len()
    }

    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.iter()
    }

    /// Display-only progress in `(0, 1]`
    pub fn progress_fraction(&self) -> f64 {
        (self.current_index + 1) as f64 / self.definition.len() as f64
    }

    /// Whether `advance()` would succeed right now. With the default guard
    /// this is the current step's own evidence flag; a `Guard::Requires`
    /// step also needs the evidence of the steps it lists.
    pub fn can_advance(&self) -> bool {
        if self.is_completed() {
            return false;
        }
        let step = self.current_step();
        step.guard.is_satisfied(&step.id, &self.evidence)
    }

    pub fn submit_evidence(&mut self, step_id: &str) -> Result<bool, WorkflowError> {
        self.ensure_active("submit_evidence")?;

        let index = self.definition.position(step_id).ok_or_else(|| {
            debug!(
                session_id = %self.session_id,
                workflow = %self.definition.name(),
                step = %step_id,
                "Rejected evidence for unknown step"
            );
            WorkflowError::UnknownStep {
                step: step_id.into(),
            }
        })?;

        let changed = self.evidence.mark(step_id).unwrap_or(false);
        if changed {
            info!(
                session_id = %self.session_id,
                workflow = %self.definition.name(),
                step = %step_id,
                current_index = self.current_index,
                "Evidence submitted"
            );
            self.record(TransitionKind::EvidenceSubmitted, self.current_index, self.current_index, index);
        }
        Ok(changed)
    }

    pub fn advance(&mut self) -> Result<Advance, WorkflowError> {
        self.ensure_active("advance")?;

        if !self.can_advance() {
            let step = self.current_step().id.clone();
            debug!(
                session_id = %self.session_id,
                workflow = %self.definition.name(),
                step = %step,
                "Advance rejected: guard not satisfied"
            );
            return Err(WorkflowError::GuardNotSatisfied { step });
        }

        let from = self.current_index;
        if self.is_last_step() {
            self.status = EngineStatus::Completed;
            info!(
                session_id = %self.session_id,
                workflow = %self.definition.name(),
                step = %self.current_step().id,
                "Workflow completed"
            );
            self.record(TransitionKind::Completed, from, from, from);
            return Ok(Advance::Completed);
        }

        self.current_index += 1;
        info!(
            session_id = %self.session_id,
            workflow = %self.definition.name(),
            from = from,
            to = self.current_index,
            step = %self.current_step().id,
            "Workflow advanced"
        );
        self.record(TransitionKind::Advanced, from, self.current_index, self.current_index);
        Ok(Advance::Moved {
            index: self.current_index,
        })
    }

    pub fn retreat(&mut self) -> Result<usize, WorkflowError> {
        self.ensure_active("retreat")?;

        if self.current_index == 0 {
            debug!(
                session_id = %self.session_id,
                workflow = %self.definition.name(),
                "Retreat rejected: already at first step"
            );
            return Err(WorkflowError::AtStart);
        }

        let from = self.current_index;
        self.current_index -= 1;
        info!(
            session_id = %self.session_id,
            workflow = %self.definition.name(),
            from = from,
            to = self.current_index,
            step = %self.current_step().id,
            "Workflow retreated"
        );
        self.record(TransitionKind::Retreated, from, self.current_index, self.current_index);
        Ok(self.current_index)
    }

    /// Back to the first step with all evidence cleared; valid in any status
    pub fn reset(&mut self) {
        let from = self.current_index;
        self.current_index = 0;
        self.evidence.clear();
        self.status = EngineStatus::Active;
        info!(
            session_id = %self.session_id,
            workflow = %self.definition.name(),
            from = from,
            "Workflow reset"
        );
        self.record(TransitionKind::Reset, from, 0, 0);
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            session_id: self.session_id.clone(),
            workflow: self.definition.name().to_string(),
            step: self.current_step().id.clone(),
            step_index: self.current_index,
            step_count: self.step_count(),
            progress: self.progress_fraction(),
            can_advance: self.can_advance(),
            status: self.status,
            evidence: self.evidence.clone(),
        }
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), WorkflowError> {
        if self.is_completed() {
            debug!(
                session_id = %self.session_id,
                workflow = %self.definition.name(),
                operation = operation,
                "Rejected transition on completed workflow"
            );
            return Err(WorkflowError::AlreadyCompleted);
        }
        Ok(())
    }

    fn record(&mut self, kind: TransitionKind, from_index: usize, to_index: usize, step_index: usize) {
        if self.history_limit == 0 {
            return;
        }
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(TransitionRecord {
            kind,
            from_index,
            to_index,
            step: self.definition.steps()[step_index].id.clone(),
            at: Utc::now(),
        });
    }
}
