use tracing::{debug, info};

use super::types::{
    BackOutcome, VerificationEvent, VerificationSnapshot, VerificationStatus, VerificationStep,
};
use crate::collaborators::{ExitHandler, ExitReason};
use crate::engine::{Advance, WorkflowDefinition, WorkflowEngine, WorkflowError};

pub const VERIFICATION_WORKFLOW: &str = "verification";

/// Identity-verification wizard: ID card, address proof, phone number.
///
/// Evidence for a step is recorded by the upload/verify integrations through
/// the `complete_*` methods; the wizard only moves forward once the current
/// step's evidence is in.
pub struct VerificationWorkflow {
    engine: WorkflowEngine,
    exit_handler: Box<dyn ExitHandler>,
    exited: bool,
}

impl std::fmt::Debug for VerificationWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationWorkflow")
            .field("engine", &self.engine)
            .field("exited", &self.exited)
            .finish()
    }
}

impl VerificationWorkflow {
    pub fn new(exit_handler: Box<dyn ExitHandler>) -> Self {
        let ids: Vec<&str> = VerificationStep::ALL.iter().map(|step| step.id()).collect();
        let definition = WorkflowDefinition::from_fixed_ids(VERIFICATION_WORKFLOW, &ids);
        Self {
            engine: WorkflowEngine::new(definition),
            exit_handler,
            exited: false,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.engine = self.engine.with_history_limit(limit);
        self
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    pub fn session_id(&self) -> &str {
        self.engine.session_id()
    }

    pub fn complete_id_upload(&mut self) -> Result<bool, WorkflowError> {
        self.submit(VerificationStep::IdCard)
    }

    pub fn complete_address_upload(&mut self) -> Result<bool, WorkflowError> {
        self.submit(VerificationStep::AddressProof)
    }

    pub fn complete_phone_verification(&mut self) -> Result<bool, WorkflowError> {
        self.submit(VerificationStep::PhoneNumber)
    }

    /// Record evidence for any step, not only the current one
    pub fn submit(&mut self, step: VerificationStep) -> Result<bool, WorkflowError> {
        self.ensure_not_exited()?;
        self.engine.submit_evidence(step.id())
    }

    pub fn advance(&mut self) -> Result<Advance, WorkflowError> {
        self.ensure_not_exited()?;
        let outcome = self.engine.advance()?;
        if outcome == Advance::Completed {
            info!(
                session_id = %self.engine.session_id(),
                "Identity verification completed"
            );
            self.exit_handler
                .on_exit(VERIFICATION_WORKFLOW, ExitReason::VerificationCompleted);
        }
        Ok(outcome)
    }

    pub fn retreat(&mut self) -> Result<VerificationStep, WorkflowError> {
        self.ensure_not_exited()?;
        self.engine.retreat()?;
        Ok(self.current_step())
    }

    /// Screen back gesture: previous step, or exit from the first one
    pub fn back(&mut self) -> Result<BackOutcome, WorkflowError> {
        self.ensure_not_exited()?;
        if self.engine.is_completed() {
            return Err(WorkflowError::AlreadyCompleted);
        }
        if self.engine.current_index() > 0 {
            return self.retreat().map(BackOutcome::Retreated);
        }

        self.exited = true;
        info!(
            session_id = %self.engine.session_id(),
            submitted = self.engine.evidence().submitted_count(),
            "Identity verification cancelled from first step"
        );
        self.exit_handler
            .on_exit(VERIFICATION_WORKFLOW, ExitReason::Cancelled);
        Ok(BackOutcome::Exited)
    }

    pub fn handle(&mut self, event: VerificationEvent) -> Result<VerificationSnapshot, WorkflowError> {
        match event {
            VerificationEvent::Submit(step) => {
                self.submit(step)?;
            }
            VerificationEvent::Advance => {
                self.advance()?;
            }
            VerificationEvent::Back => {
                self.back()?;
            }
        }
        Ok(self.snapshot())
    }

    pub fn current_step(&self) -> VerificationStep {
        VerificationStep::from_index(self.engine.current_index()).unwrap_or(VerificationStep::IdCard)
    }

    pub fn can_advance(&self) -> bool {
        !self.exited && self.engine.can_advance()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.engine.progress_fraction()
    }

    pub fn is_submitted(&self, step: VerificationStep) -> bool {
        self.engine.evidence().is_submitted(step.id())
    }

    pub fn status(&self) -> VerificationStatus {
        if self.exited {
            VerificationStatus::Exited
        } else if self.engine.is_completed() {
            VerificationStatus::Completed
        } else {
            VerificationStatus::Active
        }
    }

    pub fn snapshot(&self) -> VerificationSnapshot {
        let step = self.current_step();
        VerificationSnapshot {
            session_id: self.engine.session_id().to_string(),
            step,
            info: step.info(),
            progress_label: step.progress_label(),
            step_index: self.engine.current_index(),
            step_count: self.engine.step_count(),
            progress: self.progress_fraction(),
            can_advance: self.can_advance(),
            status: self.status(),
            evidence: self.engine.evidence().clone(),
        }
    }

    fn ensure_not_exited(&self) -> Result<(), WorkflowError> {
        if self.exited {
            debug!(
                session_id = %self.engine.session_id(),
                "Rejected event on exited verification workflow"
            );
            return Err(WorkflowError::Exited);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::MockExitHandler;
    use mockall::predicate::eq;

    fn silent_handler() -> Box<dyn ExitHandler> {
        let mut handler = MockExitHandler::new();
        handler.expect_on_exit().never();
        Box::new(handler)
    }

    #[test]
    fn test_complete_flow_calls_exit_handler_once() {
        let mut handler = MockExitHandler::new();
        handler
            .expect_on_exit()
            .with(eq(VERIFICATION_WORKFLOW), eq(ExitReason::VerificationCompleted))
            .times(1)
            .return_const(());
        let mut workflow = VerificationWorkflow::new(Box::new(handler));

        workflow.complete_id_upload().unwrap();
        workflow.advance().unwrap();
        workflow.complete_address_upload().unwrap();
        workflow.advance().unwrap();
        workflow.complete_phone_verification().unwrap();
        assert_eq!(workflow.advance().unwrap(), Advance::Completed);
        assert_eq!(workflow.status(), VerificationStatus::Completed);
        assert!(!workflow.can_advance());
    }

    #[test]
    fn test_back_from_first_step_exits() {
        let mut handler = MockExitHandler::new();
        handler
            .expect_on_exit()
            .with(eq(VERIFICATION_WORKFLOW), eq(ExitReason::Cancelled))
            .times(1)
            .return_const(());
        let mut workflow = VerificationWorkflow::new(Box::new(handler));

        assert_eq!(workflow.back().unwrap(), BackOutcome::Exited);
        assert_eq!(workflow.status(), VerificationStatus::Exited);
        assert!(matches!(workflow.complete_id_upload(), Err(WorkflowError::Exited)));
        assert!(matches!(workflow.back(), Err(WorkflowError::Exited)));
    }

    #[test]
    fn test_back_from_later_step_retreats() {
        let mut workflow = VerificationWorkflow::new(silent_handler());
        workflow.complete_id_upload().unwrap();
        workflow.advance().unwrap();

        assert_eq!(
            workflow.back().unwrap(),
            BackOutcome::Retreated(VerificationStep::IdCard)
        );
        assert!(workflow.is_submitted(VerificationStep::IdCard));
        assert_eq!(workflow.status(), VerificationStatus::Active);
    }

    #[test]
    fn test_handle_returns_snapshot() {
        let mut workflow = VerificationWorkflow::new(silent_handler());

        let snapshot = workflow
            .handle(VerificationEvent::Submit(VerificationStep::IdCard))
            .unwrap();
        assert!(snapshot.can_advance);
        assert_eq!(snapshot.step, VerificationStep::IdCard);

        let snapshot = workflow.handle(VerificationEvent::Advance).unwrap();
        assert_eq!(snapshot.step, VerificationStep::AddressProof);
        assert_eq!(snapshot.info.title, "Proof of Address");
        assert_eq!(snapshot.progress_label, "Step 2 of 3");
        assert!(!snapshot.can_advance);

        let err = workflow.handle(VerificationEvent::Advance).unwrap_err();
        assert!(matches!(err, WorkflowError::GuardNotSatisfied { .. }));
        assert_eq!(workflow.current_step(), VerificationStep::AddressProof);
    }
}
