use std::time::Duration;

use tracing::{debug, info, warn};

use super::types::{
    AlertDispatch, AlertEvent, AlertLevel, AlertPhase, AlertSnapshot, AlertStatus, CancelOutcome,
};
use crate::collaborators::{AlertTransport, ExitHandler, ExitReason};
use crate::engine::{WorkflowDefinition, WorkflowEngine, WorkflowError};

pub const ALERT_WORKFLOW: &str = "alert";
pub const DEFAULT_PULSE_PERIOD: Duration = Duration::from_millis(1600);

/// Alert composer: SELECT a level, CONFIRM it, then SENT.
///
/// Cancelling is phase dependent. From SELECT the whole workflow exits; from
/// CONFIRM or SENT it returns to SELECT with the level cleared, revoking the
/// alert first when it was already sent.
pub struct AlertWorkflow {
    engine: WorkflowEngine,
    level: Option<AlertLevel>,
    dispatch: Option<AlertDispatch>,
    transport: Box<dyn AlertTransport>,
    exit_handler: Box<dyn ExitHandler>,
    pulse_period: Duration,
    exited: bool,
}

impl std::fmt::Debug for AlertWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertWorkflow")
            .field("engine", &self.engine)
            .field("level", &self.level)
            .field("dispatch", &self.dispatch)
            .field("pulse_period", &self.pulse_period)
            .field("exited", &self.exited)
            .finish()
    }
}

impl AlertWorkflow {
    pub fn new(transport: Box<dyn AlertTransport>, exit_handler: Box<dyn ExitHandler>) -> Self {
        let ids: Vec<&str> = AlertPhase::ALL.iter().map(|phase| phase.step_id()).collect();
        let definition = WorkflowDefinition::from_fixed_ids(ALERT_WORKFLOW, &ids);
        Self {
            engine: WorkflowEngine::new(definition),
            level: None,
            dispatch: None,
            transport,
            exit_handler,
            pulse_period: DEFAULT_PULSE_PERIOD,
            exited: false,
        }
    }

    pub fn with_pulse_period(mut self, period: Duration) -> Self {
        self.pulse_period = period;
        self
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

    pub fn phase(&self) -> AlertPhase {
        AlertPhase::from_index(self.engine.current_index()).unwrap_or(AlertPhase::Select)
    }

    pub fn level(&self) -> Option<AlertLevel> {
        self.level
    }

    /// The alert currently out, if any
    pub fn dispatch(&self) -> Option<&AlertDispatch> {
        self.dispatch.as_ref()
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn select_level(&mut self, level: AlertLevel) -> Result<(), WorkflowError> {
        self.ensure_phase("select_level", AlertPhase::Select)?;

        self.engine.submit_evidence(AlertPhase::Select.step_id())?;
        self.engine.advance()?;
        self.level = Some(level);
        info!(
            session_id = %self.engine.session_id(),
            level = %level,
            "Alert level selected"
        );
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<&AlertDispatch, WorkflowError> {
        self.ensure_phase("confirm", AlertPhase::Confirm)?;
        let level = self.level.ok_or(WorkflowError::NoLevelSelected)?;

        let dispatch = AlertDispatch::new(level);
        if let Err(e) = self.transport.transmit(&dispatch) {
            warn!(
                session_id = %self.engine.session_id(),
                level = %level,
                error = %e,
                "Alert transmission failed"
            );
            return Err(WorkflowError::Collaborator {
                operation: "transmit",
                reason: e.to_string(),
            });
        }

        self.engine.submit_evidence(AlertPhase::Confirm.step_id())?;
        self.engine.advance()?;
        info!(
            session_id = %self.engine.session_id(),
            level = %level,
            alert_id = %dispatch.alert_id,
            "Alert sent, pulse started"
        );
        Ok(&*self.dispatch.insert(dispatch))
    }

    pub fn cancel(&mut self) -> Result<CancelOutcome, WorkflowError> {
        self.ensure_not_exited()?;

        match (self.phase(), self.dispatch.clone()) {
            (AlertPhase::Select, _) => {
                self.exited = true;
                info!(
                    session_id = %self.engine.session_id(),
                    "Alert composer closed"
                );
                self.exit_handler.on_exit(ALERT_WORKFLOW, ExitReason::Cancelled);
                Ok(CancelOutcome::Exited)
            }
            (AlertPhase::Sent, Some(dispatch)) => {
                if let Err(e) = self.transport.revoke(&dispatch) {
                    warn!(
                        session_id = %self.engine.session_id(),
                        alert_id = %dispatch.alert_id,
                        error = %e,
                        "Alert revocation failed"
                    );
                    return Err(WorkflowError::Collaborator {
                        operation: "revoke",
                        reason: e.to_string(),
                    });
                }
                self.return_to_select();
                info!(
                    session_id = %self.engine.session_id(),
                    alert_id = %dispatch.alert_id,
                    "Alert revoked, pulse stopped"
                );
                Ok(CancelOutcome::Revoked {
                    alert_id: dispatch.alert_id,
                })
            }
            (phase, _) => {
                if phase == AlertPhase::Sent {
                    warn!(
                        session_id = %self.engine.session_id(),
                        "SENT phase without a dispatched alert; nothing to revoke"
                    );
                }
                self.return_to_select();
                info!(
                    session_id = %self.engine.session_id(),
                    "Alert confirmation cancelled"
                );
                Ok(CancelOutcome::Reverted)
            }
        }
    }

    pub fn handle(&mut self, event: AlertEvent) -> Result<AlertSnapshot, WorkflowError> {
        match event {
            AlertEvent::Select(level) => self.select_level(level)?,
            AlertEvent::Confirm => {
                self.confirm()?;
            }
            AlertEvent::Cancel => {
                self.cancel()?;
            }
        }
        Ok(self.snapshot())
    }

    /// Renderer drives its looping visual cue from this flag
    pub fn is_pulsing(&self) -> bool {
        !self.exited && self.phase() == AlertPhase::Sent
    }

    pub fn pulse_period(&self) -> Option<Duration> {
        self.is_pulsing().then_some(self.pulse_period)
    }

    /// Whether `confirm()` is currently legal
    pub fn can_advance(&self) -> bool {
        !self.exited && self.phase() == AlertPhase::Confirm && self.level.is_some()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.engine.progress_fraction()
    }

    pub fn status(&self) -> AlertStatus {
        if self.exited {
            AlertStatus::Exited
        } else {
            AlertStatus::Active
        }
    }

    pub fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot {
            session_id: self.engine.session_id().to_string(),
            phase: self.phase(),
            level: self.level,
            level_info: self.level.and_then(|level| level.info(self.phase())),
            progress: self.progress_fraction(),
            can_advance: self.can_advance(),
            is_pulsing: self.is_pulsing(),
            pulse_period_ms: self.pulse_period().map(|p| p.as_millis() as u64),
            alert_id: self.dispatch.as_ref().map(|d| d.alert_id),
            status: self.status(),
        }
    }

    fn return_to_select(&mut self) {
        self.engine.reset();
        self.level = None;
        self.dispatch = None;
    }

    fn ensure_not_exited(&self) -> Result<(), WorkflowError> {
        if self.exited {
            debug!(
                session_id = %self.engine.session_id(),
                "Rejected event on exited alert workflow"
            );
            return Err(WorkflowError::Exited);
        }
        Ok(())
    }

    fn ensure_phase(&self, operation: &'static str, expected: AlertPhase) -> Result<(), WorkflowError> {
        self.ensure_not_exited()?;
        let phase = self.phase();
        if phase != expected {
            debug!(
                session_id = %self.engine.session_id(),
                operation = operation,
                phase = %phase,
                "Rejected alert transition in wrong phase"
            );
            return Err(WorkflowError::InvalidPhase {
                operation,
                phase: phase.to_string(),
            });
        }
        Ok(())
    }
}
