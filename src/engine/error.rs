use thiserror::Error;

use super::types::StepId;

/// Rejected transitions. State is left unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("guard not satisfied for step {step}")]
    GuardNotSatisfied { step: StepId },

    #[error("already at the first step")]
    AtStart,

    #[error("unknown step: {step}")]
    UnknownStep { step: StepId },

    #[error("{operation} is not valid in phase {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: String,
    },

    #[error("no alert level selected")]
    NoLevelSelected,

    #[error("workflow already completed")]
    AlreadyCompleted,

    #[error("workflow has exited")]
    Exited,

    #[error("{operation} failed: {reason}")]
    Collaborator {
        operation: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("workflow {workflow} has no steps")]
    Empty { workflow: String },

    #[error("step {step} is defined more than once")]
    DuplicateStep { step: StepId },

    #[error("guard of step {step} references unknown step {reference}")]
    UnknownGuardReference { step: StepId, reference: StepId },
}

/// Errors turning CLI/renderer tokens into workflow events
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("unknown verification step: {0}")]
    UnknownStep(String),

    #[error("unknown alert level: {0}")]
    UnknownLevel(String),

    #[error("event {0} needs an argument")]
    MissingArgument(String),
}
