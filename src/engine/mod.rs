// Workflow Engine - guarded linear stepper shared by every screen workflow
//
// A definition is an ordered list of steps; the engine moves past a step only
// once that step's guard holds over the evidence ledger.

pub mod error;
pub mod state_machine;
pub mod types;

pub use error::{DefinitionError, ParseEventError, WorkflowError};
pub use state_machine::{WorkflowEngine, DEFAULT_HISTORY_LIMIT};
pub use types::{
    Advance, EngineSnapshot, EngineStatus, Evidence, EvidenceEntry, Guard, Step, StepId,
    TransitionKind, TransitionRecord, WorkflowDefinition,
};
