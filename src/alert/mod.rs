// Alert Module - SELECT -> CONFIRM -> SENT composer with phase-dependent cancel

pub mod state_machine;
pub mod types;


pub use state_machine::{AlertWorkflow, ALERT_WORKFLOW, DEFAULT_PULSE_PERIOD};
pub use types::{
    AlertDispatch, AlertEvent, AlertLevel, AlertPhase, AlertSnapshot, AlertStatus, CancelOutcome,
    LevelInfo,
};
