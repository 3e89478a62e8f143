// Watchful Library - guarded workflows behind the verification and alert screens
// Screens hold one workflow instance each, render its snapshot and feed it user gestures.

pub mod engine;
pub mod verification;
pub mod alert;
pub mod collaborators;
pub mod config;
pub mod telemetry;

// Re-export key types for easy access
pub use engine::{
    Advance, DefinitionError, EngineSnapshot, EngineStatus, Evidence, Guard, ParseEventError,
    Step, StepId, WorkflowDefinition, WorkflowEngine, WorkflowError,
};
pub use verification::{
    BackOutcome, VerificationEvent, VerificationSnapshot, VerificationStatus, VerificationStep,
    VerificationWorkflow,
};
pub use alert::{
    AlertDispatch, AlertEvent, AlertLevel, AlertPhase, AlertSnapshot, AlertStatus, AlertWorkflow,
    CancelOutcome, LevelInfo,
};
pub use collaborators::{AlertTransport, ExitHandler, ExitReason, TracingExitHandler, TracingTransport};
pub use config::WatchfulConfig;
pub use telemetry::{create_workflow_span, generate_session_id, init_telemetry};
