// Verification Module - ID, address and phone proof wizard

pub mod state_machine;
pub mod types;

pub use state_machine::{VerificationWorkflow, VERIFICATION_WORKFLOW};
pub use types::{
    BackOutcome, StepInfo, VerificationEvent, VerificationSnapshot, VerificationStatus,
    VerificationStep,
};
