// Types for the identity-verification wizard

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::{Evidence, ParseEventError};

/// The three ordered verification steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationStep {
    IdCard,
    AddressProof,
    PhoneNumber,
}

impl VerificationStep {
    pub const ALL: [VerificationStep; 3] = [
        VerificationStep::IdCard,
        VerificationStep::AddressProof,
        VerificationStep::PhoneNumber,
    ];

    /// Step id used in the workflow definition and evidence ledger
    pub fn id(self) -> &'static str {
        match self {
            VerificationStep::IdCard => "idCard",
            VerificationStep::AddressProof => "addressProof",
            VerificationStep::PhoneNumber => "phoneNumber",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            VerificationStep::IdCard => 0,
            VerificationStep::AddressProof => 1,
            VerificationStep::PhoneNumber => 2,
        }
    }

    pub fn info(self) -> StepInfo {
        match self {
            VerificationStep::IdCard => StepInfo {
                title: "Verify Your Identity",
                description: "Please upload a government-issued photo ID to verify your identity. This helps ensure community safety.",
                privacy_note: "We take your privacy seriously. Your ID will only be used for verification and stored securely.",
                submitted_label: "ID verification submitted",
            },
            VerificationStep::AddressProof => StepInfo {
                title: "Proof of Address",
                description: "Please provide proof of your residential address (utility bill, bank statement, etc.).",
                privacy_note: "Your address information helps us connect you with nearby community members.",
                submitted_label: "Address verification submitted",
            },
            VerificationStep::PhoneNumber => StepInfo {
                title: "Phone Verification",
                description: "Verify your phone number to enable alerts and notifications.",
                privacy_note: "Your phone number will only be used for verification and emergency alerts.",
                submitted_label: "Phone number verified",
            },
        }
    }

    /// Progress caption, e.g. "Step 2 of 3"
    pub fn progress_label(self) -> String {
        format!("Step {} of {}", self.index() + 1, Self::ALL.len())
    }
}

impl fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for VerificationStep {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEventError::UnknownStep(s.to_string()))
    }
}

/// Renderer copy for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub privacy_note: &'static str,
    pub submitted_label: &'static str,
}

/// User gestures on the verification screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationEvent {
    Submit(VerificationStep),
    Advance,
    Back,
}

impl FromStr for VerificationEvent {
    type Err = ParseEventError;

    /// Accepts `submit:<step>`, `advance` and `back`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match s.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (s, None),
        };
        match (name.to_ascii_lowercase().as_str(), argument) {
            ("submit", Some(step)) => Ok(VerificationEvent::Submit(step.parse()?)),
            ("submit", None) => Err(ParseEventError::MissingArgument(name.to_string())),
            ("advance" | "next", None) => Ok(VerificationEvent::Advance),
            ("back", None) => Ok(VerificationEvent::Back),
            _ => Err(ParseEventError::UnknownEvent(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Active,
    Completed,
    Exited,
}

/// Result of the back gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Retreated(VerificationStep),
    Exited,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationSnapshot {
    pub session_id: String,
    pub step: VerificationStep,
    pub info: StepInfo,
    pub progress_label: String,
    pub step_index: usize,
    pub step_count: usize,
    pub progress: f64,
    pub can_advance: bool,
    pub status: VerificationStatus,
    pub evidence: Evidence,
}
