// Boundary interfaces for services the workflows call but do not implement

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::alert::AlertDispatch;

/// Why a workflow instance handed control back to its screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Every verification step was completed
    VerificationCompleted,
    /// The user backed out of the first step or phase
    Cancelled,
}

/// Alert delivery interface
#[cfg_attr(test, automock)]
pub trait AlertTransport {
    /// Deliver an alert when the composer enters SENT
    fn transmit(&self, dispatch: &AlertDispatch) -> Result<()>;

    /// Withdraw a delivered alert when the user cancels from SENT
    fn revoke(&self, dispatch: &AlertDispatch) -> Result<()>;
}

/// Navigation callback invoked when a workflow exits
#[cfg_attr(test, automock)]
pub trait ExitHandler {
    fn on_exit(&self, workflow: &str, reason: ExitReason);
}
