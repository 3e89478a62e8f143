// Collaborators that only log - used by the CLI where no real transport exists

use anyhow::Result;
use tracing::info;

use super::traits::{AlertTransport, ExitHandler, ExitReason};
use crate::alert::AlertDispatch;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTransport;

impl AlertTransport for TracingTransport {
    fn transmit(&self, dispatch: &AlertDispatch) -> Result<()> {
        info!(
            alert_id = %dispatch.alert_id,
            level = %dispatch.level,
            issued_at = %dispatch.issued_at,
            "Alert transmitted"
        );
        Ok(())
    }

    fn revoke(&self, dispatch: &AlertDispatch) -> Result<()> {
        info!(
            alert_id = %dispatch.alert_id,
            level = %dispatch.level,
            "Alert revoked"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingExitHandler;

impl ExitHandler for TracingExitHandler {
    fn on_exit(&self, workflow: &str, reason: ExitReason) {
        info!(workflow = %workflow, reason = ?reason, "Workflow exited");
    }
}
