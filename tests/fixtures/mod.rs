//! Recording collaborators shared by the workflow integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use watchful::{AlertDispatch, AlertTransport, ExitHandler, ExitReason};

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Transmit(AlertDispatch),
    Revoke(AlertDispatch),
}

/// Transport that remembers every call and can be told to fail
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    calls: Rc<RefCell<Vec<TransportCall>>>,
    fail_transmit: Rc<RefCell<bool>>,
    fail_revoke: Rc<RefCell<bool>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.borrow().clone()
    }

    pub fn transmit_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, TransportCall::Transmit(_)))
            .count()
    }

    pub fn revoke_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, TransportCall::Revoke(_)))
            .count()
    }

    pub fn set_fail_transmit(&self, fail: bool) {
        *self.fail_transmit.borrow_mut() = fail;
    }

    pub fn set_fail_revoke(&self, fail: bool) {
        *self.fail_revoke.borrow_mut() = fail;
    }
}

impl AlertTransport for RecordingTransport {
    fn transmit(&self, dispatch: &AlertDispatch) -> Result<()> {
        if *self.fail_transmit.borrow() {
            return Err(anyhow!("transport offline"));
        }
        self.calls
            .borrow_mut()
            .push(TransportCall::Transmit(dispatch.clone()));
        Ok(())
    }

    fn revoke(&self, dispatch: &AlertDispatch) -> Result<()> {
        if *self.fail_revoke.borrow() {
            return Err(anyhow!("transport offline"));
        }
        self.calls
            .borrow_mut()
            .push(TransportCall::Revoke(dispatch.clone()));
        Ok(())
    }
}

/// Exit handler that remembers every exit
#[derive(Debug, Clone, Default)]
pub struct RecordingExitHandler {
    exits: Rc<RefCell<Vec<(String, ExitReason)>>>,
}

impl RecordingExitHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exits(&self) -> Vec<(String, ExitReason)> {
        self.exits.borrow().clone()
    }
}

impl ExitHandler for RecordingExitHandler {
    fn on_exit(&self, workflow: &str, reason: ExitReason) {
        self.exits.borrow_mut().push((workflow.to_string(), reason));
    }
}
