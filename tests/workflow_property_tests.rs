//! Property tests: guarded transitions hold over arbitrary gesture sequences.

mod fixtures;

use fixtures::{RecordingExitHandler, RecordingTransport};
use proptest::prelude::*;
use watchful::{
    Advance, AlertLevel, AlertPhase, AlertWorkflow, CancelOutcome, WorkflowDefinition,
    WorkflowEngine, WorkflowError,
};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum EngineOp {
    Submit(usize),
    Advance,
    Retreat,
}

#[derive(Debug, Clone, Copy)]
enum AlertOp {
    Select(AlertLevel),
    Confirm,
    Cancel,
}

fn arb_engine_op(step_count: usize) -> impl Strategy<Value = EngineOp> {
    prop_oneof![
        (0..step_count).prop_map(EngineOp::Submit),
        Just(EngineOp::Advance),
        Just(EngineOp::Retreat),
    ]
}

fn arb_level() -> impl Strategy<Value = AlertLevel> {
    prop_oneof![
        Just(AlertLevel::Emergency),
        Just(AlertLevel::Unsafe),
        Just(AlertLevel::Assistance),
    ]
}

fn arb_alert_op() -> impl Strategy<Value = AlertOp> {
    prop_oneof![
        arb_level().prop_map(AlertOp::Select),
        Just(AlertOp::Confirm),
        Just(AlertOp::Cancel),
    ]
}

fn engine_with(step_count: usize) -> WorkflowEngine {
    let ids: Vec<String> = (0..step_count).map(|i| format!("step{i}")).collect();
    WorkflowEngine::new(WorkflowDefinition::linear("property", ids).unwrap())
}

// ---------------------------------------------------------------------------
// Engine properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn advance_succeeds_iff_current_evidence_submitted(
        step_count in 1usize..6,
        ops in prop::collection::vec(arb_engine_op(5), 0..40),
    ) {
        let mut engine = engine_with(step_count);

        for op in ops {
            if engine.is_completed() {
                break;
            }
            let before_index = engine.current_index();
            let before_evidence = engine.evidence().clone();

            match op {
                EngineOp::Submit(i) => {
                    let id = format!("step{i}");
                    let result = engine.submit_evidence(&id);
                    if i < step_count {
                        prop_assert!(result.is_ok());
                        prop_assert!(engine.evidence().is_submitted(&id));
                    } else {
                        let rejected = matches!(result, Err(WorkflowError::UnknownStep { .. }));
                        prop_assert!(rejected);
                        prop_assert_eq!(engine.evidence(), &before_evidence);
                    }
                    prop_assert_eq!(engine.current_index(), before_index);
                }
                EngineOp::Advance => {
                    let current = engine.current_step().id.clone();
                    let allowed = before_evidence.is_submitted(current.as_str());
                    match engine.advance() {
                        Ok(Advance::Moved { index }) => {
                            prop_assert!(allowed);
                            prop_assert_eq!(index, before_index + 1);
                        }
                        Ok(Advance::Completed) => {
                            prop_assert!(allowed);
                            prop_assert_eq!(before_index, step_count - 1);
                        }
                        Err(e) => {
                            prop_assert!(!allowed);
                            let guard_error = matches!(e, WorkflowError::GuardNotSatisfied { .. });
                            prop_assert!(guard_error);
                            prop_assert_eq!(engine.current_index(), before_index);
                        }
                    }
                    prop_assert_eq!(engine.evidence(), &before_evidence);
                }
                EngineOp::Retreat => {
                    let result = engine.retreat();
                    if before_index == 0 {
                        prop_assert!(matches!(result, Err(WorkflowError::AtStart)));
                        prop_assert_eq!(engine.current_index(), 0);
                    } else {
                        prop_assert_eq!(result.ok(), Some(before_index - 1));
                    }
                    // Retreat never clears evidence
                    prop_assert_eq!(engine.evidence(), &before_evidence);
                }
            }
        }
    }

    #[test]
    fn progress_fraction_strictly_increasing_and_bounded(step_count in 1usize..10) {
        let mut engine = engine_with(step_count);
        let mut last = 0.0;

        loop {
            let progress = engine.progress_fraction();
            prop_assert!(progress > last);
            prop_assert!(progress > 0.0 && progress <= 1.0);
            last = progress;

            let id = engine.current_step().id.clone();
            engine.submit_evidence(id.as_str()).unwrap();
            if engine.advance().unwrap() == Advance::Completed {
                break;
            }
        }
        prop_assert!((last - 1.0).abs() < f64::EPSILON);
    }
}

// ---------------------------------------------------------------------------
// Alert properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn alert_phase_invariants_hold(ops in prop::collection::vec(arb_alert_op(), 0..40)) {
        let transport = RecordingTransport::new();
        let handler = RecordingExitHandler::new();
        let mut workflow = AlertWorkflow::new(Box::new(transport.clone()), Box::new(handler.clone()));

        let mut selects_since_select = 0;
        let mut confirms_since_select = 0;

        for op in ops {
            if workflow.is_exited() {
                break;
            }
            let before_phase = workflow.phase();
            let before_level = workflow.level();

            match op {
                AlertOp::Select(level) => {
                    let result = workflow.select_level(level);
                    if before_phase == AlertPhase::Select {
                        prop_assert!(result.is_ok());
                        selects_since_select += 1;
                    } else {
                        let invalid = matches!(result, Err(WorkflowError::InvalidPhase { .. }));
                        prop_assert!(invalid);
                        prop_assert_eq!(workflow.phase(), before_phase);
                        prop_assert_eq!(workflow.level(), before_level);
                    }
                }
                AlertOp::Confirm => {
                    let result = workflow.confirm().map(|d| d.alert_id);
                    if before_phase == AlertPhase::Confirm {
                        prop_assert!(result.is_ok());
                        confirms_since_select += 1;
                    } else {
                        let invalid = matches!(result, Err(WorkflowError::InvalidPhase { .. }));
                        prop_assert!(invalid);
                        prop_assert_eq!(workflow.phase(), before_phase);
                    }
                }
                AlertOp::Cancel => {
                    let outcome = workflow.cancel().unwrap();
                    match before_phase {
                        AlertPhase::Select => {
                            prop_assert_eq!(outcome, CancelOutcome::Exited);
                            prop_assert!(workflow.is_exited());
                        }
                        AlertPhase::Confirm => {
                            prop_assert_eq!(outcome, CancelOutcome::Reverted);
                        }
                        AlertPhase::Sent => {
                            let revoked = matches!(outcome, CancelOutcome::Revoked { .. });
                            prop_assert!(revoked);
                        }
                    }
                    if !workflow.is_exited() {
                        prop_assert_eq!(workflow.phase(), AlertPhase::Select);
                        prop_assert_eq!(workflow.level(), None);
                        selects_since_select = 0;
                        confirms_since_select = 0;
                    }
                }
            }

            // level is set exactly when outside SELECT
            prop_assert_eq!(workflow.level().is_some(), workflow.phase() != AlertPhase::Select);
            prop_assert_eq!(workflow.is_pulsing(), workflow.phase() == AlertPhase::Sent);
            match workflow.phase() {
                AlertPhase::Select => {
                    prop_assert_eq!(selects_since_select, 0);
                    prop_assert_eq!(confirms_since_select, 0);
                }
                AlertPhase::Confirm => {
                    prop_assert_eq!(selects_since_select, 1);
                    prop_assert_eq!(confirms_since_select, 0);
                }
                AlertPhase::Sent => {
                    prop_assert_eq!(selects_since_select, 1);
                    prop_assert_eq!(confirms_since_select, 1);
                }
            }
        }

        prop_assert_eq!(transport.revoke_count() <= transport.transmit_count(), true);
        prop_assert!(handler.exits().len() <= 1);
    }
}
