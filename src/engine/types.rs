// Core types for the guarded workflow engine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DefinitionError;

/// Identifier of a step within a workflow definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Condition that must hold before the engine moves past a step.
///
/// The step's own evidence is always required; `Requires` additionally
/// gates on the evidence of other steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Guard {
    /// The step's own evidence has been submitted
    EvidenceSubmitted,
    /// Own evidence plus the evidence of every listed step
    Requires(Vec<StepId>),
}

impl Guard {
    pub fn is_satisfied(&self, step: &StepId, evidence: &Evidence) -> bool {
        if !evidence.is_submitted(step.as_str()) {
            return false;
        }
        match self {
            Guard::EvidenceSubmitted => true,
            Guard::Requires(others) => others.iter().all(|id| evidence.is_submitted(id.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub guard: Guard,
}

impl Step {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: StepId::new(id),
            guard: Guard::EvidenceSubmitted,
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }
}

/// Ordered, immutable sequence of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowDefinition {
    name: String,
    steps: Vec<Step>,
}

impl WorkflowDefinition {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Result<Self, DefinitionError> {
        let name = name.into();
        if steps.is_empty() {
            return Err(DefinitionError::Empty { workflow: name });
        }

        for (index, step) in steps.iter().enumerate() {
            if steps[..index].iter().any(|earlier| earlier.id == step.id) {
                return Err(DefinitionError::DuplicateStep {
                    step: step.id.clone(),
                });
            }
        }

        for step in &steps {
            if let Guard::Requires(others) = &step.guard {
                if let Some(missing) = others.iter().find(|id| !steps.iter().any(|s| &s.id == *id)) {
                    return Err(DefinitionError::UnknownGuardReference {
                        step: step.id.clone(),
                        reference: missing.clone(),
                    });
                }
            }
        }

        Ok(Self { name, steps })
    }

    /// Definition where every step is gated only on its own evidence
    pub fn linear<I, S>(name: impl Into<String>, ids: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, ids.into_iter().map(Step::new).collect())
    }

    /// For fixed definitions whose ids are known to be unique
    pub(crate) fn from_fixed_ids(name: &str, ids: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            steps: ids.iter().map(|id| Step::new(*id)).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == *id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceEntry {
    pub step: StepId,
    pub submitted: bool,
}

/// Per-step evidence flags, in step order.
///
/// Keys are fixed at construction; flags only move from `false` to `true`
/// except through [`Evidence::clear`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Evidence {
    entries: Vec<EvidenceEntry>,
}

impl Evidence {
    pub fn for_definition(definition: &WorkflowDefinition) -> Self {
        Self {
            entries: definition
                .steps()
                .iter()
                .map(|step| EvidenceEntry {
                    step: step.id.clone(),
                    submitted: false,
                })
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|entry| entry.step == *id)
            .map(|entry| entry.submitted)
    }

    pub fn is_submitted(&self, id: &str) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn submitted_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.submitted).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvidenceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `None` for unknown ids, otherwise whether the flag changed
    pub(crate) fn mark(&mut self, id: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|entry| entry.step == *id)?;
        let changed = !entry.submitted;
        entry.submitted = true;
        Some(changed)
    }

    pub(crate) fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.submitted = false;
        }
    }
}

/// Outcome of a successful `advance()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    EvidenceSubmitted,
    Advanced,
    Completed,
    Retreated,
    Reset,
}

/// Audit entry for one applied transition
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    pub kind: TransitionKind,
    pub from_index: usize,
    pub to_index: usize,
    pub step: StepId,
    pub at: DateTime<Utc>,
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub session_id: String,
    pub workflow: String,
    pub step: StepId,
    pub step_index: usize,
    pub step_count: usize,
    pub progress: f64,
    pub can_advance: bool,
    pub status: EngineStatus,
    pub evidence: Evidence,
}
