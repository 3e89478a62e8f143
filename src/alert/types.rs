// Types for the emergency-alert composer

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::ParseEventError;

/// Severity the user picks in the SELECT phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertLevel {
    Emergency,
    Unsafe,
    Assistance,
}

impl AlertLevel {
    pub const ALL: [AlertLevel; 3] = [
        AlertLevel::Emergency,
        AlertLevel::Unsafe,
        AlertLevel::Assistance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::Emergency => "emergency",
            AlertLevel::Unsafe => "unsafe",
            AlertLevel::Assistance => "assistance",
        }
    }

    /// Button caption on the selection screen
    pub fn label(self) -> &'static str {
        match self {
            AlertLevel::Emergency => "Emergency Situation",
            AlertLevel::Unsafe => "Feeling Unsafe",
            AlertLevel::Assistance => "Need Assistance",
        }
    }

    /// Accent colour, hex RGB
    pub fn color(self) -> &'static str {
        match self {
            AlertLevel::Emergency => "#EF4444",
            AlertLevel::Unsafe => "#F59E0B",
            AlertLevel::Assistance => "#3B82F6",
        }
    }

    /// Copy for the confirmation and sent screens. SELECT shows only the
    /// labels, so it has none.
    pub fn info(self, phase: AlertPhase) -> Option<LevelInfo> {
        let (title, description) = match (phase, self) {
            (AlertPhase::Select, _) => return None,
            (AlertPhase::Confirm, AlertLevel::Emergency) => (
                "Emergency Alert",
                "This will alert all verified members nearby and optionally contact emergency services.",
            ),
            (AlertPhase::Confirm, AlertLevel::Unsafe) => (
                "Feeling Unsafe",
                "This will alert verified members nearby that you need assistance.",
            ),
            (AlertPhase::Confirm, AlertLevel::Assistance) => (
                "Request Assistance",
                "This will notify verified members that you need help.",
            ),
            (AlertPhase::Sent, AlertLevel::Emergency) => (
                "Emergency Alert Sent",
                "Your emergency alert has been sent to nearby verified members.",
            ),
            (AlertPhase::Sent, AlertLevel::Unsafe) => (
                "Alert Sent",
                "Your alert has been sent to nearby verified members.",
            ),
            (AlertPhase::Sent, AlertLevel::Assistance) => (
                "Assistance Request Sent",
                "Your request for assistance has been sent to nearby verified members.",
            ),
        };
        Some(LevelInfo {
            title,
            description,
            color: self.color(),
        })
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEventError::UnknownLevel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// Stage of the alert lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPhase {
    Select,
    Confirm,
    Sent,
}

impl AlertPhase {
    pub const ALL: [AlertPhase; 3] = [AlertPhase::Select, AlertPhase::Confirm, AlertPhase::Sent];

    /// Step id of the phase in the underlying workflow definition
    pub fn step_id(self) -> &'static str {
        match self {
            AlertPhase::Select => "select",
            AlertPhase::Confirm => "confirm",
            AlertPhase::Sent => "sent",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for AlertPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertPhase::Select => "SELECT",
            AlertPhase::Confirm => "CONFIRM",
            AlertPhase::Sent => "SENT",
        };
        f.write_str(name)
    }
}

/// What the transport receives when an alert is sent or revoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDispatch {
    pub alert_id: Uuid,
    pub level: AlertLevel,
    pub issued_at: DateTime<Utc>,
}

impl AlertDispatch {
    pub fn new(level: AlertLevel) -> Self {
        Self {
            alert_id: Uuid::new_v4(),
            level,
            issued_at: Utc::now(),
        }
    }
}

/// User gestures on the alert screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    Select(AlertLevel),
    Confirm,
    Cancel,
}

impl FromStr for AlertEvent {
    type Err = ParseEventError;

    /// Accepts `select:<level>`, `confirm` and `cancel`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match s.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (s, None),
        };
        match (name.to_ascii_lowercase().as_str(), argument) {
            ("select", Some(level)) => Ok(AlertEvent::Select(level.parse()?)),
            ("select", None) => Err(ParseEventError::MissingArgument(name.to_string())),
            ("confirm", None) => Ok(AlertEvent::Confirm),
            ("cancel", None) => Ok(AlertEvent::Cancel),
            _ => Err(ParseEventError::UnknownEvent(s.to_string())),
        }
    }
}

/// Result of `cancel()`, one variant per phase it was called from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// From SELECT: the workflow is over
    Exited,
    /// From CONFIRM: back to SELECT, nothing was sent
    Reverted,
    /// From SENT: the alert was withdrawn and the composer is back in SELECT
    Revoked { alert_id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Exited,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertSnapshot {
    pub session_id: String,
    pub phase: AlertPhase,
    pub level: Option<AlertLevel>,
    pub level_info: Option<LevelInfo>,
    pub progress: f64,
    pub can_advance: bool,
    pub is_pulsing: bool,
    pub pulse_period_ms: Option<u64>,
    pub alert_id: Option<Uuid>,
    pub status: AlertStatus,
}
