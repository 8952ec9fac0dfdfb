//! Connectivity health models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a connectivity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Success,
    Error,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Success => "success",
            HealthState::Error => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HealthState::Success)
    }

    /// Status word with its first letter capitalised ("Success", "Error")
    pub fn title(&self) -> String {
        let word = self.as_str();
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one backend's connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub message: String,
}

impl HealthStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Error,
            message: message.into(),
        }
    }
}

/// Health of the whole datasource, reduced from every configured backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeHealth {
    pub status: HealthState,
    pub message: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_capitalises_status() {
        assert_eq!(HealthState::Success.title(), "Success");
        assert_eq!(HealthState::Error.title(), "Error");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(HealthStatus::error("bad")).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "error", "message": "bad" }));
    }
}
