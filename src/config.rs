//! Machine-wide options.

use serde::{Deserialize, Serialize};

/// How a composite state without an explicit initial child is entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialChildPolicy {
    /// Every composite state must name its initial child.
    #[default]
    Explicit,

    /// Fall back to the first declared child.
    FirstChild,
}

/// Options controlling a [`StateMachine`](crate::StateMachine).
///
/// Options can be assembled fluently or deserialized, so a host
/// application can keep them next to the rest of its configuration.
///
/// # Example
///
/// ```rust
/// use treestate::{InitialChildPolicy, MachineOptions};
///
/// let options = MachineOptions::new("door")
///     .initial_child_policy(InitialChildPolicy::FirstChild)
///     .history_limit(64);
///
/// let parsed = MachineOptions::from_json(
///     r#"{ "name": "door", "initial_child_policy": "first_child", "history_limit": 64 }"#,
/// )
/// .unwrap();
///
/// assert_eq!(options, parsed);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Name used for the root state and in log output
    pub name: String,

    /// Initial child resolution for composite states
    pub initial_child_policy: InitialChildPolicy,

    /// Whether processed events are appended to the audit history
    pub record_history: bool,

    /// Maximum number of history records kept, oldest dropped first
    pub history_limit: Option<usize>,

    /// Restore the pre-traversal active path when a listener fails mid-traversal
    pub rollback_on_error: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            name: "machine".to_string(),
            initial_child_policy: InitialChildPolicy::Explicit,
            record_history: true,
            history_limit: None,
            rollback_on_error: false,
        }
    }
}

impl MachineOptions {
    /// Default options with the given machine name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn initial_child_policy(mut self, policy: InitialChildPolicy) -> Self {
        self.initial_child_policy = policy;
        self
    }

    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn rollback_on_error(mut self, enabled: bool) -> Self {
        self.rollback_on_error = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_and_non_atomic() {
        let options = MachineOptions::default();
        assert_eq!(options.name, "machine");
        assert_eq!(options.initial_child_policy, InitialChildPolicy::Explicit);
        assert!(options.record_history);
        assert_eq!(options.history_limit, None);
        assert!(!options.rollback_on_error);
    }

    #[test]
    fn missing_json_fields_take_defaults() {
        let options = MachineOptions::from_json(r#"{ "rollback_on_error": true }"#).unwrap();
        assert_eq!(options.name, "machine");
        assert!(options.rollback_on_error);
        assert!(options.record_history);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = MachineOptions::from_json(r#"{ "initial_child_policy": "last_child" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = MachineOptions::new("player")
            .record_history(false)
            .rollback_on_error(true);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(MachineOptions::from_json(&json).unwrap(), options);
    }
}
