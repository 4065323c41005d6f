//! Audit history of processed events.
//!
//! Records are plain serializable values: names rather than handles, so a
//! history can be exported and read without the machine that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// What processing an event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A transition fired and the active configuration changed.
    Transitioned,
    /// A transition fired without changing the active configuration.
    Stayed,
    /// No transition matched.
    Ignored,
}

/// Record of one processed event.
///
/// # Example
///
/// ```rust
/// use treestate::core::{Outcome, TransitionRecord};
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     event: "Connect".to_string(),
///     transition: Some("dial".to_string()),
///     from: "idle".to_string(),
///     to: "connecting".to_string(),
///     outcome: Outcome::Transitioned,
///     timestamp: Utc::now(),
/// };
/// assert!(record.changed());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the submitted event
    pub event: String,
    /// Name of the fired transition, `None` when ignored
    pub transition: Option<String>,
    /// Active leaf before processing
    pub from: String,
    /// Active leaf after processing
    pub to: String,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    /// Whether the active configuration changed.
    pub fn changed(&self) -> bool {
        self.outcome == Outcome::Transitioned
    }
}

/// Ordered history of processed events.
///
/// `record` is pure and returns a new history; the machine appends in
/// place. With a limit set, the oldest records are dropped first.
///
/// # Example
///
/// ```rust
/// use treestate::core::{Outcome, TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let step = |from: &str, to: &str| TransitionRecord {
///     event: "Next".to_string(),
///     transition: None,
///     from: from.to_string(),
///     to: to.to_string(),
///     outcome: Outcome::Transitioned,
///     timestamp: Utc::now(),
/// };
///
/// let history = TransitionHistory::new()
///     .record(step("red", "green"))
///     .record(step("green", "yellow"));
///
/// assert_eq!(history.path(), vec!["red", "green", "yellow"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    limit: Option<usize>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty history keeping at most `limit` records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// Record a processed event, returning a new history.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut next = self.clone();
        next.append(record);
        next
    }

    pub(crate) fn append(&mut self, record: TransitionRecord) {
        self.records.push_back(record);
        if let Some(limit) = self.limit {
            while self.records.len() > limit {
                self.records.pop_front();
            }
        }
    }

    /// Sequence of active leaves: the first record's origin, then the
    /// destination of every record that changed the configuration.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(
            self.records
                .iter()
                .filter(|record| record.changed())
                .map(|record| record.to.as_str()),
        );
        path
    }

    /// Time between the first and last record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> impl ExactSizeIterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: &str, to: &str, outcome: Outcome) -> TransitionRecord {
        TransitionRecord {
            event: "Switch".to_string(),
            transition: Some("switch".to_string()),
            from: from.to_string(),
            to: to.to_string(),
            outcome,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = TransitionHistory::new();
        assert!(history.is_empty());
        assert!(history.path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = TransitionHistory::new();
        let next = history.record(record("off", "on", Outcome::Transitioned));

        assert_eq!(history.len(), 0);
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn path_skips_records_without_change() {
        let history = TransitionHistory::new()
            .record(record("off", "on", Outcome::Transitioned))
            .record(record("on", "on", Outcome::Stayed))
            .record(record("on", "on", Outcome::Ignored))
            .record(record("on", "off", Outcome::Transitioned));

        assert_eq!(history.path(), vec!["off", "on", "off"]);
    }

    #[test]
    fn limit_drops_oldest_records() {
        let mut history = TransitionHistory::with_limit(2);
        history.append(record("a", "b", Outcome::Transitioned));
        history.append(record("b", "c", Outcome::Transitioned));
        history.append(record("c", "d", Outcome::Transitioned));

        assert_eq!(history.len(), 2);
        assert_eq!(history.path(), vec!["b", "c", "d"]);
        assert_eq!(history.limit(), Some(2));
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut first = record("a", "b", Outcome::Transitioned);
        first.timestamp = start;
        let mut second = record("b", "c", Outcome::Transitioned);
        second.timestamp = start + chrono::Duration::seconds(3);

        let history = TransitionHistory::new().record(first).record(second);
        assert_eq!(history.duration(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = TransitionHistory::new().record(record("off", "on", Outcome::Transitioned));

        let json = serde_json::to_string(&history).unwrap();
        assert!(json.contains("\"transitioned\""));
        let back: TransitionHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }
}
