//! Domain service boundary
//!
//! The controller does not know what a scan means. It hands the trimmed id to
//! a [`DomainService`] and narrates whatever comes back. The service is not
//! assumed to be idempotent; duplicate protection on the input side comes
//! entirely from debouncing and the in-flight guard.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DomainError;

/// Successful result of recording one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReceipt {
    /// Text to show and announce, e.g. the student's name
    pub message: Option<String>,
}

impl ScanReceipt {
    /// Receipt whose message is announced on success
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Records scans for the rest of the application
#[async_trait]
pub trait DomainService: Send + Sync {
    async fn record_scan(&self, id: &str) -> Result<ScanReceipt, DomainError>;
}

/// Attendance roster kept in memory
///
/// Known ids map to display names. Each id can be recorded once; a second
/// scan of the same id fails with [`DomainError::AlreadyRecorded`].
#[derive(Debug, Default)]
pub struct InMemoryRoster {
    names: HashMap<String, String>,
    accept_unknown: bool,
    recorded: Mutex<HashSet<String>>,
}

impl InMemoryRoster {
    /// Roster from `(id, name)` pairs
    pub fn new(names: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            names: names.into_iter().collect(),
            accept_unknown: false,
            recorded: Mutex::new(HashSet::new()),
        }
    }

    /// Roster that records any id, using the id itself as the name
    pub fn open() -> Self {
        Self {
            accept_unknown: true,
            ..Self::default()
        }
    }

    /// Ids recorded so far, in order
    pub fn recorded(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.recorded.lock().iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl DomainService for InMemoryRoster {
    async fn record_scan(&self, id: &str) -> Result<ScanReceipt, DomainError> {
        let name = match self.names.get(id) {
            Some(name) => name.clone(),
            None if self.accept_unknown => id.to_string(),
            None => return Err(DomainError::UnknownId(id.to_string())),
        };

        if !self.recorded.lock().insert(id.to_string()) {
            return Err(DomainError::AlreadyRecorded(id.to_string()));
        }
        debug!(id, "attendance recorded");
        Ok(ScanReceipt::with_message(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roster_records_once() {
        let roster = InMemoryRoster::new([("STU001".to_string(), "Lina".to_string())]);

        let receipt = roster.record_scan("STU001").await.unwrap();
        assert_eq!(receipt.message.as_deref(), Some("Lina"));
        assert!(matches!(
            roster.record_scan("STU001").await,
            Err(DomainError::AlreadyRecorded(_))
        ));
        assert!(matches!(
            roster.record_scan("STU404").await,
            Err(DomainError::UnknownId(_))
        ));
        assert_eq!(roster.recorded(), vec!["STU001"]);
    }

    #[tokio::test]
    async fn test_open_roster_accepts_any_id() {
        let roster = InMemoryRoster::open();
        let receipt = roster.record_scan("X-9").await.unwrap();
        assert_eq!(receipt.message.as_deref(), Some("X-9"));
    }
}
