//! Service request model and status labels

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a service request.
///
/// Wire and database labels are the Portuguese originals. `RECUSADA` and the
/// accented `CONCLUÍDA` are accepted as synonyms when parsing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "EM ANDAMENTO")]
    InProgress,
    #[serde(rename = "CONCLUIDA")]
    Completed,
    #[serde(rename = "CANCELADA")]
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDENTE",
            RequestStatus::InProgress => "EM ANDAMENTO",
            RequestStatus::Completed => "CONCLUIDA",
            RequestStatus::Cancelled => "CANCELADA",
        }
    }

    /// Parse a status label, accepting the synonym spellings used by older
    /// revisions of the system.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "PENDENTE" => Some(RequestStatus::Pending),
            "EM ANDAMENTO" => Some(RequestStatus::InProgress),
            "CONCLUIDA" | "CONCLUÍDA" => Some(RequestStatus::Completed),
            "CANCELADA" | "RECUSADA" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A farmer's request for a municipal agricultural service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub property_id: Uuid,
    pub service_type_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub status: RequestStatus,
    pub submission_date: NaiveDate,
    pub execution_date: Option<NaiveDate>,
    /// Requester's original note, set at creation
    pub note: Option<String>,
    /// Internal staff notes, editable at any time
    pub staff_notes: Option<String>,
    /// Completion report, set when the request is concluded
    pub completion_report: Option<String>,
    /// Optimistic-concurrency counter, incremented on every mutation
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_synonyms() {
        assert_eq!(
            RequestStatus::parse("CONCLUÍDA"),
            Some(RequestStatus::Completed)
        );
        assert_eq!(
            RequestStatus::parse("RECUSADA"),
            Some(RequestStatus::Cancelled)
        );
        assert_eq!(RequestStatus::parse("pendente"), Some(RequestStatus::Pending));
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(RequestStatus::parse("APROVADA"), None);
        assert_eq!(RequestStatus::parse(""), None);
    }

    #[test]
    fn test_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::InProgress.is_terminal());
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }
}
