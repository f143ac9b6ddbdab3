//! Lookup resolution for request views
//!
//! Requests store foreign ids only; the catalogs are fetched independently
//! and joined here. A missing or stale reference resolves to the "N/A"
//! placeholder instead of failing the whole view, so a partially loaded
//! catalog still renders.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{RequestStatus, ServiceRequest};

/// Placeholder shown for any reference that cannot be resolved
pub const PLACEHOLDER: &str = "N/A";

/// Service-type data the request views need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTypeSummary {
    pub name: String,
    pub requires_staff: bool,
}

/// Catalogs keyed by id, as fetched for a view.
///
/// Any catalog may be empty (a failed fetch degrades to placeholders).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalogs {
    pub farmers: HashMap<Uuid, String>,
    pub properties: HashMap<Uuid, String>,
    pub service_types: HashMap<Uuid, ServiceTypeSummary>,
    pub vehicles: HashMap<Uuid, String>,
    pub staff: HashMap<Uuid, String>,
}

/// Denormalized request view with display names in place of ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRequest {
    pub id: Uuid,
    pub status: RequestStatus,
    pub submission_date: NaiveDate,
    pub execution_date: Option<NaiveDate>,
    pub farmer_name: String,
    pub property_name: String,
    pub service_name: String,
    /// `false` when the service type is unresolved; the backend re-checks
    /// the completion gate against the store either way
    pub requires_staff: bool,
    pub vehicle_name: Option<String>,
    pub assignee_name: Option<String>,
    pub note: Option<String>,
    pub staff_notes: Option<String>,
    pub completion_report: Option<String>,
    pub version: i32,
}

fn display_name(map: &HashMap<Uuid, String>, id: Uuid) -> String {
    map.get(&id).cloned().unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Join one request against the catalogs.
///
/// Never panics; every unresolved reference becomes [`PLACEHOLDER`].
pub fn resolve(request: &ServiceRequest, catalogs: &Catalogs) -> ResolvedRequest {
    let service = catalogs.service_types.get(&request.service_type_id);

    ResolvedRequest {
        id: request.id,
        status: request.status,
        submission_date: request.submission_date,
        execution_date: request.execution_date,
        farmer_name: display_name(&catalogs.farmers, request.farmer_id),
        property_name: display_name(&catalogs.properties, request.property_id),
        service_name: service
            .map(|s| s.name.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        requires_staff: service.map(|s| s.requires_staff).unwrap_or(false),
        vehicle_name: request
            .vehicle_id
            .map(|id| display_name(&catalogs.vehicles, id)),
        assignee_name: request
            .assignee_id
            .map(|id| display_name(&catalogs.staff, id)),
        note: request.note.clone(),
        staff_notes: request.staff_notes.clone(),
        completion_report: request.completion_report.clone(),
        version: request.version,
    }
}

/// Canonical list order: submission date descending, id as a deterministic
/// tie-break for equal dates.
pub fn sort_newest_first(requests: &mut [ServiceRequest]) {
    requests.sort_by(|a, b| {
        b.submission_date
            .cmp(&a.submission_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}
