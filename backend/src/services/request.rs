//! Service-request management
//!
//! The lifecycle preconditions live in `shared::lifecycle`; this service
//! re-checks them against the stored record before every write, so a client
//! that skipped the advisory front-end checks still cannot bypass them.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{RequestStatus, Role, ServiceRequest};
use shared::lifecycle::{self, RequestAction, RequestState, TransitionError};
use shared::resolver::{self, Catalogs, ResolvedRequest, ServiceTypeSummary};
use shared::validation::validate_note;

/// Request service for managing the request lifecycle
#[derive(Clone)]
pub struct RequestService {
    db: PgPool,
}

/// Database row for a service request
#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    farmer_id: Uuid,
    property_id: Uuid,
    service_type_id: Uuid,
    vehicle_id: Option<Uuid>,
    assignee_id: Option<Uuid>,
    status: String,
    submission_date: NaiveDate,
    execution_date: Option<NaiveDate>,
    note: Option<String>,
    staff_notes: Option<String>,
    completion_report: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for ServiceRequest {
    type Error = AppError;

    fn try_from(row: RequestRow) -> Result<Self, AppError> {
        let status = RequestStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown request status '{}'", row.status)))?;
        Ok(ServiceRequest {
            id: row.id,
            farmer_id: row.farmer_id,
            property_id: row.property_id,
            service_type_id: row.service_type_id,
            vehicle_id: row.vehicle_id,
            assignee_id: row.assignee_id,
            status,
            submission_date: row.submission_date,
            execution_date: row.execution_date,
            note: row.note,
            staff_notes: row.staff_notes,
            completion_report: row.completion_report,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Optional filters for request listing
#[derive(Debug, Default, serde::Deserialize)]
pub struct RequestFilter {
    pub farmer_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Input for creating a request
#[derive(Debug, serde::Deserialize)]
pub struct CreateRequestInput {
    pub property_id: Uuid,
    pub service_type_id: Uuid,
    pub note: Option<String>,
}

/// Input for editing a pending request
#[derive(Debug, serde::Deserialize)]
pub struct UpdateRequestInput {
    pub service_type_id: Option<Uuid>,
    pub note: Option<String>,
    /// Staff-only free text, editable at any stage
    pub staff_notes: Option<String>,
    pub expected_version: Option<i32>,
}

/// Input for assigning or unassigning a staff member
#[derive(Debug, serde::Deserialize)]
pub struct AssignInput {
    pub assignee_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub expected_version: Option<i32>,
}

/// Input for completing a request
#[derive(Debug, serde::Deserialize)]
pub struct CompleteInput {
    pub completion_report: String,
    /// Defaults to today when omitted
    pub execution_date: Option<NaiveDate>,
    pub expected_version: Option<i32>,
}

/// Input for cancelling a request
#[derive(Debug, Default, serde::Deserialize)]
pub struct CancelInput {
    pub expected_version: Option<i32>,
}

const SELECT_REQUEST: &str = r#"
    SELECT id, farmer_id, property_id, service_type_id, vehicle_id, assignee_id,
           status, submission_date, execution_date, note, staff_notes,
           completion_report, version, created_at, updated_at
    FROM service_requests
"#;

impl RequestService {
    /// Create a new RequestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List requests, newest first (submission date, id as tie-break)
    pub async fn get_requests(&self, filter: RequestFilter) -> AppResult<Vec<ServiceRequest>> {
        let status = filter
            .status
            .as_deref()
            .map(|s| {
                RequestStatus::parse(s).ok_or_else(|| AppError::Validation {
                    field: "status".to_string(),
                    message: format!("Unknown status '{}'", s),
                    message_pt: format!("Status desconhecido '{}'", s),
                })
            })
            .transpose()?;

        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"{SELECT_REQUEST}
            WHERE ($1::uuid IS NULL OR farmer_id = $1)
              AND ($2::uuid IS NULL OR assignee_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY submission_date DESC, id DESC
            "#
        ))
        .bind(filter.farmer_id)
        .bind(filter.assignee_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ServiceRequest::try_from).collect()
    }

    /// Get a request by ID
    pub async fn get_request(&self, request_id: Uuid) -> AppResult<ServiceRequest> {
        let row = sqlx::query_as::<_, RequestRow>(&format!("{SELECT_REQUEST} WHERE id = $1"))
            .bind(request_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Request".to_string()))?;

        ServiceRequest::try_from(row)
    }

    /// Create a request on behalf of a farmer.
    ///
    /// Status is forced to PENDENTE and the submission date to today; a
    /// second open request for the same property and service is rejected
    /// with a distinct conflict code.
    pub async fn create_request(
        &self,
        farmer_id: Uuid,
        input: CreateRequestInput,
    ) -> AppResult<ServiceRequest> {
        if let Some(ref note) = input.note {
            validate_note(note).map_err(|msg| AppError::Validation {
                field: "note".to_string(),
                message: msg.to_string(),
                message_pt: "Observação muito longa".to_string(),
            })?;
        }

        // Property must exist and belong to the requesting farmer
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT farmer_id FROM properties WHERE id = $1",
        )
        .bind(input.property_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Property".to_string()))?;

        if owner != farmer_id {
            return Err(AppError::InsufficientPermissions);
        }

        // Service type must exist
        let service_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM service_types WHERE id = $1",
        )
        .bind(input.service_type_id)
        .fetch_one(&self.db)
        .await?;

        if service_exists == 0 {
            return Err(AppError::NotFound("Service type".to_string()));
        }

        // Duplicate-submission guard: one open request per
        // farmer + property + service
        let open = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM service_requests
            WHERE farmer_id = $1 AND property_id = $2 AND service_type_id = $3
              AND status NOT IN ('CONCLUIDA', 'CANCELADA')
            "#,
        )
        .bind(farmer_id)
        .bind(input.property_id)
        .bind(input.service_type_id)
        .fetch_one(&self.db)
        .await?;

        if open > 0 {
            return Err(AppError::DuplicateOpenRequest);
        }

        let request_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO service_requests
                (farmer_id, property_id, service_type_id, status, submission_date, note)
            VALUES ($1, $2, $3, $4, CURRENT_DATE, $5)
            RETURNING id
            "#,
        )
        .bind(farmer_id)
        .bind(input.property_id)
        .bind(input.service_type_id)
        .bind(RequestStatus::Pending.as_str())
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        self.get_request(request_id).await
    }

    /// Edit a request.
    ///
    /// Service type and requester note may change only while PENDENTE;
    /// staff notes are editable by staff at any stage.
    pub async fn update_request(
        &self,
        actor: &AuthUser,
        request_id: Uuid,
        input: UpdateRequestInput,
    ) -> AppResult<ServiceRequest> {
        let request = self.get_request(request_id).await?;
        self.check_actor_may_touch(actor, &request)?;
        check_version(&request, input.expected_version)?;

        if input.staff_notes.is_some() && !actor.is_staff() {
            return Err(AppError::InsufficientPermissions);
        }

        let edits_request_fields = input.service_type_id.is_some() || input.note.is_some();
        if edits_request_fields {
            let state = self.load_state(&request).await?;
            lifecycle::apply(&state, &RequestAction::Edit).map_err(map_transition)?;

            if let Some(service_type_id) = input.service_type_id {
                let exists = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM service_types WHERE id = $1",
                )
                .bind(service_type_id)
                .fetch_one(&self.db)
                .await?;
                if exists == 0 {
                    return Err(AppError::NotFound("Service type".to_string()));
                }
            }
        }

        if let Some(ref note) = input.note {
            validate_note(note).map_err(|msg| AppError::Validation {
                field: "note".to_string(),
                message: msg.to_string(),
                message_pt: "Observação muito longa".to_string(),
            })?;
        }

        let result = sqlx::query(
            r#"
            UPDATE service_requests
            SET service_type_id = COALESCE($1, service_type_id),
                note = COALESCE($2, note),
                staff_notes = COALESCE($3, staff_notes),
                version = version + 1,
                updated_at = now()
            WHERE id = $4 AND version = $5
            "#,
        )
        .bind(input.service_type_id)
        .bind(&input.note)
        .bind(&input.staff_notes)
        .bind(request_id)
        .bind(request.version)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.write_conflict(request_id, request.version).await);
        }

        self.get_request(request_id).await
    }

    /// Assign (or unassign) a staff member; assignment moves the request to
    /// EM ANDAMENTO, unassignment leaves the status untouched.
    pub async fn assign(
        &self,
        request_id: Uuid,
        input: AssignInput,
    ) -> AppResult<ServiceRequest> {
        let request = self.get_request(request_id).await?;
        check_version(&request, input.expected_version)?;

        if let Some(assignee_id) = input.assignee_id {
            let exists = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM staff_members WHERE id = $1",
            )
            .bind(assignee_id)
            .fetch_one(&self.db)
            .await?;
            if exists == 0 {
                return Err(AppError::NotFound("Staff member".to_string()));
            }
        }

        let state = self.load_state(&request).await?;
        let next = lifecycle::apply(&state, &RequestAction::Assign(input.assignee_id))
            .map_err(map_transition)?;

        let result = sqlx::query(
            r#"
            UPDATE service_requests
            SET assignee_id = $1,
                vehicle_id = COALESCE($2, vehicle_id),
                status = $3,
                version = version + 1,
                updated_at = now()
            WHERE id = $4 AND version = $5
            "#,
        )
        .bind(next.assignee_id)
        .bind(input.vehicle_id)
        .bind(next.status.as_str())
        .bind(request_id)
        .bind(request.version)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.write_conflict(request_id, request.version).await);
        }

        let notifications = super::NotificationService::new(self.db.clone());
        if let Some(assignee_id) = next.assignee_id {
            notifications
                .notify_staff(
                    assignee_id,
                    "Novo serviço atribuído",
                    "Uma solicitação foi atribuída a você.",
                    Some(request_id),
                )
                .await?;
            notifications
                .notify_farmer(
                    request.farmer_id,
                    "Solicitação em andamento",
                    "Sua solicitação foi atribuída a um funcionário.",
                    Some(request_id),
                )
                .await?;
        }

        self.get_request(request_id).await
    }

    /// Complete a request.
    ///
    /// Gate: when the service type requires staff and no assignee is set,
    /// the transition is rejected before any write happens.
    pub async fn complete(
        &self,
        actor: &AuthUser,
        request_id: Uuid,
        input: CompleteInput,
    ) -> AppResult<ServiceRequest> {
        let request = self.get_request(request_id).await?;
        check_version(&request, input.expected_version)?;

        if !field_staff_may_complete(actor, request.assignee_id) {
            return Err(AppError::InsufficientPermissions);
        }

        validate_note(&input.completion_report).map_err(|msg| AppError::Validation {
            field: "completion_report".to_string(),
            message: msg.to_string(),
            message_pt: "Relatório muito longo".to_string(),
        })?;

        let execution_date = input
            .execution_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let state = self.load_state(&request).await?;
        let next = lifecycle::apply(
            &state,
            &RequestAction::Complete {
                report: input.completion_report.clone(),
                execution_date,
            },
        )
        .map_err(map_transition)?;

        let result = sqlx::query(
            r#"
            UPDATE service_requests
            SET status = $1,
                execution_date = $2,
                completion_report = $3,
                version = version + 1,
                updated_at = now()
            WHERE id = $4 AND version = $5
            "#,
        )
        .bind(next.status.as_str())
        .bind(next.execution_date)
        .bind(&next.completion_report)
        .bind(request_id)
        .bind(request.version)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.write_conflict(request_id, request.version).await);
        }

        super::NotificationService::new(self.db.clone())
            .notify_farmer(
                request.farmer_id,
                "Solicitação concluída",
                "Sua solicitação foi concluída pela equipe.",
                Some(request_id),
            )
            .await?;

        self.get_request(request_id).await
    }

    /// Soft-cancel a request (status CANCELADA, never a hard delete).
    ///
    /// Farmers may cancel only their own, still-pending requests; staff may
    /// cancel anything not yet terminal.
    pub async fn cancel(
        &self,
        actor: &AuthUser,
        request_id: Uuid,
        input: CancelInput,
    ) -> AppResult<ServiceRequest> {
        let request = self.get_request(request_id).await?;
        self.check_actor_may_touch(actor, &request)?;
        check_version(&request, input.expected_version)?;

        let by_requester = actor.role == Role::Farmer;
        let state = self.load_state(&request).await?;
        let next = lifecycle::apply(&state, &RequestAction::Cancel { by_requester })
            .map_err(map_transition)?;

        let result = sqlx::query(
            r#"
            UPDATE service_requests
            SET status = $1, version = version + 1, updated_at = now()
            WHERE id = $2 AND version = $3
            "#,
        )
        .bind(next.status.as_str())
        .bind(request_id)
        .bind(request.version)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.write_conflict(request_id, request.version).await);
        }

        if !by_requester {
            super::NotificationService::new(self.db.clone())
                .notify_farmer(
                    request.farmer_id,
                    "Solicitação cancelada",
                    "Sua solicitação foi cancelada pela equipe.",
                    Some(request_id),
                )
                .await?;
        }

        self.get_request(request_id).await
    }

    /// List requests with foreign keys resolved to display names.
    ///
    /// The catalogs are fetched concurrently; a failed catalog fetch
    /// degrades that column to the "N/A" placeholder instead of failing the
    /// whole response.
    pub async fn get_resolved_requests(
        &self,
        filter: RequestFilter,
    ) -> AppResult<Vec<ResolvedRequest>> {
        let (requests, catalogs) = tokio::join!(self.get_requests(filter), self.load_catalogs());

        let mut requests = requests?;
        resolver::sort_newest_first(&mut requests);
        Ok(requests
            .iter()
            .map(|request| resolver::resolve(request, &catalogs))
            .collect())
    }

    /// Fetch one request together with its resolved view
    pub async fn get_resolved_request(
        &self,
        request_id: Uuid,
    ) -> AppResult<(ServiceRequest, ResolvedRequest)> {
        let (request, catalogs) = tokio::join!(self.get_request(request_id), self.load_catalogs());
        let request = request?;
        let resolved = resolver::resolve(&request, &catalogs);
        Ok((request, resolved))
    }

    async fn load_catalogs(&self) -> Catalogs {
        let (farmers, properties, services, vehicles, staff) = tokio::join!(
            self.fetch_names("farmers"),
            self.fetch_names("properties"),
            self.fetch_service_summaries(),
            self.fetch_names("vehicles"),
            self.fetch_names("staff_members"),
        );

        Catalogs {
            farmers: catalog_or_empty(farmers, "farmers"),
            properties: catalog_or_empty(properties, "properties"),
            service_types: catalog_or_empty(services, "service_types"),
            vehicles: catalog_or_empty(vehicles, "vehicles"),
            staff: catalog_or_empty(staff, "staff_members"),
        }
    }

    async fn fetch_names(
        &self,
        table: &str,
    ) -> AppResult<std::collections::HashMap<Uuid, String>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(&format!("SELECT id, name FROM {table}"))
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn fetch_service_summaries(
        &self,
    ) -> AppResult<std::collections::HashMap<Uuid, ServiceTypeSummary>> {
        let rows = sqlx::query_as::<_, (Uuid, String, bool)>(
            "SELECT id, name, requires_staff FROM service_types",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, requires_staff)| {
                (
                    id,
                    ServiceTypeSummary {
                        name,
                        requires_staff,
                    },
                )
            })
            .collect())
    }

    /// Build the lifecycle state for a stored request, joining in the
    /// service type's staff requirement
    async fn load_state(&self, request: &ServiceRequest) -> AppResult<RequestState> {
        let requires_staff = sqlx::query_scalar::<_, bool>(
            "SELECT requires_staff FROM service_types WHERE id = $1",
        )
        .bind(request.service_type_id)
        .fetch_optional(&self.db)
        .await?
        .unwrap_or(false);

        Ok(RequestState {
            status: request.status,
            assignee_id: request.assignee_id,
            execution_date: request.execution_date,
            completion_report: request.completion_report.clone(),
            requires_staff,
        })
    }

    /// Resolve the rejection for a version-guarded write that matched no
    /// row, reporting the version the record actually holds now
    async fn write_conflict(&self, request_id: Uuid, expected: i32) -> AppError {
        match sqlx::query_scalar::<_, i32>("SELECT version FROM service_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&self.db)
            .await
        {
            Ok(current) => stale_or_missing(expected, current),
            Err(e) => AppError::DatabaseError(e),
        }
    }

    /// Farmers may only touch their own requests; staff may touch any
    fn check_actor_may_touch(&self, actor: &AuthUser, request: &ServiceRequest) -> AppResult<()> {
        if actor.is_staff() {
            return Ok(());
        }
        if actor.farmer_id == Some(request.farmer_id) {
            return Ok(());
        }
        Err(AppError::InsufficientPermissions)
    }
}

/// Error for a guarded UPDATE that matched no row: the record either moved
/// past the version the caller read or disappeared entirely.
fn stale_or_missing(expected: i32, current_version: Option<i32>) -> AppError {
    match current_version {
        Some(found) => AppError::StaleVersion { expected, found },
        None => AppError::NotFound("Request".to_string()),
    }
}

/// Field staff may only close out their own assignments; a token without a
/// linked staff profile matches nothing, in particular not an unassigned
/// request.
fn field_staff_may_complete(actor: &AuthUser, assignee_id: Option<Uuid>) -> bool {
    if !actor.role.is_field_staff() {
        return true;
    }
    actor.staff_id.is_some() && actor.staff_id == assignee_id
}

fn check_version(request: &ServiceRequest, expected: Option<i32>) -> AppResult<()> {
    if let Some(expected) = expected {
        if expected != request.version {
            return Err(AppError::StaleVersion {
                expected,
                found: request.version,
            });
        }
    }
    Ok(())
}

fn map_transition(err: TransitionError) -> AppError {
    match err {
        TransitionError::AssignmentRequired => AppError::AssignmentRequired,
        TransitionError::NotPending | TransitionError::Terminal => {
            AppError::InvalidStateTransition(err.to_string())
        }
    }
}

fn catalog_or_empty<T>(
    result: AppResult<std::collections::HashMap<Uuid, T>>,
    name: &str,
) -> std::collections::HashMap<Uuid, T> {
    match result {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("Catalog '{}' failed to load, rendering N/A: {}", name, e);
            std::collections::HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_at_version(version: i32) -> ServiceRequest {
        ServiceRequest {
            id: Uuid::from_u128(1),
            farmer_id: Uuid::from_u128(2),
            property_id: Uuid::from_u128(3),
            service_type_id: Uuid::from_u128(4),
            vehicle_id: None,
            assignee_id: None,
            status: RequestStatus::Pending,
            submission_date: Utc::now().date_naive(),
            execution_date: None,
            note: None,
            staff_notes: None,
            completion_report: None,
            version,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_version_check_accepts_match_and_absence() {
        let request = request_at_version(3);
        assert!(check_version(&request, None).is_ok());
        assert!(check_version(&request, Some(3)).is_ok());
    }

    #[test]
    fn test_version_check_rejects_mismatch() {
        let request = request_at_version(3);
        match check_version(&request, Some(2)) {
            Err(AppError::StaleVersion { expected, found }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected StaleVersion, got {:?}", other.map(|_| ())),
        }
    }

    fn actor(role: Role, staff_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::from_u128(10),
            role,
            farmer_id: None,
            staff_id,
        }
    }

    #[test]
    fn test_admins_complete_regardless_of_assignment() {
        let admin = actor(Role::Admin, None);
        assert!(field_staff_may_complete(&admin, None));
        assert!(field_staff_may_complete(&admin, Some(Uuid::from_u128(5))));
    }

    #[test]
    fn test_field_staff_complete_only_their_own_assignment() {
        let own = Uuid::from_u128(5);
        let technician = actor(Role::Technician, Some(own));
        assert!(field_staff_may_complete(&technician, Some(own)));
        assert!(!field_staff_may_complete(&technician, Some(Uuid::from_u128(6))));
        assert!(!field_staff_may_complete(&technician, None));
    }

    #[test]
    fn test_field_staff_without_profile_complete_nothing() {
        // An operator token with no linked staff profile must not slip
        // through on an unassigned request
        let operator = actor(Role::Operator, None);
        assert!(!field_staff_may_complete(&operator, None));
        assert!(!field_staff_may_complete(&operator, Some(Uuid::from_u128(5))));
    }

    #[test]
    fn test_no_row_conflict_reports_the_stored_version() {
        match stale_or_missing(3, Some(5)) {
            AppError::StaleVersion { expected, found } => {
                assert_eq!(expected, 3);
                assert_eq!(found, 5);
            }
            other => panic!("expected StaleVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_no_row_conflict_without_record_is_not_found() {
        assert!(matches!(stale_or_missing(3, None), AppError::NotFound(_)));
    }

    #[test]
    fn test_transition_errors_keep_their_identity() {
        assert!(matches!(
            map_transition(TransitionError::AssignmentRequired),
            AppError::AssignmentRequired
        ));
        assert!(matches!(
            map_transition(TransitionError::NotPending),
            AppError::InvalidStateTransition(_)
        ));
        assert!(matches!(
            map_transition(TransitionError::Terminal),
            AppError::InvalidStateTransition(_)
        ));
    }
}
