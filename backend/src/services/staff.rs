//! Municipal staff registry

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Role, StaffMember};
use shared::validation::validate_phone;

/// Staff service for technicians and operators
#[derive(Clone)]
pub struct StaffService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    occupation: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StaffRow> for StaffMember {
    type Error = AppError;

    fn try_from(row: StaffRow) -> Result<Self, AppError> {
        let occupation = Role::parse(&row.occupation)
            .filter(Role::is_field_staff)
            .ok_or_else(|| {
                AppError::Internal(format!("Unknown staff occupation '{}'", row.occupation))
            })?;
        Ok(StaffMember {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            occupation,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Input for registering a staff member
#[derive(Debug, Deserialize)]
pub struct CreateStaffInput {
    pub name: String,
    /// "tecnico" or "operador"
    pub occupation: String,
    pub phone: Option<String>,
}

/// Input for updating a staff member
#[derive(Debug, Deserialize)]
pub struct UpdateStaffInput {
    pub name: Option<String>,
    pub occupation: Option<String>,
    pub phone: Option<String>,
}

const SELECT: &str =
    "SELECT id, user_id, name, occupation, phone, created_at, updated_at FROM staff_members";

fn parse_occupation(tag: &str) -> AppResult<Role> {
    Role::parse(tag)
        .filter(Role::is_field_staff)
        .ok_or_else(|| AppError::Validation {
            field: "occupation".to_string(),
            message: "Occupation must be 'tecnico' or 'operador'".to_string(),
            message_pt: "A função deve ser 'tecnico' ou 'operador'".to_string(),
        })
}

impl StaffService {
    /// Create a new StaffService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all staff members
    pub async fn get_staff(&self) -> AppResult<Vec<StaffMember>> {
        let rows = sqlx::query_as::<_, StaffRow>(&format!("{SELECT} ORDER BY name ASC"))
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(StaffMember::try_from).collect()
    }

    /// Get a staff member by ID
    pub async fn get_staff_member(&self, id: Uuid) -> AppResult<StaffMember> {
        let row = sqlx::query_as::<_, StaffRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff member".to_string()))?;
        StaffMember::try_from(row)
    }

    /// Register a staff member
    pub async fn create_staff_member(&self, input: CreateStaffInput) -> AppResult<StaffMember> {
        let occupation = parse_occupation(&input.occupation)?;
        if let Some(ref phone) = input.phone {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
                message_pt: "Telefone inválido".to_string(),
            })?;
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO staff_members (name, occupation, phone) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&input.name)
        .bind(occupation.as_str())
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        self.get_staff_member(id).await
    }

    /// Update a staff member
    pub async fn update_staff_member(
        &self,
        id: Uuid,
        input: UpdateStaffInput,
    ) -> AppResult<StaffMember> {
        let existing = self.get_staff_member(id).await?;
        let occupation = match input.occupation.as_deref() {
            Some(tag) => parse_occupation(tag)?,
            None => existing.occupation,
        };

        sqlx::query(
            r#"
            UPDATE staff_members
            SET name = $1, occupation = $2, phone = $3, updated_at = now()
            WHERE id = $4
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(occupation.as_str())
        .bind(input.phone.or(existing.phone))
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get_staff_member(id).await
    }

    /// Delete a staff member with no active assignments
    pub async fn delete_staff_member(&self, id: Uuid) -> AppResult<()> {
        let assigned = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM service_requests
            WHERE assignee_id = $1 AND status NOT IN ('CONCLUIDA', 'CANCELADA')
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if assigned > 0 {
            return Err(AppError::Conflict {
                resource: "staff_member".to_string(),
                message: format!("Staff member has {} open assignments", assigned),
                message_pt: format!("O funcionário possui {} serviços em aberto", assigned),
            });
        }

        let result = sqlx::query("DELETE FROM staff_members WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Staff member".to_string()));
        }
        Ok(())
    }
}
