//! Farmer registry

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Farmer;
use shared::validation::{validate_cpf, validate_phone};

/// Farmer service for the producer registry
#[derive(Clone)]
pub struct FarmerService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct FarmerRow {
    id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    document: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FarmerRow> for Farmer {
    fn from(row: FarmerRow) -> Self {
        Farmer {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            document: row.document,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for registering a farmer
#[derive(Debug, Deserialize)]
pub struct CreateFarmerInput {
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
}

/// Input for updating a farmer
#[derive(Debug, Deserialize)]
pub struct UpdateFarmerInput {
    pub name: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
}

const SELECT: &str =
    "SELECT id, user_id, name, document, phone, created_at, updated_at FROM farmers";

fn check_fields(document: Option<&str>, phone: Option<&str>) -> AppResult<()> {
    if let Some(document) = document {
        validate_cpf(document).map_err(|msg| AppError::Validation {
            field: "document".to_string(),
            message: msg.to_string(),
            message_pt: "CPF inválido".to_string(),
        })?;
    }
    if let Some(phone) = phone {
        validate_phone(phone).map_err(|msg| AppError::Validation {
            field: "phone".to_string(),
            message: msg.to_string(),
            message_pt: "Telefone inválido".to_string(),
        })?;
    }
    Ok(())
}

impl FarmerService {
    /// Create a new FarmerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all farmers
    pub async fn get_farmers(&self) -> AppResult<Vec<Farmer>> {
        let rows = sqlx::query_as::<_, FarmerRow>(&format!("{SELECT} ORDER BY name ASC"))
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Farmer::from).collect())
    }

    /// Get a farmer by ID
    pub async fn get_farmer(&self, id: Uuid) -> AppResult<Farmer> {
        let row = sqlx::query_as::<_, FarmerRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Farmer".to_string()))?;
        Ok(Farmer::from(row))
    }

    /// Register a farmer without a login (staff-entered record)
    pub async fn create_farmer(&self, input: CreateFarmerInput) -> AppResult<Farmer> {
        check_fields(input.document.as_deref(), input.phone.as_deref())?;

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO farmers (name, document, phone) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.document)
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        self.get_farmer(id).await
    }

    /// Update a farmer
    pub async fn update_farmer(&self, id: Uuid, input: UpdateFarmerInput) -> AppResult<Farmer> {
        check_fields(input.document.as_deref(), input.phone.as_deref())?;
        let existing = self.get_farmer(id).await?;

        sqlx::query(
            r#"
            UPDATE farmers
            SET name = $1, document = $2, phone = $3, updated_at = now()
            WHERE id = $4
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.document.or(existing.document))
        .bind(input.phone.or(existing.phone))
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get_farmer(id).await
    }

    /// Delete a farmer with no properties or requests
    pub async fn delete_farmer(&self, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM properties WHERE farmer_id = $1)
                 + (SELECT COUNT(*) FROM service_requests WHERE farmer_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use > 0 {
            return Err(AppError::Conflict {
                resource: "farmer".to_string(),
                message: "Farmer still has properties or requests".to_string(),
                message_pt: "O agricultor ainda possui propriedades ou solicitações".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farmer".to_string()));
        }
        Ok(())
    }
}
