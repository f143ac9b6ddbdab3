//! Service-type catalog management

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::ServiceType;

/// Service-type service for the catalog of requestable work
#[derive(Clone)]
pub struct ServiceTypeService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceTypeRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    required_vehicle_category: Option<String>,
    requires_staff: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceTypeRow> for ServiceType {
    fn from(row: ServiceTypeRow) -> Self {
        ServiceType {
            id: row.id,
            name: row.name,
            description: row.description,
            required_vehicle_category: row.required_vehicle_category,
            requires_staff: row.requires_staff,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a service type
#[derive(Debug, Deserialize)]
pub struct CreateServiceTypeInput {
    pub name: String,
    pub description: Option<String>,
    pub required_vehicle_category: Option<String>,
    pub requires_staff: bool,
}

/// Input for updating a service type
#[derive(Debug, Deserialize)]
pub struct UpdateServiceTypeInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub required_vehicle_category: Option<String>,
    pub requires_staff: Option<bool>,
}

const SELECT: &str = r#"
    SELECT id, name, description, required_vehicle_category, requires_staff,
           created_at, updated_at
    FROM service_types
"#;

impl ServiceTypeService {
    /// Create a new ServiceTypeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all service types
    pub async fn get_service_types(&self) -> AppResult<Vec<ServiceType>> {
        let rows = sqlx::query_as::<_, ServiceTypeRow>(&format!("{SELECT} ORDER BY name ASC"))
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ServiceType::from).collect())
    }

    /// Get a service type by ID
    pub async fn get_service_type(&self, id: Uuid) -> AppResult<ServiceType> {
        let row = sqlx::query_as::<_, ServiceTypeRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Service type".to_string()))?;
        Ok(ServiceType::from(row))
    }

    /// Create a service type
    pub async fn create_service_type(
        &self,
        input: CreateServiceTypeInput,
    ) -> AppResult<ServiceType> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_pt: "O nome é obrigatório".to_string(),
            });
        }

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM service_types WHERE LOWER(name) = LOWER($1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;
        if duplicate > 0 {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO service_types (name, description, required_vehicle_category, requires_staff)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.required_vehicle_category)
        .bind(input.requires_staff)
        .fetch_one(&self.db)
        .await?;

        self.get_service_type(id).await
    }

    /// Update a service type
    pub async fn update_service_type(
        &self,
        id: Uuid,
        input: UpdateServiceTypeInput,
    ) -> AppResult<ServiceType> {
        let existing = self.get_service_type(id).await?;

        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let category = input
            .required_vehicle_category
            .or(existing.required_vehicle_category);
        let requires_staff = input.requires_staff.unwrap_or(existing.requires_staff);

        sqlx::query(
            r#"
            UPDATE service_types
            SET name = $1, description = $2, required_vehicle_category = $3,
                requires_staff = $4, updated_at = now()
            WHERE id = $5
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(&category)
        .bind(requires_staff)
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get_service_type(id).await
    }

    /// Delete a service type that no request references
    pub async fn delete_service_type(&self, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM service_requests WHERE service_type_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use > 0 {
            return Err(AppError::Conflict {
                resource: "service_type".to_string(),
                message: format!("Service type is referenced by {} requests", in_use),
                message_pt: format!("O serviço é usado por {} solicitações", in_use),
            });
        }

        let result = sqlx::query("DELETE FROM service_types WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service type".to_string()));
        }
        Ok(())
    }
}
