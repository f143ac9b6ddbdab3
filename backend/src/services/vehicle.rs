//! Municipal fleet registry

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Vehicle;

/// Vehicle service for the equipment fleet
#[derive(Clone)]
pub struct VehicleService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    name: String,
    plate: Option<String>,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Vehicle {
            id: row.id,
            name: row.name,
            plate: row.plate,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for registering a vehicle
#[derive(Debug, Deserialize)]
pub struct CreateVehicleInput {
    pub name: String,
    pub plate: Option<String>,
    pub category: String,
}

/// Input for updating a vehicle
#[derive(Debug, Deserialize)]
pub struct UpdateVehicleInput {
    pub name: Option<String>,
    pub plate: Option<String>,
    pub category: Option<String>,
}

const SELECT: &str = "SELECT id, name, plate, category, created_at, updated_at FROM vehicles";

impl VehicleService {
    /// Create a new VehicleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all vehicles
    pub async fn get_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(&format!("{SELECT} ORDER BY name ASC"))
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    /// Get a vehicle by ID
    pub async fn get_vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle".to_string()))?;
        Ok(Vehicle::from(row))
    }

    /// Register a vehicle
    pub async fn create_vehicle(&self, input: CreateVehicleInput) -> AppResult<Vehicle> {
        if let Some(ref plate) = input.plate {
            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM vehicles WHERE LOWER(plate) = LOWER($1)",
            )
            .bind(plate)
            .fetch_one(&self.db)
            .await?;
            if duplicate > 0 {
                return Err(AppError::DuplicateEntry("plate".to_string()));
            }
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO vehicles (name, plate, category) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.plate)
        .bind(&input.category)
        .fetch_one(&self.db)
        .await?;

        self.get_vehicle(id).await
    }

    /// Update a vehicle
    pub async fn update_vehicle(&self, id: Uuid, input: UpdateVehicleInput) -> AppResult<Vehicle> {
        let existing = self.get_vehicle(id).await?;

        sqlx::query(
            r#"
            UPDATE vehicles
            SET name = $1, plate = $2, category = $3, updated_at = now()
            WHERE id = $4
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.plate.or(existing.plate))
        .bind(input.category.unwrap_or(existing.category))
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get_vehicle(id).await
    }

    /// Delete a vehicle with no open assignments
    pub async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM service_requests
            WHERE vehicle_id = $1 AND status NOT IN ('CONCLUIDA', 'CANCELADA')
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use > 0 {
            return Err(AppError::Conflict {
                resource: "vehicle".to_string(),
                message: format!("Vehicle is assigned to {} open requests", in_use),
                message_pt: format!("O veículo está em {} solicitações abertas", in_use),
            });
        }

        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle".to_string()));
        }
        Ok(())
    }
}
