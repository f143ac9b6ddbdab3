//! Rural property registry

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Property;

/// Property service for the rural property registry
#[derive(Clone)]
pub struct PropertyService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    farmer_id: Uuid,
    name: String,
    area_hectares: Decimal,
    municipality: Option<String>,
    location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.id,
            farmer_id: row.farmer_id,
            name: row.name,
            area_hectares: row.area_hectares,
            municipality: row.municipality,
            location: row.location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for registering a property
#[derive(Debug, Deserialize)]
pub struct CreatePropertyInput {
    pub farmer_id: Uuid,
    pub name: String,
    pub area_hectares: Decimal,
    pub municipality: Option<String>,
    pub location: Option<String>,
}

/// Input for updating a property
#[derive(Debug, Deserialize)]
pub struct UpdatePropertyInput {
    pub name: Option<String>,
    pub area_hectares: Option<Decimal>,
    pub municipality: Option<String>,
    pub location: Option<String>,
}

const SELECT: &str = r#"
    SELECT id, farmer_id, name, area_hectares, municipality, location,
           created_at, updated_at
    FROM properties
"#;

impl PropertyService {
    /// Create a new PropertyService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all properties, optionally restricted to one farmer
    pub async fn get_properties(&self, farmer_id: Option<Uuid>) -> AppResult<Vec<Property>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!(
            "{SELECT} WHERE ($1::uuid IS NULL OR farmer_id = $1) ORDER BY name ASC"
        ))
        .bind(farmer_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Property::from).collect())
    }

    /// Get a property by ID
    pub async fn get_property(&self, id: Uuid) -> AppResult<Property> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Property".to_string()))?;
        Ok(Property::from(row))
    }

    /// Register a property for a farmer
    pub async fn create_property(&self, input: CreatePropertyInput) -> AppResult<Property> {
        if input.area_hectares <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "area_hectares".to_string(),
                message: "Area must be greater than 0".to_string(),
                message_pt: "A área deve ser maior que 0".to_string(),
            });
        }

        let farmer_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM farmers WHERE id = $1")
                .bind(input.farmer_id)
                .fetch_one(&self.db)
                .await?;
        if farmer_exists == 0 {
            return Err(AppError::NotFound("Farmer".to_string()));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO properties (farmer_id, name, area_hectares, municipality, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.farmer_id)
        .bind(&input.name)
        .bind(input.area_hectares)
        .bind(&input.municipality)
        .bind(&input.location)
        .fetch_one(&self.db)
        .await?;

        self.get_property(id).await
    }

    /// Update a property
    pub async fn update_property(
        &self,
        id: Uuid,
        input: UpdatePropertyInput,
    ) -> AppResult<Property> {
        let existing = self.get_property(id).await?;

        let area = input.area_hectares.unwrap_or(existing.area_hectares);
        if area <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "area_hectares".to_string(),
                message: "Area must be greater than 0".to_string(),
                message_pt: "A área deve ser maior que 0".to_string(),
            });
        }

        sqlx::query(
            r#"
            UPDATE properties
            SET name = $1, area_hectares = $2, municipality = $3, location = $4,
                updated_at = now()
            WHERE id = $5
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(area)
        .bind(input.municipality.or(existing.municipality))
        .bind(input.location.or(existing.location))
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get_property(id).await
    }

    /// Delete a property with no requests against it
    pub async fn delete_property(&self, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM service_requests WHERE property_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use > 0 {
            return Err(AppError::Conflict {
                resource: "property".to_string(),
                message: format!("Property is referenced by {} requests", in_use),
                message_pt: format!("A propriedade é usada por {} solicitações", in_use),
            });
        }

        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Property".to_string()));
        }
        Ok(())
    }
}
