//! Repository for the vehicle fleet.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{VehicleId, VehicleStatus};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::vehicle::{Vehicle, VehicleFilter, VehiclePayload};

const VEHICLE_COLUMNS: &str = "id, vehicle_type, name, license_plate, brand, model, year, \
     serial_number, status, odometer_km, insurance_expiry, inspection_expiry, notes, \
     created_at, updated_at";

/// Repository for vehicle database operations.
pub struct VehicleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VehicleRepository<'a> {
    /// Create a new vehicle repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List vehicles matching the filter, ordered by call name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &VehicleFilter,
        pagination: Pagination,
    ) -> Result<Page<Vehicle>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY name");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query
            .build_query_as::<Vehicle>()
            .fetch_all(self.pool)
            .await?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vehicles WHERE 1=1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch one vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such vehicle exists.
    pub async fn get(&self, id: VehicleId) -> Result<Vehicle, RepositoryError> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, payload: &VehiclePayload) -> Result<Vehicle, RepositoryError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "INSERT INTO vehicles (vehicle_type, name, license_plate, brand, model, year,
                                   serial_number, status, odometer_km, insurance_expiry,
                                   inspection_expiry, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {VEHICLE_COLUMNS}"
        ))
        .bind(payload.vehicle_type)
        .bind(&payload.name)
        .bind(&payload.license_plate)
        .bind(&payload.brand)
        .bind(&payload.model)
        .bind(payload.year)
        .bind(&payload.serial_number)
        .bind(payload.status)
        .bind(payload.odometer_km)
        .bind(payload.insurance_expiry)
        .bind(payload.inspection_expiry)
        .bind(&payload.notes)
        .fetch_one(self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Update a vehicle in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vehicle does not exist.
    pub async fn update(
        &self,
        id: VehicleId,
        payload: &VehiclePayload,
    ) -> Result<Vehicle, RepositoryError> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "UPDATE vehicles SET vehicle_type = $2, name = $3, license_plate = $4,
                 brand = $5, model = $6, year = $7, serial_number = $8, status = $9,
                 odometer_km = $10, insurance_expiry = $11, inspection_expiry = $12,
                 notes = $13, updated_at = NOW()
             WHERE id = $1
             RETURNING {VEHICLE_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.vehicle_type)
        .bind(&payload.name)
        .bind(&payload.license_plate)
        .bind(&payload.brand)
        .bind(&payload.model)
        .bind(payload.year)
        .bind(&payload.serial_number)
        .bind(payload.status)
        .bind(payload.odometer_km)
        .bind(payload.insurance_expiry)
        .bind(payload.inspection_expiry)
        .bind(&payload.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete: mark the vehicle decommissioned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vehicle does not exist.
    pub async fn delete(&self, id: VehicleId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE vehicles SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(VehicleStatus::Dismesso)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &VehicleFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(vehicle_type) = filter.vehicle_type {
        query.push(" AND vehicle_type = ").push_bind(vehicle_type);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR license_plate ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR brand ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
