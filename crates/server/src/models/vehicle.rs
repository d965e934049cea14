//! Vehicle fleet types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{VehicleId, VehicleStatus, VehicleType};

/// A fleet asset (vehicle, boat or trailer).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    /// Radio call name ("Alfa 1").
    pub name: String,
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub serial_number: Option<String>,
    pub status: VehicleStatus,
    pub odometer_km: Option<i32>,
    pub insurance_expiry: Option<NaiveDate>,
    pub inspection_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form payload for creating or updating a vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct VehiclePayload {
    #[serde(default)]
    pub vehicle_type: VehicleType,
    pub name: String,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub year: Option<i32>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub odometer_km: Option<i32>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub insurance_expiry: Option<NaiveDate>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub inspection_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Whitelisted query-string filters for the fleet list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilter {
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub status: Option<VehicleStatus>,
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default)]
    pub search: Option<String>,
}
