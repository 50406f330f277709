use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("Latitude {latitude} is out of range"));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("Longitude {longitude} is out of range"));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A point with the moment it was reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn now(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            timestamp: Utc::now(),
        }
    }
}

/// A delivery driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Courier {
    pub id: String,
    pub driver_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<LocationFix>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourierCreate {
    pub driver_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

/// An order out for delivery. `order_ref` is the public tracking reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedOrder {
    pub id: String,
    pub order_ref: String,
    pub customer_id: String,
    pub courier_id: Option<String>,
    pub status: ShipmentStatus,
    pub delivery_address: String,
    pub location: Option<LocationFix>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackedOrderCreate {
    pub order_ref: String,
    pub customer_id: String,
    pub delivery_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingInfo {
    pub order_id: String,
    pub status: ShipmentStatus,
    pub location: Option<LocationFix>,
}

/// Where a customer should look for their parcel right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingSnapshot {
    pub order_id: String,
    pub status: ShipmentStatus,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignCourierRequest {
    pub courier_id: String,
}
