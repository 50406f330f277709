use crate::domain::{GeoPoint, TrackedOrder};

#[derive(Debug, Clone, PartialEq)]
pub enum CourierAction {
    UpdateLocation(GeoPoint),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShipmentAction {
    /// Hands the order to a courier; a pending order goes in transit.
    AssignCourier(String),
    /// Replaces the order's latest location fix.
    RecordLocation(GeoPoint),
    MarkDelivered,
    Cancel,
}

/// The order after the action; `changed` is false for idempotent repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentTransition {
    pub order: TrackedOrder,
    pub changed: bool,
}
