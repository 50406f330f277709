use crate::actor_framework::Entity;
use crate::domain::{
    Courier, CourierCreate, LocationFix, ShipmentStatus, TrackedOrder, TrackedOrderCreate,
};
use super::{CourierAction, ShipmentAction, ShipmentTransition, TrackingError};
use chrono::Utc;

fn required(value: &str, field: &str) -> Result<String, TrackingError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TrackingError::ValidationError(format!("{field} is required")));
    }
    Ok(value.to_string())
}

impl Entity for Courier {
    type Id = String;
    type CreateParams = CourierCreate;
    type Patch = ();
    type Action = CourierAction;
    type ActionResult = Courier;
    type Error = TrackingError;

    const KIND: &'static str = "courier";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: CourierCreate) -> Result<Self, TrackingError> {
        Ok(Self {
            id,
            driver_id: required(&params.driver_id, "driver_id")?,
            name: required(&params.name, "name")?,
            email: params.email.filter(|e| !e.trim().is_empty()),
            phone: params.phone.filter(|p| !p.trim().is_empty()),
            location: None,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), TrackingError> {
        Ok(())
    }

    fn handle_action(&mut self, action: CourierAction) -> Result<Courier, TrackingError> {
        match action {
            CourierAction::UpdateLocation(point) => self.location = Some(LocationFix::now(point)),
        }
        Ok(self.clone())
    }

    fn check_conflict(&self, other: &Self) -> Result<(), TrackingError> {
        if self.driver_id == other.driver_id {
            return Err(TrackingError::AlreadyExists(format!("driver {}", self.driver_id)));
        }
        Ok(())
    }
}

impl Entity for TrackedOrder {
    type Id = String;
    type CreateParams = TrackedOrderCreate;
    type Patch = ();
    type Action = ShipmentAction;
    type ActionResult = ShipmentTransition;
    type Error = TrackingError;

    const KIND: &'static str = "order";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: TrackedOrderCreate) -> Result<Self, TrackingError> {
        let now = Utc::now();
        Ok(Self {
            id,
            order_ref: required(&params.order_ref, "order_ref")?,
            customer_id: required(&params.customer_id, "customer_id")?,
            courier_id: None,
            status: ShipmentStatus::Pending,
            delivery_address: required(&params.delivery_address, "delivery_address")?,
            location: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), TrackingError> {
        Ok(())
    }

    fn handle_action(&mut self, action: ShipmentAction) -> Result<ShipmentTransition, TrackingError> {
        let finished = matches!(self.status, ShipmentStatus::Delivered | ShipmentStatus::Cancelled);
        let changed = match action {
            ShipmentAction::AssignCourier(_) if finished => {
                return Err(self.refuse("assign a courier to"));
            }
            ShipmentAction::AssignCourier(courier_id) => {
                self.courier_id = Some(courier_id);
                if self.status == ShipmentStatus::Pending {
                    self.status = ShipmentStatus::InTransit;
                }
                true
            }
            ShipmentAction::RecordLocation(point) => {
                self.location = Some(LocationFix::now(point));
                true
            }
            ShipmentAction::MarkDelivered => match self.status {
                ShipmentStatus::Delivered => false,
                ShipmentStatus::Cancelled => return Err(self.refuse("deliver")),
                _ => {
                    self.status = ShipmentStatus::Delivered;
                    true
                }
            },
            ShipmentAction::Cancel => match self.status {
                ShipmentStatus::Cancelled => false,
                ShipmentStatus::Delivered => return Err(self.refuse("cancel")),
                _ => {
                    self.status = ShipmentStatus::Cancelled;
                    true
                }
            },
        };
        if changed {
            self.updated_at = Utc::now();
        }
        Ok(ShipmentTransition {
            order: self.clone(),
            changed,
        })
    }

    fn check_conflict(&self, other: &Self) -> Result<(), TrackingError> {
        if self.order_ref == other.order_ref {
            return Err(TrackingError::AlreadyExists(format!("order {}", self.order_ref)));
        }
        Ok(())
    }
}

impl TrackedOrder {
    fn refuse(&self, verb: &str) -> TrackingError {
        TrackingError::InvalidTransition(format!(
            "cannot {verb} order {} while it is {:?}",
            self.order_ref, self.status
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;

    fn order() -> TrackedOrder {
        TrackedOrder::from_create_params(
            "shipment_1".into(),
            TrackedOrderCreate {
                order_ref: "ORD-100".into(),
                customer_id: "user_1".into(),
                delivery_address: "Av. Siempre Viva 742".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_assignment_puts_order_in_transit() {
        let mut order = order();
        let transition = order
            .handle_action(ShipmentAction::AssignCourier("courier_1".into()))
            .unwrap();
        assert_eq!(transition.order.status, ShipmentStatus::InTransit);
        assert_eq!(transition.order.courier_id.as_deref(), Some("courier_1"));
    }

    #[test]
    fn test_delivery_is_idempotent() {
        let mut order = order();
        assert!(order.handle_action(ShipmentAction::MarkDelivered).unwrap().changed);
        let again = order.handle_action(ShipmentAction::MarkDelivered).unwrap();
        assert!(!again.changed);
        assert_eq!(again.order.status, ShipmentStatus::Delivered);
        assert!(matches!(
            order.handle_action(ShipmentAction::AssignCourier("courier_1".into())),
            Err(TrackingError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_location_fix_is_replaced() {
        let mut order = order();
        let first = GeoPoint::new(-12.05, -77.04).unwrap();
        let second = GeoPoint::new(-12.06, -77.03).unwrap();
        order.handle_action(ShipmentAction::RecordLocation(first)).unwrap();
        let fix = order
            .handle_action(ShipmentAction::RecordLocation(second))
            .unwrap()
            .order
            .location
            .unwrap();
        assert_eq!((fix.latitude, fix.longitude), (-12.06, -77.03));
    }
}
