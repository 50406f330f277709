use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{
    Courier, CourierContact, CourierCreate, GeoPoint, ShipmentStatus, TrackedOrder,
    TrackedOrderCreate, TrackingInfo, TrackingSnapshot,
};
use crate::tracking_actor::{CourierAction, ShipmentAction, ShipmentTransition, TrackingError};

/// Client for couriers and the orders they deliver. Orders are addressed by
/// their public reference.
#[derive(Clone)]
pub struct TrackingClient {
    couriers: ResourceClient<Courier>,
    orders: ResourceClient<TrackedOrder>,
}

impl TrackingClient {
    pub fn new(couriers: ResourceClient<Courier>, orders: ResourceClient<TrackedOrder>) -> Self {
        Self { couriers, orders }
    }

    pub fn is_alive(&self) -> bool {
        self.couriers.is_alive()
            && self.orders.is_alive()
    }

    #[instrument(skip(self))]
    pub async fn register_courier(&self, params: CourierCreate) -> Result<Courier, TrackingError> {
        debug!("Sending request");
        let id = self.couriers.create(params).await?;
        self.get_courier(id).await
    }

    #[instrument(skip(self))]
    pub async fn update_courier_location(
        &self,
        courier_id: String,
        latitude: f64,
        longitude: f64,
    ) -> Result<Courier, TrackingError> {
        let point = GeoPoint::new(latitude, longitude).map_err(TrackingError::ValidationError)?;
        self.couriers
            .perform_action(courier_id, CourierAction::UpdateLocation(point))
            .await
    }

    #[instrument(skip(self))]
    pub async fn create_order(&self, params: TrackedOrderCreate) -> Result<TrackedOrder, TrackingError> {
        debug!("Sending request");
        let id = self.orders.create(params).await?;
        self.get_shipment(id).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_ref(&self, order_ref: &str) -> Result<TrackedOrder, TrackingError> {
        self.orders
            .list()
            .await?
            .into_iter()
            .find(|o| o.order_ref == order_ref)
            .ok_or_else(|| TrackingError::NotFound(format!("order '{order_ref}'")))
    }

    #[instrument(skip(self))]
    pub async fn assign_courier(&self, order_ref: &str, courier_id: String) -> Result<TrackedOrder, TrackingError> {
        let order = self.find_by_ref(order_ref).await?;
        let courier = self.get_courier(courier_id).await?;
        let transition = self
            .orders
            .perform_action(order.id, ShipmentAction::AssignCourier(courier.id.clone()))
            .await?;
        info!(courier_id = %courier.id, "Courier assigned");
        Ok(transition.order)
    }

    #[instrument(skip(self))]
    pub async fn update_order_location(
        &self,
        order_ref: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<TrackedOrder, TrackingError> {
        let point = GeoPoint::new(latitude, longitude).map_err(TrackingError::ValidationError)?;
        let order = self.find_by_ref(order_ref).await?;
        let transition = self
            .orders
            .perform_action(order.id, ShipmentAction::RecordLocation(point))
            .await?;
        Ok(transition.order)
    }

    /// Idempotent: delivering a delivered order reports no change.
    #[instrument(skip(self))]
    pub async fn mark_delivered(&self, order_ref: &str) -> Result<ShipmentTransition, TrackingError> {
        let order = self.find_by_ref(order_ref).await?;
        let transition = self.orders.perform_action(order.id, ShipmentAction::MarkDelivered).await?;
        if transition.changed {
            info!("Order delivered");
        }
        Ok(transition)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, order_ref: &str) -> Result<ShipmentTransition, TrackingError> {
        let order = self.find_by_ref(order_ref).await?;
        self.orders.perform_action(order.id, ShipmentAction::Cancel).await
    }

    #[instrument(skip(self))]
    pub async fn tracking_info(&self, order_ref: &str) -> Result<TrackingInfo, TrackingError> {
        let order = self.find_by_ref(order_ref).await?;
        Ok(TrackingInfo {
            order_id: order.order_ref,
            status: order.status,
            location: order.location,
        })
    }

    /// The courier's last position while the order is in transit, else the origin.
    #[instrument(skip(self))]
    pub async fn locate(&self, order_ref: &str) -> Result<TrackingSnapshot, TrackingError> {
        let order = self.find_by_ref(order_ref).await?;
        let point = match (&order.courier_id, order.status) {
            (Some(courier_id), ShipmentStatus::InTransit) => self
                .find_courier(courier_id.clone())
                .await?
                .and_then(|c| c.location)
                .map(|fix| GeoPoint {
                    latitude: fix.latitude,
                    longitude: fix.longitude,
                })
                .unwrap_or(GeoPoint::ORIGIN),
            _ => GeoPoint::ORIGIN,
        };
        Ok(TrackingSnapshot {
            order_id: order.order_ref,
            status: order.status,
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }

    /// Courier contact for the order's customer, checked in this order:
    /// ownership, courier assigned, in transit, complete profile.
    #[instrument(skip(self))]
    pub async fn delivery_contact(&self, order_ref: &str, requester_id: &str) -> Result<CourierContact, TrackingError> {
        let order = self.find_by_ref(order_ref).await?;
        if order.customer_id != requester_id {
            return Err(TrackingError::Forbidden);
        }
        let Some(courier_id) = order.courier_id else {
            return Err(TrackingError::NoCourierAssigned);
        };
        if order.status != ShipmentStatus::InTransit {
            return Err(TrackingError::NotInTransit);
        }
        let courier = self
            .find_courier(courier_id)
            .await?
            .ok_or(TrackingError::ContactUnavailable)?;
        match (courier.email, courier.phone) {
            (Some(email), Some(phone)) if !email.is_empty() && !phone.is_empty() => Ok(CourierContact {
                name: courier.name,
                email,
                phone,
            }),
            _ => Err(TrackingError::ContactUnavailable),
        }
    }
}

crate::impl_client_methods!(TrackingClient, couriers => Courier, TrackingError, courier);
crate::impl_client_methods!(TrackingClient, orders => TrackedOrder, TrackingError, shipment);
