use crate::actor_framework::Entity;
use crate::domain::{
    DeliveryOrder, DeliveryOrderCreate, DeliveryRating, DeliveryRatingCreate, DeliveryStatus,
    OrderComment, OrderCommentCreate, RatingStatus,
};
use super::{DeliveryOrderAction, FeedbackError};
use chrono::Utc;

impl Entity for DeliveryOrder {
    type Id = String;
    type CreateParams = DeliveryOrderCreate;
    type Patch = ();
    type Action = DeliveryOrderAction;
    type ActionResult = DeliveryOrder;
    type Error = FeedbackError;

    const KIND: &'static str = "order";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: DeliveryOrderCreate) -> Result<Self, FeedbackError> {
        if params.customer_id.trim().is_empty() {
            return Err(FeedbackError::ValidationError("customer_id is required".into()));
        }
        Ok(Self {
            id,
            customer_id: params.customer_id,
            delivery_status: DeliveryStatus::Pending,
            rating_status: RatingStatus::Pending,
            stars: None,
            delivery_date: params.delivery_date,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), FeedbackError> {
        Ok(())
    }

    /// Delivery: PENDING -> DELIVERED | CANCELLED.
    /// Rating: PENDING -> RATED | SKIPPED, exactly once.
    fn handle_action(&mut self, action: DeliveryOrderAction) -> Result<DeliveryOrder, FeedbackError> {
        match action {
            DeliveryOrderAction::MarkDelivered | DeliveryOrderAction::Cancel
                if self.delivery_status != DeliveryStatus::Pending =>
            {
                return Err(FeedbackError::InvalidTransition(format!(
                    "order {} is already {:?}",
                    self.id, self.delivery_status
                )));
            }
            DeliveryOrderAction::MarkDelivered => {
                self.delivery_status = DeliveryStatus::Delivered;
                self.delivery_date.get_or_insert_with(Utc::now);
            }
            DeliveryOrderAction::Cancel => self.delivery_status = DeliveryStatus::Cancelled,
            DeliveryOrderAction::Rate { .. } | DeliveryOrderAction::SkipRating
                if self.rating_status != RatingStatus::Pending =>
            {
                return Err(FeedbackError::AlreadyRated(self.id.clone()));
            }
            DeliveryOrderAction::Rate { stars } => {
                self.rating_status = RatingStatus::Rated;
                self.stars = Some(stars);
            }
            DeliveryOrderAction::SkipRating => self.rating_status = RatingStatus::Skipped,
        }
        Ok(self.clone())
    }
}

impl Entity for DeliveryRating {
    type Id = String;
    type CreateParams = DeliveryRatingCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Error = FeedbackError;

    const KIND: &'static str = "rating";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: DeliveryRatingCreate) -> Result<Self, FeedbackError> {
        Ok(Self {
            id,
            order_id: params.order_id,
            customer_id: params.customer_id,
            score: params.score,
            comment: params
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn check_conflict(&self, other: &Self) -> Result<(), FeedbackError> {
        if self.order_id == other.order_id {
            return Err(FeedbackError::AlreadyRated(self.order_id.clone()));
        }
        Ok(())
    }
}

impl Entity for OrderComment {
    type Id = String;
    type CreateParams = OrderCommentCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Error = FeedbackError;

    const KIND: &'static str = "comment";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: OrderCommentCreate) -> Result<Self, FeedbackError> {
        let message = params.message.trim();
        if message.is_empty() {
            return Err(FeedbackError::ValidationError("Comment cannot be empty".into()));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            user_id: params.user_id,
            message: message.to_string(),
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), FeedbackError> {
        Ok(())
    }
}
