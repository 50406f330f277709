use tracing::{debug, error, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{
    CommentRequest, DeliveryOrder, DeliveryOrderCreate, DeliveryRating, DeliveryRatingCreate,
    OrderComment, OrderCommentCreate, OutcomeStatus, RatingOutcome, RatingRequest, RatingSettings,
    RatingStatus, RatingSummary,
};
use crate::events::{DomainEvent, EventBus};
use crate::feedback_actor::{DeliveryOrderAction, FeedbackError};

/// Client for delivery feedback: the order's rating state machine, the rating
/// records and the comment thread of each order.
#[derive(Clone)]
pub struct FeedbackClient {
    orders: ResourceClient<DeliveryOrder>,
    ratings: ResourceClient<DeliveryRating>,
    comments: ResourceClient<OrderComment>,
    settings: RatingSettings,
    events: EventBus,
}

impl FeedbackClient {
    pub fn new(
        orders: ResourceClient<DeliveryOrder>,
        ratings: ResourceClient<DeliveryRating>,
        comments: ResourceClient<OrderComment>,
        settings: RatingSettings,
        events: EventBus,
    ) -> Self {
        Self {
            orders,
            ratings,
            comments,
            settings,
            events,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.orders.is_alive()
            && self.ratings.is_alive()
            && self.comments.is_alive()
    }

    #[instrument(skip(self))]
    pub async fn create_order(&self, params: DeliveryOrderCreate) -> Result<DeliveryOrder, FeedbackError> {
        debug!("Sending request");
        let id = self.orders.create(params).await?;
        self.get_order(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self, customer_id: Option<&str>) -> Result<Vec<DeliveryOrder>, FeedbackError> {
        let mut orders: Vec<_> = self
            .orders
            .list()
            .await?
            .into_iter()
            .filter(|o| customer_id.map_or(true, |c| o.customer_id == c))
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn mark_delivered(&self, id: String) -> Result<DeliveryOrder, FeedbackError> {
        debug!("Sending request");
        self.orders.perform_action(id, DeliveryOrderAction::MarkDelivered).await
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: String) -> Result<DeliveryOrder, FeedbackError> {
        debug!("Sending request");
        self.orders.perform_action(id, DeliveryOrderAction::Cancel).await
    }

    /// Rates an order once.
    ///
    /// The order actor decides the single winner; the rating row is written after it.
    #[instrument(skip(self))]
    pub async fn rate_order(&self, order_id: String, request: RatingRequest) -> Result<DeliveryRating, FeedbackError> {
        info!("Processing rating");
        let RatingSettings {
            min_stars,
            max_stars,
            allow_empty_comments,
        } = self.settings;
        if !(min_stars..=max_stars).contains(&request.score) {
            return Err(FeedbackError::InvalidScore {
                score: request.score,
                min: min_stars,
                max: max_stars,
            });
        }
        let comment_is_blank = request.comment.as_deref().map_or(true, |c| c.trim().is_empty());
        if comment_is_blank && !allow_empty_comments {
            return Err(FeedbackError::ValidationError("A comment is required".into()));
        }

        let order = self
            .orders
            .perform_action(order_id.clone(), DeliveryOrderAction::Rate { stars: request.score })
            .await?;
        let rating_id = self
            .ratings
            .create(DeliveryRatingCreate {
                order_id: order.id.clone(),
                customer_id: request.customer_id.clone(),
                score: request.score,
                comment: request.comment,
            })
            .await
            .inspect_err(|e| error!(error = %e, "Rating row rejected after the order was rated"))?;
        let rating = self.get_rating(rating_id).await?;

        info!(order_id = %order.id, stars = rating.score, "Order rated");
        self.events.publish(DomainEvent::OrderRated {
            order_id: order.id,
            customer_id: request.customer_id,
            stars: rating.score,
        });
        Ok(rating)
    }

    #[instrument(skip(self))]
    pub async fn skip_rating(&self, order_id: String) -> Result<DeliveryOrder, FeedbackError> {
        let order = self.orders.perform_action(order_id, DeliveryOrderAction::SkipRating).await?;
        info!(order_id = %order.id, "Rating skipped");
        self.events.publish(DomainEvent::RatingSkipped {
            order_id: order.id.clone(),
            status: order.rating_status,
        });
        Ok(order)
    }

    /// [`Self::rate_order`] as a uniform outcome.
    pub async fn rate(&self, order_id: String, request: RatingRequest) -> RatingOutcome {
        match self.rate_order(order_id.clone(), request).await {
            Ok(_) => RatingOutcome {
                success: true,
                message: "Thank you for rating your order".into(),
                order_id,
                rating_status: OutcomeStatus::Rated,
            },
            Err(e) => Self::failed(order_id, e),
        }
    }

    /// [`Self::skip_rating`] as a uniform outcome.
    pub async fn skip(&self, order_id: String) -> RatingOutcome {
        match self.skip_rating(order_id.clone()).await {
            Ok(_) => RatingOutcome {
                success: true,
                message: "Rating skipped".into(),
                order_id,
                rating_status: OutcomeStatus::Skipped,
            },
            Err(e) => Self::failed(order_id, e),
        }
    }

    fn failed(order_id: String, error: FeedbackError) -> RatingOutcome {
        RatingOutcome {
            success: false,
            message: error.to_string(),
            order_id,
            rating_status: OutcomeStatus::Error,
        }
    }

    #[instrument(skip(self))]
    pub async fn rating_summary(&self, order_id: String) -> Result<RatingSummary, FeedbackError> {
        let order = self.get_order(order_id).await?;
        let rating = self
            .ratings
            .list()
            .await?
            .into_iter()
            .find(|r| r.order_id == order.id);
        Ok(RatingSummary {
            was_rated: order.rating_status == RatingStatus::Rated,
            rating_status: order.rating_status,
            order_id: order.id,
            rating,
        })
    }

    #[instrument(skip(self))]
    pub async fn add_comment(&self, order_id: String, request: CommentRequest) -> Result<OrderComment, FeedbackError> {
        debug!("Sending request");
        let order = self.get_order(order_id).await?;
        let id = self
            .comments
            .create(OrderCommentCreate {
                order_id: order.id,
                user_id: request.user_id,
                message: request.message,
            })
            .await?;
        self.get_comment(id).await
    }

    /// Oldest first.
    #[instrument(skip(self))]
    pub async fn list_comments(&self, order_id: String) -> Result<Vec<OrderComment>, FeedbackError> {
        let order = self.get_order(order_id).await?;
        let mut comments: Vec<_> = self
            .comments
            .list()
            .await?
            .into_iter()
            .filter(|c| c.order_id == order.id)
            .collect();
        comments.sort_by(|a, b| {
            (a.created_at, a.id.len(), &a.id).cmp(&(b.created_at, b.id.len(), &b.id))
        });
        Ok(comments)
    }

    pub fn settings(&self) -> &RatingSettings {
        &self.settings
    }
}

crate::impl_client_methods!(FeedbackClient, orders => DeliveryOrder, FeedbackError, order);
crate::impl_client_methods!(FeedbackClient, ratings => DeliveryRating, FeedbackError, rating);
crate::impl_client_methods!(FeedbackClient, comments => OrderComment, FeedbackError, comment);
