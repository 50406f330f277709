/// Transitions of a delivery order. Each answers with the updated order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOrderAction {
    MarkDelivered,
    Cancel,
    Rate { stars: u8 },
    SkipRating,
}
