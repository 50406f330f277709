/// Custom actions for Product entities.
///
/// Every action answers with the stock level left after it ran.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Takes units out of stock.
    ///
    /// # Errors
    /// Fails if the requested amount exceeds available stock.
    ReserveStock(u32),
    /// Puts units back into stock.
    Restock(u32),
    /// Applies a signed inventory correction.
    AdjustStock(i64),
}
