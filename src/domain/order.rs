use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A requested line as supplied by the caller: the product to reference,
/// how many, and the unit price agreed at order time. The product's current
/// catalog price is never substituted for `unit_price`.
#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Everything the caller may supply when creating an order. `order_date`
/// defaults to now and `status` to `"PENDING"` when absent.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: Uuid,
    pub order_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub lines: Vec<OrderLineInput>,
}

/// Partial update. `None` leaves the stored value untouched; a present
/// `lines` set replaces the whole line collection. A present `total_price`
/// is validated and then superseded by the recomputed sum whenever the
/// lines change.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub order_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub total_price: Option<BigDecimal>,
    pub lines: Option<Vec<OrderLineInput>>,
}

/// A validated line with its derived total, ready to persist.
#[derive(Debug, Clone)]
pub struct OrderLineDraft {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

/// A validated order aggregate with derived totals, ready to persist.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total_price: BigDecimal,
    pub lines: Vec<OrderLineDraft>,
}

/// The merged order fields the reconciler hands to the store, together with
/// an optional replacement line set. `new_lines: None` means the existing
/// lines are kept as they are.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub user_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total_price: BigDecimal,
    pub new_lines: Option<Vec<OrderLineDraft>>,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}
