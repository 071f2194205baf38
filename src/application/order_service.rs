use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    CreateOrder, ListResult, OrderDraft, OrderLineDraft, OrderLineInput, OrderLineView,
    OrderPatch, OrderUpdate, OrderView,
};
use crate::domain::ports::{OrderRepository, ProductRepository, UserRepository};

/// Builds, reconciles, and deletes order aggregates. An order and its lines
/// form one consistency boundary: both derived totals (`line_total` per line
/// and `total_price` on the order) are recomputed here on every mutation
/// that touches their inputs, and caller-supplied totals are never trusted.
pub struct OrderService<O, P, U> {
    orders: O,
    products: P,
    users: U,
}

impl<O, P, U> OrderService<O, P, U>
where
    O: OrderRepository,
    P: ProductRepository,
    U: UserRepository,
{
    pub fn new(orders: O, products: P, users: U) -> Self {
        Self {
            orders,
            products,
            users,
        }
    }

    /// Builds an order aggregate from the requested lines and persists it in
    /// one transaction.
    ///
    /// Every referenced product must exist; the caller-supplied unit price is
    /// kept as the price-at-time-of-order, regardless of the product's
    /// current catalog price.
    pub fn create_order(&self, request: CreateOrder) -> Result<OrderView, DomainError> {
        let order_date = request.order_date.unwrap_or_else(Utc::now);
        if order_date > Utc::now() {
            return Err(DomainError::InvalidInput(
                "Order date cannot be in the future".to_string(),
            ));
        }
        if self.users.find_by_id(request.user_id)?.is_none() {
            return Err(DomainError::InvalidInput(format!(
                "User with ID {} not found",
                request.user_id
            )));
        }

        let lines = self.resolve_lines(&request.lines)?;
        let total_price = order_total(&lines);

        let order = self.orders.create(OrderDraft {
            user_id: request.user_id,
            order_date,
            status: request.status.unwrap_or_else(|| "PENDING".to_string()),
            total_price,
            lines,
        })?;
        log::info!(
            "Created order {} with {} lines, total {}",
            order.id,
            order.lines.len(),
            order.total_price
        );
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.orders.find_by_id(id)
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.orders.list(page, limit)
    }

    /// Reconciles an existing order with the proposed changes.
    ///
    /// Fields absent from the patch keep their stored values. A present line
    /// set replaces the whole collection: old lines are discarded, each
    /// proposed product is re-resolved, and `total_price` is recomputed from
    /// the new lines only — a caller-supplied total is validated and then
    /// superseded.
    pub fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<OrderView, DomainError> {
        let existing = self
            .orders
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Order", id))?;

        if let Some(order_date) = patch.order_date {
            if order_date > Utc::now() {
                return Err(DomainError::InvalidInput(
                    "Order date cannot be in the future".to_string(),
                ));
            }
        }
        if let Some(total_price) = &patch.total_price {
            if *total_price < BigDecimal::zero() {
                return Err(DomainError::InvalidInput(
                    "Total price cannot be negative".to_string(),
                ));
            }
        }

        let user_id = match patch.user_id {
            Some(user_id) => {
                if self.users.find_by_id(user_id)?.is_none() {
                    return Err(DomainError::InvalidInput(format!(
                        "User with ID {} not found",
                        user_id
                    )));
                }
                user_id
            }
            None => existing.user_id,
        };

        let (total_price, new_lines) = match patch.lines {
            Some(inputs) => {
                let drafts = self.resolve_lines(&inputs)?;
                (order_total(&drafts), Some(drafts))
            }
            None => (existing.total_price.clone(), None),
        };

        let order = self.orders.update(
            id,
            OrderUpdate {
                user_id,
                order_date: patch.order_date.unwrap_or(existing.order_date),
                status: patch.status.unwrap_or(existing.status),
                total_price,
                new_lines,
            },
        )?;
        log::info!("Updated order {}, total {}", order.id, order.total_price);
        Ok(order)
    }

    /// Deletes the order together with all of its lines. Referenced products
    /// and the owning user are untouched.
    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        if self.orders.delete(id)? {
            log::info!("Deleted order {}", id);
            Ok(())
        } else {
            Err(DomainError::not_found("Order", id))
        }
    }

    pub fn get_order_line(&self, id: Uuid) -> Result<Option<OrderLineView>, DomainError> {
        self.orders.find_line_by_id(id)
    }

    pub fn list_order_lines(&self) -> Result<Vec<OrderLineView>, DomainError> {
        self.orders.find_all_lines()
    }

    /// Validates the requested lines, proves every referenced product exists,
    /// and derives each line's total. Any failure rejects the whole set.
    fn resolve_lines(
        &self,
        inputs: &[OrderLineInput],
    ) -> Result<Vec<OrderLineDraft>, DomainError> {
        if inputs.is_empty() {
            return Err(DomainError::InvalidInput(
                "Order must have at least one order line".to_string(),
            ));
        }

        let mut drafts = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.quantity < 1 {
                return Err(DomainError::InvalidInput(
                    "Order line quantity must be at least 1".to_string(),
                ));
            }
            if input.unit_price < BigDecimal::zero() {
                return Err(DomainError::InvalidInput(
                    "Order line unit price cannot be negative".to_string(),
                ));
            }
            if self.products.find_by_id(input.product_id)?.is_none() {
                return Err(DomainError::not_found("Product", input.product_id));
            }
            drafts.push(OrderLineDraft {
                product_id: input.product_id,
                quantity: input.quantity,
                unit_price: input.unit_price.clone(),
                line_total: line_total(&input.unit_price, input.quantity),
            });
        }
        Ok(drafts)
    }
}

fn line_total(unit_price: &BigDecimal, quantity: i32) -> BigDecimal {
    unit_price * BigDecimal::from(quantity)
}

fn order_total(lines: &[OrderLineDraft]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::zero(), |acc, line| acc + &line.line_total)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::application::memory::{
        InMemoryOrderRepository, InMemoryProductRepository, InMemoryUserRepository,
    };
    use crate::domain::product::ProductInput;
    use crate::domain::user::UserInput;

    type TestService =
        OrderService<InMemoryOrderRepository, InMemoryProductRepository, InMemoryUserRepository>;

    struct Fixture {
        svc: TestService,
        user_id: Uuid,
        product_id: Uuid,
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    /// One user and one product (catalog price 20.00) seeded.
    fn fixture() -> Fixture {
        let products = InMemoryProductRepository::default();
        let users = InMemoryUserRepository::default();

        let product = products
            .create(ProductInput {
                name: "Widget".to_string(),
                price: dec("20.00"),
                stock_quantity: 100,
            })
            .expect("seed product");
        let user = users
            .create(UserInput {
                username: "alice".to_string(),
                password: "hunter2".to_string(),
                email: "alice@example.com".to_string(),
            })
            .expect("seed user");

        Fixture {
            svc: OrderService::new(InMemoryOrderRepository::default(), products, users),
            user_id: user.id,
            product_id: product.id,
        }
    }

    fn line(product_id: Uuid, quantity: i32, unit_price: &str) -> OrderLineInput {
        OrderLineInput {
            product_id,
            quantity,
            unit_price: dec(unit_price),
        }
    }

    fn create(f: &Fixture, lines: Vec<OrderLineInput>) -> Result<OrderView, DomainError> {
        f.svc.create_order(CreateOrder {
            user_id: f.user_id,
            order_date: None,
            status: None,
            lines,
        })
    }

    // ── Aggregate construction ───────────────────────────────────────────────

    #[test]
    fn line_total_is_exact_decimal_product() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 3, "19.99")]).expect("create failed");

        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].line_total, dec("59.97"));
        assert_eq!(order.lines[0].unit_price, dec("19.99"));
        assert_eq!(order.lines[0].quantity, 3);
    }

    #[test]
    fn order_total_is_sum_of_line_totals() {
        let f = fixture();
        let order = create(
            &f,
            vec![
                line(f.product_id, 2, "20.00"),
                line(f.product_id, 1, "29.99"),
            ],
        )
        .expect("create failed");

        assert_eq!(order.lines[0].line_total, dec("40.00"));
        assert_eq!(order.lines[1].line_total, dec("29.99"));
        assert_eq!(order.total_price, dec("69.99"));
    }

    #[test]
    fn caller_supplied_unit_price_wins_over_catalog_price() {
        // Catalog price is 20.00; the order was agreed at 15.50.
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 2, "15.50")]).expect("create failed");

        assert_eq!(order.lines[0].unit_price, dec("15.50"));
        assert_eq!(order.total_price, dec("31.00"));
    }

    #[test]
    fn lines_carry_back_reference_to_their_order() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 1, "5.00")]).expect("create failed");

        assert!(order.lines.iter().all(|l| l.order_id == order.id));
    }

    #[test]
    fn create_with_unknown_product_fails_and_persists_nothing() {
        let f = fixture();
        let err = create(&f, vec![line(Uuid::new_v4(), 1, "5.00")]).unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(f.svc.list_orders(1, 10).expect("list failed").total, 0);
        assert!(f.svc.list_order_lines().expect("list failed").is_empty());
    }

    #[test]
    fn create_rejects_empty_line_set() {
        let f = fixture();
        let err = create(&f, vec![]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn create_rejects_non_positive_quantity() {
        let f = fixture();
        let err = create(&f, vec![line(f.product_id, 0, "5.00")]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn create_rejects_negative_unit_price() {
        let f = fixture();
        let err = create(&f, vec![line(f.product_id, 1, "-5.00")]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn create_rejects_future_order_date() {
        let f = fixture();
        let err = f
            .svc
            .create_order(CreateOrder {
                user_id: f.user_id,
                order_date: Some(Utc::now() + Duration::hours(1)),
                status: None,
                lines: vec![line(f.product_id, 1, "5.00")],
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn create_rejects_unknown_user() {
        let f = fixture();
        let err = f
            .svc
            .create_order(CreateOrder {
                user_id: Uuid::new_v4(),
                order_date: None,
                status: None,
                lines: vec![line(f.product_id, 1, "5.00")],
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn create_defaults_status_to_pending() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 1, "5.00")]).expect("create failed");
        assert_eq!(order.status, "PENDING");
    }

    // ── Reconciliation ───────────────────────────────────────────────────────

    #[test]
    fn update_unknown_order_is_not_found() {
        let f = fixture();
        let err = f
            .svc
            .update_order(Uuid::new_v4(), OrderPatch::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn update_rejects_future_order_date() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 1, "5.00")]).expect("create failed");

        let err = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    order_date: Some(Utc::now() + Duration::days(1)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn update_rejects_negative_total_price() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 1, "5.00")]).expect("create failed");

        let err = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    total_price: Some(dec("-1.00")),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn partial_update_preserves_untouched_fields() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 2, "20.00")]).expect("create failed");

        let updated = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    status: Some("SHIPPED".to_string()),
                    ..Default::default()
                },
            )
            .expect("update failed");

        assert_eq!(updated.status, "SHIPPED");
        assert_eq!(updated.order_date, order.order_date);
        assert_eq!(updated.total_price, order.total_price);
        assert_eq!(updated.user_id, order.user_id);
        assert_eq!(updated.lines.len(), 1);
    }

    #[test]
    fn line_replacement_is_total_not_additive() {
        let f = fixture();
        let order = create(
            &f,
            vec![
                line(f.product_id, 1, "10.00"),
                line(f.product_id, 1, "20.00"),
                line(f.product_id, 1, "30.00"),
            ],
        )
        .expect("create failed");
        let old_line_ids: Vec<Uuid> = order.lines.iter().map(|l| l.id).collect();

        let updated = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    lines: Some(vec![
                        line(f.product_id, 1, "7.00"),
                        line(f.product_id, 2, "1.50"),
                    ]),
                    ..Default::default()
                },
            )
            .expect("update failed");

        assert_eq!(updated.lines.len(), 2);
        assert_eq!(updated.total_price, dec("10.00"));
        for id in old_line_ids {
            assert!(f.svc.get_order_line(id).expect("lookup failed").is_none());
        }
    }

    #[test]
    fn recomputed_total_supersedes_caller_supplied_total() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 1, "10.00")]).expect("create failed");

        let updated = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    total_price: Some(dec("999.99")),
                    lines: Some(vec![line(f.product_id, 3, "20.00")]),
                    ..Default::default()
                },
            )
            .expect("update failed");

        assert_eq!(updated.total_price, dec("60.00"));
    }

    #[test]
    fn caller_supplied_total_without_lines_is_ignored() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 2, "20.00")]).expect("create failed");

        let updated = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    total_price: Some(dec("999.99")),
                    ..Default::default()
                },
            )
            .expect("update failed");

        assert_eq!(updated.total_price, dec("40.00"));
    }

    #[test]
    fn update_with_unknown_product_aborts_whole_replacement() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 2, "20.00")]).expect("create failed");

        let err = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    lines: Some(vec![
                        line(f.product_id, 1, "5.00"),
                        line(Uuid::new_v4(), 1, "5.00"),
                    ]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        // Prior state intact: same lines, same total.
        let unchanged = f
            .svc
            .get_order(order.id)
            .expect("get failed")
            .expect("order should exist");
        assert_eq!(unchanged.lines.len(), 1);
        assert_eq!(unchanged.total_price, dec("40.00"));
    }

    #[test]
    fn update_rejects_empty_replacement_line_set() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 1, "5.00")]).expect("create failed");

        let err = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    lines: Some(vec![]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn update_rejects_unknown_user() {
        let f = fixture();
        let order = create(&f, vec![line(f.product_id, 1, "5.00")]).expect("create failed");

        let err = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    user_id: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    // ── Deletion ─────────────────────────────────────────────────────────────

    #[test]
    fn delete_cascades_to_lines() {
        let f = fixture();
        let order = create(
            &f,
            vec![line(f.product_id, 1, "5.00"), line(f.product_id, 2, "3.00")],
        )
        .expect("create failed");
        let line_ids: Vec<Uuid> = order.lines.iter().map(|l| l.id).collect();

        f.svc.delete_order(order.id).expect("delete failed");

        assert!(f.svc.get_order(order.id).expect("get failed").is_none());
        for id in line_ids {
            assert!(f.svc.get_order_line(id).expect("lookup failed").is_none());
        }
    }

    #[test]
    fn delete_unknown_order_is_not_found() {
        let f = fixture();
        let err = f.svc.delete_order(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    // ── End-to-end scenario ──────────────────────────────────────────────────

    #[test]
    fn create_then_update_scenario() {
        let f = fixture();

        let order = create(&f, vec![line(f.product_id, 2, "20.00")]).expect("create failed");
        assert_eq!(order.total_price, dec("40.00"));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].line_total, dec("40.00"));

        let updated = f
            .svc
            .update_order(
                order.id,
                OrderPatch {
                    lines: Some(vec![line(f.product_id, 3, "20.00")]),
                    ..Default::default()
                },
            )
            .expect("update failed");
        assert_eq!(updated.total_price, dec("60.00"));
        assert_eq!(updated.lines.len(), 1);
        assert_eq!(updated.lines[0].line_total, dec("60.00"));
    }
}
