use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    ListResult, OrderDraft, OrderLineDraft, OrderLineView, OrderUpdate, OrderView,
};
use crate::domain::ports::OrderRepository;
use crate::models::order::{NewOrderRow, OrderChangeset, OrderRow};
use crate::models::order_line::{NewOrderLineRow, OrderLineRow};
use crate::schema::{order_lines, orders};

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn line_view(row: OrderLineRow) -> OrderLineView {
    OrderLineView {
        id: row.id,
        order_id: row.order_id,
        product_id: row.product_id,
        quantity: row.quantity,
        unit_price: row.unit_price,
        line_total: row.line_total,
    }
}

fn order_view(row: OrderRow, lines: Vec<OrderLineRow>) -> OrderView {
    OrderView {
        id: row.id,
        user_id: row.user_id,
        order_date: row.order_date,
        status: row.status,
        total_price: row.total_price,
        created_at: row.created_at,
        lines: lines.into_iter().map(line_view).collect(),
    }
}

fn new_line_rows(order_id: Uuid, lines: &[OrderLineDraft]) -> Vec<NewOrderLineRow> {
    lines
        .iter()
        .map(|l| NewOrderLineRow {
            id: Uuid::new_v4(),
            order_id,
            product_id: l.product_id,
            quantity: l.quantity,
            unit_price: l.unit_price.clone(),
            line_total: l.line_total.clone(),
        })
        .collect()
}

fn load_lines(conn: &mut PgConnection, order_id: Uuid) -> QueryResult<Vec<OrderLineRow>> {
    order_lines::table
        .filter(order_lines::order_id.eq(order_id))
        .order(order_lines::created_at.asc())
        .select(OrderLineRow::as_select())
        .load(conn)
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_id = Uuid::new_v4();
            let order: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id: draft.user_id,
                    order_date: draft.order_date,
                    status: draft.status.clone(),
                    total_price: draft.total_price.clone(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            diesel::insert_into(order_lines::table)
                .values(&new_line_rows(order_id, &draft.lines))
                .execute(conn)?;

            let lines = load_lines(conn, order_id)?;
            Ok(order_view(order, lines))
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = load_lines(&mut conn, order.id)?;
        Ok(Some(order_view(order, lines)))
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows.into_iter().map(|o| order_view(o, vec![])).collect(),
                total,
            })
        })
    }

    fn update(&self, id: Uuid, update: OrderUpdate) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order: OrderRow = diesel::update(orders::table.find(id))
                .set(&OrderChangeset {
                    user_id: update.user_id,
                    order_date: update.order_date,
                    status: update.status.clone(),
                    total_price: update.total_price.clone(),
                    updated_at: Utc::now(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            if let Some(lines) = &update.new_lines {
                // Replace, never merge: old lines are orphans once the new
                // set is supplied.
                diesel::delete(order_lines::table.filter(order_lines::order_id.eq(id)))
                    .execute(conn)?;
                diesel::insert_into(order_lines::table)
                    .values(&new_line_rows(id, lines))
                    .execute(conn)?;
            }

            let lines = load_lines(conn, id)?;
            Ok(order_view(order, lines))
        })
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::delete(order_lines::table.filter(order_lines::order_id.eq(id)))
                .execute(conn)?;
            let deleted = diesel::delete(orders::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
    }

    fn find_line_by_id(&self, id: Uuid) -> Result<Option<OrderLineView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = order_lines::table
            .filter(order_lines::id.eq(id))
            .select(OrderLineRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(line_view))
    }

    fn find_all_lines(&self) -> Result<Vec<OrderLineView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = order_lines::table
            .order(order_lines::created_at.asc())
            .select(OrderLineRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(line_view).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::db::DbPool;
    use crate::domain::order::{OrderDraft, OrderLineDraft, OrderUpdate};
    use crate::domain::ports::{OrderRepository, ProductRepository, UserRepository};
    use crate::domain::product::ProductInput;
    use crate::domain::user::UserInput;
    use crate::infrastructure::test_support::setup_db;
    use crate::infrastructure::{DieselProductRepository, DieselUserRepository};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    /// Seeds the user and product rows the order FKs require.
    fn seed(pool: &DbPool) -> (Uuid, Uuid) {
        let user = DieselUserRepository::new(pool.clone())
            .create(UserInput {
                username: "alice".to_string(),
                password: "hunter2".to_string(),
                email: "alice@example.com".to_string(),
            })
            .expect("seed user");
        let product = DieselProductRepository::new(pool.clone())
            .create(ProductInput {
                name: "Widget".to_string(),
                price: dec("20.00"),
                stock_quantity: 100,
            })
            .expect("seed product");
        (user.id, product.id)
    }

    fn line_draft(product_id: Uuid, quantity: i32, unit_price: &str) -> OrderLineDraft {
        let unit_price = dec(unit_price);
        let line_total = &unit_price * BigDecimal::from(quantity);
        OrderLineDraft {
            product_id,
            quantity,
            unit_price,
            line_total,
        }
    }

    fn draft(user_id: Uuid, lines: Vec<OrderLineDraft>) -> OrderDraft {
        let total_price = lines
            .iter()
            .fold(dec("0"), |acc, l| acc + &l.line_total);
        OrderDraft {
            user_id,
            order_date: Utc::now(),
            status: "PENDING".to_string(),
            total_price,
            lines,
        }
    }

    #[tokio::test]
    async fn create_and_find_by_id_roundtrip() {
        let (_container, pool) = setup_db().await;
        let (user_id, product_id) = seed(&pool);
        let repo = DieselOrderRepository::new(pool);

        let created = repo
            .create(draft(user_id, vec![line_draft(product_id, 2, "9.99")]))
            .expect("create failed");

        let order = repo
            .find_by_id(created.id)
            .expect("find failed")
            .expect("order should exist");

        assert_eq!(order.id, created.id);
        assert_eq!(order.user_id, user_id);
        assert_eq!(order.status, "PENDING");
        assert_eq!(order.total_price, dec("19.98"));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.lines[0].line_total, dec("19.98"));
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let result = repo
            .find_by_id(Uuid::new_v4())
            .expect("find should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_replaces_line_rows() {
        let (_container, pool) = setup_db().await;
        let (user_id, product_id) = seed(&pool);
        let repo = DieselOrderRepository::new(pool);

        let created = repo
            .create(draft(
                user_id,
                vec![
                    line_draft(product_id, 1, "10.00"),
                    line_draft(product_id, 1, "20.00"),
                ],
            ))
            .expect("create failed");
        let old_line_ids: Vec<Uuid> = created.lines.iter().map(|l| l.id).collect();

        let new_lines = vec![line_draft(product_id, 3, "20.00")];
        let total_price = dec("60.00");
        let updated = repo
            .update(
                created.id,
                OrderUpdate {
                    user_id,
                    order_date: created.order_date,
                    status: "CONFIRMED".to_string(),
                    total_price,
                    new_lines: Some(new_lines),
                },
            )
            .expect("update failed");

        assert_eq!(updated.status, "CONFIRMED");
        assert_eq!(updated.total_price, dec("60.00"));
        assert_eq!(updated.lines.len(), 1);
        for id in old_line_ids {
            assert!(repo.find_line_by_id(id).expect("lookup failed").is_none());
        }
    }

    #[tokio::test]
    async fn update_without_lines_keeps_line_rows() {
        let (_container, pool) = setup_db().await;
        let (user_id, product_id) = seed(&pool);
        let repo = DieselOrderRepository::new(pool);

        let created = repo
            .create(draft(user_id, vec![line_draft(product_id, 2, "5.00")]))
            .expect("create failed");

        let updated = repo
            .update(
                created.id,
                OrderUpdate {
                    user_id,
                    order_date: created.order_date,
                    status: "SHIPPED".to_string(),
                    total_price: created.total_price.clone(),
                    new_lines: None,
                },
            )
            .expect("update failed");

        assert_eq!(updated.status, "SHIPPED");
        assert_eq!(updated.lines.len(), 1);
        assert_eq!(updated.lines[0].id, created.lines[0].id);
    }

    #[tokio::test]
    async fn delete_removes_order_and_lines() {
        let (_container, pool) = setup_db().await;
        let (user_id, product_id) = seed(&pool);
        let repo = DieselOrderRepository::new(pool);

        let created = repo
            .create(draft(
                user_id,
                vec![
                    line_draft(product_id, 1, "5.00"),
                    line_draft(product_id, 2, "3.00"),
                ],
            ))
            .expect("create failed");
        let line_ids: Vec<Uuid> = created.lines.iter().map(|l| l.id).collect();

        assert!(repo.delete(created.id).expect("delete failed"));
        assert!(repo.find_by_id(created.id).expect("find failed").is_none());
        for id in line_ids {
            assert!(repo.find_line_by_id(id).expect("lookup failed").is_none());
        }
    }

    #[tokio::test]
    async fn delete_returns_false_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        assert!(!repo.delete(Uuid::new_v4()).expect("delete failed"));
    }

    #[tokio::test]
    async fn list_paginates_correctly() {
        let (_container, pool) = setup_db().await;
        let (user_id, product_id) = seed(&pool);
        let repo = DieselOrderRepository::new(pool);

        for _ in 0..5 {
            repo.create(draft(user_id, vec![line_draft(product_id, 1, "1.00")]))
                .expect("create failed");
        }

        let page1 = repo.list(1, 3).expect("list page 1 failed");
        assert_eq!(page1.total, 5);
        assert_eq!(page1.items.len(), 3);

        let page2 = repo.list(2, 3).expect("list page 2 failed");
        assert_eq!(page2.total, 5);
        assert_eq!(page2.items.len(), 2);
    }
}
