//! In-memory implementations of the repository ports, used as test doubles
//! by the service unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderDraft, OrderLineView, OrderUpdate, OrderView};
use crate::domain::ports::{OrderRepository, ProductRepository, UserRepository};
use crate::domain::product::{ProductInput, ProductView};
use crate::domain::user::{UserInput, UserView};

#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: Mutex<HashMap<Uuid, ProductView>>,
}

impl ProductRepository for InMemoryProductRepository {
    fn create(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        let view = ProductView {
            id: Uuid::new_v4(),
            name: input.name,
            price: input.price,
            stock_quantity: input.stock_quantity,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(view.id, view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    fn find_all(&self) -> Result<Vec<ProductView>, DomainError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    fn update(&self, product: ProductView) -> Result<ProductView, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&product.id) {
            return Err(DomainError::Internal("update of missing product".to_string()));
        }
        rows.insert(product.id, product.clone());
        Ok(product)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<HashMap<Uuid, UserView>>,
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, input: UserInput) -> Result<UserView, DomainError> {
        let view = UserView {
            id: Uuid::new_v4(),
            username: input.username,
            password: input.password,
            email: input.email,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(view.id, view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<UserView>, DomainError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    fn find_all(&self) -> Result<Vec<UserView>, DomainError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    fn update(&self, user: UserView) -> Result<UserView, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&user.id) {
            return Err(DomainError::Internal("update of missing user".to_string()));
        }
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    rows: Mutex<HashMap<Uuid, OrderView>>,
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
        let order_id = Uuid::new_v4();
        let lines = draft
            .lines
            .into_iter()
            .map(|l| OrderLineView {
                id: Uuid::new_v4(),
                order_id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
                line_total: l.line_total,
            })
            .collect();
        let view = OrderView {
            id: order_id,
            user_id: draft.user_id,
            order_date: draft.order_date,
            status: draft.status,
            total_price: draft.total_price,
            created_at: Utc::now(),
            lines,
        };
        self.rows.lock().unwrap().insert(order_id, view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut items: Vec<OrderView> = rows.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        let offset = ((page - 1) * limit).max(0) as usize;
        let items = items
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .map(|mut order| {
                order.lines = vec![];
                order
            })
            .collect();
        Ok(ListResult { items, total })
    }

    fn update(&self, id: Uuid, update: OrderUpdate) -> Result<OrderView, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let order = rows
            .get_mut(&id)
            .ok_or_else(|| DomainError::Internal("update of missing order".to_string()))?;

        order.user_id = update.user_id;
        order.order_date = update.order_date;
        order.status = update.status;
        order.total_price = update.total_price;
        if let Some(lines) = update.new_lines {
            order.lines = lines
                .into_iter()
                .map(|l| OrderLineView {
                    id: Uuid::new_v4(),
                    order_id: id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total,
                })
                .collect();
        }
        Ok(order.clone())
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    fn find_line_by_id(&self, id: Uuid) -> Result<Option<OrderLineView>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .flat_map(|o| o.lines.iter())
            .find(|l| l.id == id)
            .cloned())
    }

    fn find_all_lines(&self) -> Result<Vec<OrderLineView>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().flat_map(|o| o.lines.iter()).cloned().collect())
    }
}
