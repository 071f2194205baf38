use uuid::Uuid;

use super::errors::DomainError;
use super::order::{ListResult, OrderDraft, OrderLineView, OrderUpdate, OrderView};
use super::product::{ProductInput, ProductView};
use super::user::{UserInput, UserView};

pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, input: ProductInput) -> Result<ProductView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;
    fn find_all(&self) -> Result<Vec<ProductView>, DomainError>;
    /// Persists the full merged state; the service owns the patch merge.
    fn update(&self, product: ProductView) -> Result<ProductView, DomainError>;
    /// Returns `false` when no row matched the id.
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, input: UserInput) -> Result<UserView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<UserView>, DomainError>;
    fn find_all(&self) -> Result<Vec<UserView>, DomainError>;
    fn update(&self, user: UserView) -> Result<UserView, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Inserts the order and all of its lines in one transaction.
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    /// Applies the merged fields and, when `new_lines` is present, replaces
    /// the whole line collection — all in one transaction.
    fn update(&self, id: Uuid, update: OrderUpdate) -> Result<OrderView, DomainError>;
    /// Deletes the order and all of its lines in one transaction.
    /// Returns `false` when no order matched the id.
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn find_line_by_id(&self, id: Uuid) -> Result<Option<OrderLineView>, DomainError>;
    fn find_all_lines(&self) -> Result<Vec<OrderLineView>, DomainError>;
}
