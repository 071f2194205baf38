use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{ProductInput, ProductView};
use crate::models::product::{NewProductRow, ProductChangeset, ProductRow};
use crate::schema::products;

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(row: ProductRow) -> ProductView {
    ProductView {
        id: row.id,
        name: row.name,
        price: row.price,
        stock_quantity: row.stock_quantity,
        created_at: row.created_at,
    }
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: input.name,
                price: input.price,
                stock_quantity: input.stock_quantity,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;

        Ok(to_view(row))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(to_view))
    }

    fn find_all(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(to_view).collect())
    }

    fn update(&self, product: ProductView) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(products::table.find(product.id))
            .set(&ProductChangeset {
                name: product.name,
                price: product.price,
                stock_quantity: product.stock_quantity,
                updated_at: Utc::now(),
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;

        Ok(to_view(row))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::DieselProductRepository;
    use crate::domain::ports::ProductRepository;
    use crate::domain::product::ProductInput;
    use crate::infrastructure::test_support::setup_db;

    fn input(name: &str, price: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            stock_quantity: 25,
        }
    }

    #[tokio::test]
    async fn create_and_find_by_id_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let created = repo.create(input("Keyboard", "49.99")).expect("create failed");
        let found = repo
            .find_by_id(created.id)
            .expect("find failed")
            .expect("product should exist");

        assert_eq!(found.name, "Keyboard");
        assert_eq!(found.price, BigDecimal::from_str("49.99").unwrap());
        assert_eq!(found.stock_quantity, 25);
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let mut created = repo.create(input("Mouse", "25.00")).expect("create failed");
        created.price = BigDecimal::from_str("19.99").unwrap();
        created.stock_quantity = 7;

        let updated = repo.update(created).expect("update failed");
        assert_eq!(updated.price, BigDecimal::from_str("19.99").unwrap());
        assert_eq!(updated.stock_quantity, 7);
    }

    #[tokio::test]
    async fn delete_returns_false_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        assert!(!repo.delete(uuid::Uuid::new_v4()).expect("delete failed"));
    }
}
