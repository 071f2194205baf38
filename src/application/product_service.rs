use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{ProductInput, ProductPatch, ProductView};

pub struct ProductService<R> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        validate_name(&input.name)?;
        validate_price(&input.price)?;
        validate_stock(input.stock_quantity)?;
        self.repo.create(input)
    }

    pub fn list_products(&self) -> Result<Vec<ProductView>, DomainError> {
        self.repo.find_all()
    }

    pub fn get_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// Applies only the fields present on the patch; everything else keeps
    /// its stored value.
    pub fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<ProductView, DomainError> {
        let mut product = self
            .repo
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Product", id))?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            product.name = name;
        }
        if let Some(price) = patch.price {
            validate_price(&price)?;
            product.price = price;
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            validate_stock(stock_quantity)?;
            product.stock_quantity = stock_quantity;
        }

        self.repo.update(product)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete(id)? {
            Ok(())
        } else {
            Err(DomainError::not_found("Product", id))
        }
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidInput(
            "Product name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price < BigDecimal::zero() {
        return Err(DomainError::InvalidInput(
            "Price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_stock(stock_quantity: i32) -> Result<(), DomainError> {
    if stock_quantity < 0 {
        return Err(DomainError::InvalidInput(
            "Stock quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}
