use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{NewProduct, Product},
    services::pricing::MAX_MONEY,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Decimal,
}

impl CreateProductRequest {
    pub fn validate(self) -> AppResult<NewProduct> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".into()));
        }
        if self.price <= Decimal::ZERO {
            return Err(AppError::BadRequest("price must be greater than 0".into()));
        }
        if self.price.normalize().scale() > 2 {
            return Err(AppError::BadRequest(
                "price must have at most two decimal places".into(),
            ));
        }
        if self.price > MAX_MONEY {
            return Err(AppError::BadRequest("price exceeds the maximum allowed".into()));
        }
        Ok(NewProduct {
            name: name.to_string(),
            price: self.price,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
