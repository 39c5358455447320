use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{OrderDetail, OrderStatus},
    services::pricing::LineRequest,
};

pub const MAX_QTY: i32 = 9999;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub qty: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    pub items: Vec<OrderItemRequest>,
}

/// A create-order request that passed input validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderCommand {
    pub status: OrderStatus,
    pub assigned_to: Option<Uuid>,
    pub lines: Vec<LineRequest>,
}

impl CreateOrderRequest {
    pub fn validate(self) -> AppResult<CreateOrderCommand> {
        if self.items.is_empty() {
            return Err(AppError::BadRequest("items must contain at least one entry".into()));
        }

        let mut lines = Vec::with_capacity(self.items.len());
        for (idx, item) in self.items.iter().enumerate() {
            if item.product_id <= 0 {
                return Err(AppError::BadRequest(format!(
                    "items[{idx}].productId must be a positive integer"
                )));
            }
            if item.qty <= 0 {
                return Err(AppError::BadRequest(format!(
                    "items[{idx}].qty must be a positive integer"
                )));
            }
            if item.qty > MAX_QTY {
                return Err(AppError::BadRequest(format!(
                    "items[{idx}].qty must not exceed {MAX_QTY}"
                )));
            }
            lines.push(LineRequest {
                product_id: item.product_id,
                qty: item.qty,
            });
        }

        Ok(CreateOrderCommand {
            status: self.status.unwrap_or_default(),
            assigned_to: self.assigned_to,
            lines,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignOrderRequest {
    pub assigned_to: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderDetail>)]
    pub items: Vec<OrderDetail>,
}

pub fn parse_order_id(id: i64) -> AppResult<i64> {
    if id <= 0 {
        return Err(AppError::BadRequest("Invalid order id".into()));
    }
    Ok(id)
}
