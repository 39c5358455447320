//! Order pricing from a catalog snapshot.
//!
//! Prices are `rust_decimal::Decimal` throughout, so line totals and the
//! order total are exact at the money column's scale.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{NewOrderItem, Product},
};

/// Largest value a `NUMERIC(12, 2)` column holds.
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// A requested line before pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: i64,
    pub qty: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<NewOrderItem>,
    pub total: Decimal,
}

/// Current price of every product in `products`, keyed by id.
pub fn price_map(products: &[Product]) -> HashMap<i64, Decimal> {
    products.iter().map(|p| (p.id, p.price)).collect()
}

/// Resolves each line against `catalog` and sums the order.
///
/// Fails with [`AppError::MissingProducts`] naming every id absent from the
/// snapshot, in request order and without repeats.
pub fn price_lines(catalog: &HashMap<i64, Decimal>, lines: &[LineRequest]) -> AppResult<PricedOrder> {
    let mut seen = BTreeSet::new();
    let missing: Vec<i64> = lines
        .iter()
        .map(|l| l.product_id)
        .filter(|id| !catalog.contains_key(id))
        .filter(|id| seen.insert(*id))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::MissingProducts(missing));
    }

    let mut total = Decimal::ZERO;
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let unit_price = catalog[&line.product_id];
        let line_total = unit_price
            .checked_mul(Decimal::from(line.qty))
            .ok_or_else(too_large)?;
        total = total.checked_add(line_total).ok_or_else(too_large)?;
        items.push(NewOrderItem {
            product_id: line.product_id,
            qty: line.qty,
            unit_price,
            line_total,
        });
    }

    if total > MAX_MONEY {
        return Err(too_large());
    }

    Ok(PricedOrder { items, total })
}

fn too_large() -> AppError {
    AppError::BadRequest("Order total exceeds the maximum allowed amount".into())
}
