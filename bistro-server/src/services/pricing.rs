//! Authoritative cart pricing
//!
//! Totals are always recomputed from current catalog prices; a total sent by
//! the client is never used.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::order::{MAX_QUANTITY, sum_lines};
use shared::request::OrderLineRequest;

use crate::db::{MenuStore, OrderLine};

/// Priced cart, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    /// One line per distinct item, in first-seen order
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

impl PricedCart {
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

fn invalid_quantity(item_id: i64, quantity: i32) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidQuantity,
        format!("Quantity for item {item_id} must be between 1 and {MAX_QUANTITY}"),
    )
    .with_detail("item_id", item_id)
    .with_detail("quantity", quantity)
}

/// Validate quantities and merge duplicate lines of the same item
pub fn merge_lines(items: &[OrderLineRequest]) -> Result<Vec<(i64, i32)>, AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let mut merged: Vec<(i64, i32)> = Vec::with_capacity(items.len());
    for line in items {
        let quantity = line.quantity_or_default();
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(invalid_quantity(line.item_id, quantity));
        }
        match merged.iter_mut().find(|(id, _)| *id == line.item_id) {
            Some((_, existing)) => {
                *existing += quantity;
                if *existing > MAX_QUANTITY {
                    return Err(invalid_quantity(line.item_id, *existing));
                }
            }
            None => merged.push((line.item_id, quantity)),
        }
    }
    Ok(merged)
}

/// Price a cart against the current catalog
///
/// Fails with `OrderEmpty`, `InvalidQuantity`, or `MenuItemNotFound` (listing
/// every unknown id) before anything is written.
pub async fn price_cart(
    menu: &(impl MenuStore + ?Sized),
    items: &[OrderLineRequest],
) -> Result<PricedCart, AppError> {
    let merged = merge_lines(items)?;
    let ids: Vec<i64> = merged.iter().map(|(id, _)| *id).collect();
    let prices = menu.menu_prices(&ids).await?;

    let missing: Vec<i64> = ids
        .iter()
        .copied()
        .filter(|id| !prices.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::MenuItemNotFound,
            format!("Unknown menu items: {missing:?}"),
        )
        .with_detail("item_ids", missing));
    }

    let lines: Vec<OrderLine> = merged
        .into_iter()
        .filter_map(|(item_id, quantity)| {
            prices.get(&item_id).map(|&unit_price| OrderLine {
                item_id,
                quantity,
                unit_price,
            })
        })
        .collect();
    let total = sum_lines(lines.iter().map(|l| (l.unit_price, l.quantity)));

    Ok(PricedCart { lines, total })
}
