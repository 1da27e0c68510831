//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary values are `Decimal` end to end; they are only rendered as JSON
//! numbers at the wire boundary.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed quantity per order line
pub const MAX_QUANTITY: i32 = 9999;

/// Round to currency precision, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `price × quantity`, rounded
pub fn line_total(price: Decimal, quantity: i32) -> Decimal {
    round_money(price * Decimal::from(quantity))
}

/// Sum of `price × quantity` over the given lines, rounded once at the end
pub fn sum_lines<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let total: Decimal = lines
        .into_iter()
        .map(|(price, quantity)| price * Decimal::from(quantity))
        .sum();
    round_money(total)
}

/// Whether two amounts are equal within [`MONEY_TOLERANCE`]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(1004, 3)), Decimal::new(100, 2));
        assert_eq!(round_money(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Decimal::new(1099, 2), 3), Decimal::new(3297, 2));
    }

    #[test]
    fn test_sum_lines_exact() {
        // 12.00 × 2 + 2.50 × 1
        let total = sum_lines([(Decimal::new(1200, 2), 2), (Decimal::new(250, 2), 1)]);
        assert_eq!(total, Decimal::new(2650, 2));
    }

    #[test]
    fn test_accumulation_precision() {
        // 0.01 a thousand times is exactly 10
        let total = sum_lines((0..1000).map(|_| (Decimal::new(1, 2), 1)));
        assert_eq!(total, Decimal::from(10));
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(Decimal::new(2650, 2), Decimal::new(26500, 3)));
        assert!(money_eq(Decimal::new(2650, 2), Decimal::new(26505, 3)));
        assert!(!money_eq(Decimal::new(2650, 2), Decimal::new(2651, 2)));
    }
}
