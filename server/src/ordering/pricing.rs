//! 订单金额计算
//!
//! 全部使用 Decimal，避免浮点累加误差。
//! 金额统一四舍五入到两位小数 (midpoint away from zero)。

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a money amount to 2 decimal places
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total: captured unit price × quantity
pub fn line_total(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity)
}

/// Tax on a subtotal at the configured rate
pub fn tax_for(subtotal: Decimal, rate: Decimal) -> Decimal {
    round_money(subtotal * rate)
}

/// Grand total: subtotal + tax
pub fn total_for(subtotal: Decimal, tax: Decimal) -> Decimal {
    round_money(subtotal + tax)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_decimal_accumulation_precision() {
        // f64 fails at this; Decimal must not
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += dec("0.01");
        }
        assert_eq!(total, dec("10.00"));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec("8.00"), 2), dec("16.00"));
        assert_eq!(line_total(dec("10.99"), 3), dec("32.97"));
    }

    #[test]
    fn test_tax_ten_percent() {
        let subtotal = dec("16.00");
        let tax = tax_for(subtotal, dec("0.10"));
        assert_eq!(tax, dec("1.60"));
        assert_eq!(total_for(subtotal, tax), dec("17.60"));
    }

    #[test]
    fn test_tax_rounding_midpoint() {
        // 10.05 * 0.10 = 1.005 → rounds away from zero
        assert_eq!(tax_for(dec("10.05"), dec("0.10")), dec("1.01"));
        // 10.04 * 0.10 = 1.004 → rounds down
        assert_eq!(tax_for(dec("10.04"), dec("0.10")), dec("1.00"));
    }

    #[test]
    fn test_total_is_subtotal_plus_tax() {
        let subtotal = dec("123.45");
        let tax = tax_for(subtotal, dec("0.10"));
        assert_eq!(total_for(subtotal, tax), subtotal + tax);
    }
}
