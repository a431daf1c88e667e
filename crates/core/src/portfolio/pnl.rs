//! Unrealized P&L computation.
//!
//! All values here are derived; nothing in this module is ever persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived P&L figures for one holding against a current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingPnl {
    pub current_price: Decimal,
    /// quantity x current price
    pub market_value: Decimal,
    /// (current price - entry price) x quantity
    pub unrealized_pnl: Decimal,
    /// (current price - entry price) / entry price x 100.
    /// `None` when the entry price is zero - reported as N/A, never a crash.
    pub pnl_percent: Option<Decimal>,
}

pub fn compute_pnl(quantity: Decimal, entry_price: Decimal, current_price: Decimal) -> HoldingPnl {
    let market_value = quantity * current_price;
    let unrealized_pnl = (current_price - entry_price) * quantity;
    let pnl_percent = if entry_price.is_zero() {
        None
    } else {
        Some((current_price - entry_price) / entry_price * Decimal::ONE_HUNDRED)
    };
    HoldingPnl {
        current_price,
        market_value,
        unrealized_pnl,
        pnl_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn flat_price_yields_zero_percent() {
        let pnl = compute_pnl(dec!(10), dec!(150), dec!(150));
        assert_eq!(pnl.unrealized_pnl, Decimal::ZERO);
        assert_eq!(pnl.pnl_percent, Some(Decimal::ZERO));
        assert_eq!(pnl.market_value, dec!(1500));
    }

    #[test]
    fn doubled_price_yields_hundred_percent() {
        let pnl = compute_pnl(dec!(4), dec!(25), dec!(50));
        assert_eq!(pnl.pnl_percent, Some(dec!(100)));
        assert_eq!(pnl.unrealized_pnl, dec!(100));
        assert_eq!(pnl.market_value, dec!(200));
    }

    #[test]
    fn loss_is_negative() {
        let pnl = compute_pnl(dec!(2), dec!(100), dec!(75));
        assert_eq!(pnl.unrealized_pnl, dec!(-50));
        assert_eq!(pnl.pnl_percent, Some(dec!(-25)));
    }

    #[test]
    fn zero_entry_price_reports_na_without_panicking() {
        let pnl = compute_pnl(dec!(3), Decimal::ZERO, dec!(10));
        assert_eq!(pnl.pnl_percent, None);
        assert_eq!(pnl.market_value, dec!(30));
    }

    #[test]
    fn fractional_quantity_is_supported() {
        let pnl = compute_pnl(dec!(0.5), dec!(200), dec!(220));
        assert_eq!(pnl.market_value, dec!(110));
        assert_eq!(pnl.unrealized_pnl, dec!(10));
        assert_eq!(pnl.pnl_percent, Some(dec!(10)));
    }
}
