// Accrual calculator
//
// A deposito pays simple monthly interest proportional to the number of whole
// calendar months elapsed since the account's first deposit. Day-of-month is
// deliberately not modeled: a deposit on Jan 31 followed by a withdrawal on
// Feb 1 counts as one full month.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Currency precision: accrued values are rounded to cents.
pub const CURRENCY_DP: u32 = 2;

/// Whole calendar-month difference between two dates, clamped at zero.
///
/// A withdrawal dated before the deposit date accrues nothing; it is not an
/// error and never produces a negative month count.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    months.max(0) as u32
}

/// Simple (non-compounding) accrued balance:
/// `principal + principal * months * yearly_rate / 12`.
///
/// The division by 12 happens last so the common product rates stay exact
/// (0.05 / 12 alone is a repeating decimal).
pub fn accrued_balance(principal: Decimal, yearly_rate: Decimal, months: u32) -> Decimal {
    let interest = principal * yearly_rate * Decimal::from(months) / Decimal::from(12);
    (principal + interest).round_dp(CURRENCY_DP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_between_same_date_is_zero() {
        let d = date(2024, 6, 15);
        assert_eq!(months_between(d, d), 0);
    }

    #[test]
    fn test_months_between_ignores_day_of_month() {
        // Jan 31 -> Feb 1 is one full month
        assert_eq!(months_between(date(2024, 1, 31), date(2024, 2, 1)), 1);
        // Jan 1 -> Jan 31 is still zero months
        assert_eq!(months_between(date(2024, 1, 1), date(2024, 1, 31)), 0);
    }

    #[test]
    fn test_months_between_across_years() {
        assert_eq!(months_between(date(2023, 11, 5), date(2024, 2, 5)), 3);
        assert_eq!(months_between(date(2022, 1, 1), date(2024, 1, 1)), 24);
    }

    #[test]
    fn test_months_between_clamps_to_zero() {
        assert_eq!(months_between(date(2024, 1, 1), date(2023, 12, 1)), 0);
        assert_eq!(months_between(date(2024, 6, 1), date(2020, 1, 1)), 0);
    }

    #[test]
    fn test_accrued_balance_zero_months_is_principal() {
        assert_eq!(
            accrued_balance(dec!(1000000), dec!(0.05), 0),
            dec!(1000000)
        );
    }

    #[test]
    fn test_accrued_balance_formula() {
        // P * (1 + M * R / 12), exact to currency precision
        assert_eq!(
            accrued_balance(dec!(1000000), dec!(0.05), 6),
            dec!(1025000)
        );
        assert_eq!(
            accrued_balance(dec!(500000), dec!(0.03), 12),
            dec!(515000)
        );
        assert_eq!(accrued_balance(dec!(100), dec!(0.07), 1), dec!(100.58));
    }

    #[test]
    fn test_accrued_balance_zero_rate() {
        assert_eq!(accrued_balance(dec!(250.75), dec!(0), 36), dec!(250.75));
    }

    #[test]
    fn test_accrued_balance_rounds_to_cents() {
        // 100 * (1 + 1 * 0.05 / 12) = 100.41666... -> 100.42
        assert_eq!(accrued_balance(dec!(100), dec!(0.05), 1), dec!(100.42));
    }
}
