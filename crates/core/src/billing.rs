//! Duration and fee computation for parking sessions.
//!
//! Billing charges whole hours: elapsed time is rounded up to the next hour,
//! with a minimum of one billable hour. Fees are computed in [`Decimal`] with
//! full precision; rounding to two decimal places happens only at the
//! persistence/display boundary via [`FeeBreakdown::rounded`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default tax rate applied to parking fees (16% VAT).
#[must_use]
pub fn default_tax_rate() -> Decimal {
    // 0.16
    Decimal::new(16, 2)
}

/// Errors that can occur while computing a fee.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BillingError {
    /// The parking lot has no usable hourly rate configured.
    ///
    /// A zero or negative rate must never silently produce a $0 charge.
    #[error("parking lot has no hourly rate configured")]
    UnconfiguredRate,
    /// The billable hour count is not positive.
    #[error("billable hours must be at least 1 (got {0})")]
    InvalidHours(i64),
}

/// Number of whole hours to bill for a stay from `entry` until `until`.
///
/// Elapsed time is rounded up to the next whole hour. Zero or negative
/// elapsed time (clock skew, same-instant exit) clamps to one billable hour:
/// a session is never billed less than one hour.
#[must_use]
pub fn billable_hours(entry: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let seconds = (until - entry).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    // `i64::div_ceil` is still unstable; `seconds > 0` here (guarded above),
    // so the unsigned cast is exact.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    {
        (seconds as u64).div_ceil(3600) as i64
    }
}

/// Elapsed time split into hours and minutes, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub hours: i64,
    pub minutes: i64,
}

/// Elapsed time from `entry` until `until`, floored at zero.
///
/// Unlike [`billable_hours`] this does not round up; it is for showing the
/// driver how long they have been parked, not for charging them.
#[must_use]
pub fn elapsed_display(entry: DateTime<Utc>, until: DateTime<Utc>) -> ElapsedTime {
    let total_minutes = (until - entry).num_minutes().max(0);
    ElapsedTime {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
    }
}

/// Itemized fee for a parking session.
///
/// Produced by [`quote`]; all values carry full `Decimal` precision until
/// [`rounded`](Self::rounded) is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// `hourly_rate * billable_hours`.
    pub subtotal: Decimal,
    /// `subtotal * tax_rate`.
    pub tax: Decimal,
    /// `(subtotal + tax) * discount_percent / 100`.
    pub discount: Decimal,
    /// `subtotal + tax - discount`.
    pub total: Decimal,
}

impl FeeBreakdown {
    /// Round every component to two decimal places (banker-free, half-up).
    ///
    /// Apply exactly once, when persisting or displaying the fee. Rounding
    /// intermediate values would compound error across components.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: self.subtotal.round_dp(2),
            tax: self.tax.round_dp(2),
            discount: self.discount.round_dp(2),
            total: self.total.round_dp(2),
        }
    }
}

/// Compute the fee for `billable_hours` at `hourly_rate`.
///
/// The discount is a percentage of the taxed amount (`subtotal + tax`), not
/// of the subtotal alone, matching the plan-discount contract.
///
/// # Errors
///
/// Returns [`BillingError::UnconfiguredRate`] if `hourly_rate` is zero or
/// negative, and [`BillingError::InvalidHours`] if `billable_hours < 1`.
pub fn quote(
    hourly_rate: Decimal,
    billable_hours: i64,
    tax_rate: Decimal,
    discount_percent: Decimal,
) -> Result<FeeBreakdown, BillingError> {
    if hourly_rate <= Decimal::ZERO {
        return Err(BillingError::UnconfiguredRate);
    }
    if billable_hours < 1 {
        return Err(BillingError::InvalidHours(billable_hours));
    }

    let subtotal = hourly_rate * Decimal::from(billable_hours);
    let tax = subtotal * tax_rate;
    let discount = (subtotal + tax) * discount_percent / Decimal::ONE_HUNDRED;
    let total = subtotal + tax - discount;

    Ok(FeeBreakdown {
        subtotal,
        tax,
        discount,
        total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minutes: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let entry = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        (entry, entry + chrono::Duration::minutes(minutes))
    }

    #[test]
    fn test_billable_hours_minimum_one() {
        let (entry, until) = at(0);
        assert_eq!(billable_hours(entry, until), 1);

        // Negative elapsed time also clamps to one.
        let (entry, until) = at(-30);
        assert_eq!(billable_hours(entry, until), 1);
    }

    #[test]
    fn test_billable_hours_ceiling() {
        // (0, 60] minutes -> 1 hour
        assert_eq!(billable_hours(at(1).0, at(1).1), 1);
        assert_eq!(billable_hours(at(59).0, at(59).1), 1);
        assert_eq!(billable_hours(at(60).0, at(60).1), 1);
        // (60, 120] minutes -> 2 hours
        assert_eq!(billable_hours(at(61).0, at(61).1), 2);
        assert_eq!(billable_hours(at(120).0, at(120).1), 2);
        // (120, 180] minutes -> 3 hours
        assert_eq!(billable_hours(at(121).0, at(121).1), 3);
        assert_eq!(billable_hours(at(179).0, at(179).1), 3);
    }

    #[test]
    fn test_billable_hours_sub_minute_granularity() {
        let entry = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let until = entry + chrono::Duration::seconds(3601);
        assert_eq!(billable_hours(entry, until), 2);
    }

    #[test]
    fn test_elapsed_display() {
        let (entry, until) = at(135);
        assert_eq!(
            elapsed_display(entry, until),
            ElapsedTime {
                hours: 2,
                minutes: 15
            }
        );

        let (entry, until) = at(-5);
        assert_eq!(
            elapsed_display(entry, until),
            ElapsedTime {
                hours: 0,
                minutes: 0
            }
        );
    }

    #[test]
    fn test_quote_without_discount() {
        let fee = quote(
            Decimal::from(20u32),
            3,
            default_tax_rate(),
            Decimal::ZERO,
        )
        .unwrap()
        .rounded();

        assert_eq!(fee.subtotal, Decimal::new(6000, 2));
        assert_eq!(fee.tax, Decimal::new(960, 2));
        assert_eq!(fee.discount, Decimal::ZERO);
        assert_eq!(fee.total, Decimal::new(6960, 2));
    }

    #[test]
    fn test_quote_with_plan_discount() {
        let fee = quote(
            Decimal::from(20u32),
            3,
            default_tax_rate(),
            Decimal::from(15u32),
        )
        .unwrap()
        .rounded();

        assert_eq!(fee.subtotal, Decimal::new(6000, 2));
        assert_eq!(fee.tax, Decimal::new(960, 2));
        // 15% of 69.60
        assert_eq!(fee.discount, Decimal::new(1044, 2));
        assert_eq!(fee.total, Decimal::new(5916, 2));
    }

    #[test]
    fn test_quote_rejects_unconfigured_rate() {
        assert!(matches!(
            quote(Decimal::ZERO, 2, default_tax_rate(), Decimal::ZERO),
            Err(BillingError::UnconfiguredRate)
        ));
        assert!(matches!(
            quote(Decimal::from(-5i32), 2, default_tax_rate(), Decimal::ZERO),
            Err(BillingError::UnconfiguredRate)
        ));
    }

    #[test]
    fn test_quote_rejects_non_positive_hours() {
        assert!(matches!(
            quote(Decimal::from(20u32), 0, default_tax_rate(), Decimal::ZERO),
            Err(BillingError::InvalidHours(0))
        ));
    }

    #[test]
    fn test_rounding_happens_once_at_the_boundary() {
        // 1 hour at 33.333... keeps precision until rounded() is called.
        let rate = Decimal::from_str_exact("33.335").unwrap();
        let fee = quote(rate, 1, default_tax_rate(), Decimal::ZERO).unwrap();

        assert_eq!(fee.subtotal, rate);
        // Unrounded tax keeps more than two decimal places.
        assert_eq!(fee.tax, Decimal::from_str_exact("5.3336").unwrap());

        let rounded = fee.rounded();
        assert_eq!(rounded.tax, Decimal::from_str_exact("5.33").unwrap());
        assert_eq!(rounded.total, Decimal::from_str_exact("38.67").unwrap());
    }
}
