use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// day count convention for interest and fee calculations.
///
/// The divisor is per-loan configuration carried on `LoanTerms`; every
/// calculation site takes it as a parameter. Day counting itself is always
/// calendar days, no business-day adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayCountConvention {
    /// actual days / 360
    #[default]
    Actual360,
    /// actual days / 365
    Actual365,
}

impl DayCountConvention {
    /// annual divisor for converting an annual rate to a daily rate
    pub fn divisor(&self) -> Decimal {
        match self {
            DayCountConvention::Actual360 => Decimal::from(360),
            DayCountConvention::Actual365 => Decimal::from(365),
        }
    }

    /// interest earned by one day of outstanding principal
    pub fn daily_interest(&self, principal: Money, annual_rate: Rate) -> Money {
        Money::from_decimal(principal.as_decimal() * annual_rate.as_decimal() / self.divisor())
    }

    /// commitment fee earned by one day of undrawn commitment
    pub fn daily_fee(&self, undrawn: Money, annual_fee_rate: Rate) -> Money {
        Money::from_decimal(undrawn.as_decimal() * annual_fee_rate.as_decimal() / self.divisor())
    }
}

/// calendar days in the closed range `[start, end]`; each day accrues once.
///
/// Zero when `end` precedes `start`, so degenerate ranges produce no accrual
/// rather than an error.
pub fn accrual_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days() + 1;
    days.max(0) as u32
}
