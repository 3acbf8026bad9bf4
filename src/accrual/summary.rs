use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accrual::period::PeriodAccrual;
use crate::decimal::{Money, Rate};

/// lifetime totals and current position across every period of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoanSummary {
    pub total_interest: Money,
    pub total_cash_interest: Money,
    pub total_pik_interest: Money,
    pub total_commitment_fees: Money,
    pub total_due: Money,

    // closing position of the chronologically last period
    pub current_principal: Money,
    pub current_rate: Rate,
    pub current_undrawn: Money,
    pub total_commitment: Money,

    /// principal-day-weighted average rate across every interest segment
    pub average_rate: Rate,
}

/// roll period accruals up into a loan-level summary
pub fn summarize(accruals: &[PeriodAccrual]) -> LoanSummary {
    let mut summary = LoanSummary::default();

    let mut weighted_rate = Decimal::ZERO;
    let mut principal_days = Decimal::ZERO;

    for accrual in accruals {
        summary.total_interest += accrual.interest_accrued;
        summary.total_cash_interest += accrual.cash_interest_accrued;
        summary.total_pik_interest += accrual.pik_interest_accrued;
        summary.total_commitment_fees += accrual.commitment_fee_accrued;
        summary.total_due += accrual.total_due;

        for segment in &accrual.segments {
            let weight = segment.principal.as_decimal() * Decimal::from(segment.days);
            weighted_rate += segment.rate.as_decimal() * weight;
            principal_days += weight;
        }
    }

    if let Some(last) = accruals.iter().max_by_key(|a| a.period.end) {
        summary.current_principal = last.closing_principal.amount();
        summary.current_rate = last.closing_rate;
        summary.current_undrawn = last.closing_undrawn;
        summary.total_commitment = last.closing_commitment;
    }

    if !principal_days.is_zero() {
        summary.average_rate = Rate::from_decimal(weighted_rate / principal_days);
    }

    summary
}
