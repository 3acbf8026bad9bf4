/// serializable statement views for reporting consumers
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accrual::{LoanSummary, PeriodAccrual};
use crate::decimal::{Money, Rate};
use crate::types::PeriodStatus;

/// flattened view of one period's accrual report
#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodStatementView {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub period_status: PeriodStatus,
    pub opening_principal: Money,
    pub drawn: Money,
    pub repaid: Money,
    pub pik_capitalized: Money,
    pub fees_invoiced: Money,
    pub interest_accrued: Money,
    pub cash_interest_accrued: Money,
    pub pik_interest_accrued: Money,
    pub commitment_fee_accrued: Money,
    pub total_due: Money,
    pub closing_principal: Money,
    /// true when the closing balance anticipates an unposted capitalization
    pub closing_principal_projected: bool,
    pub closing_undrawn: Money,
    pub segment_count: usize,
}

impl PeriodStatementView {
    pub fn from_accrual(accrual: &PeriodAccrual) -> Self {
        PeriodStatementView {
            period_start: accrual.period.start,
            period_end: accrual.period.end,
            period_status: accrual.period.status,
            opening_principal: accrual.opening_principal,
            drawn: accrual.drawn,
            repaid: accrual.repaid,
            pik_capitalized: accrual.pik_capitalized,
            fees_invoiced: accrual.fees_invoiced,
            interest_accrued: accrual.interest_accrued,
            cash_interest_accrued: accrual.cash_interest_accrued,
            pik_interest_accrued: accrual.pik_interest_accrued,
            commitment_fee_accrued: accrual.commitment_fee_accrued,
            total_due: accrual.total_due,
            closing_principal: accrual.closing_principal.amount(),
            closing_principal_projected: accrual.closing_principal.is_projected(),
            closing_undrawn: accrual.closing_undrawn,
            segment_count: accrual.segments.len(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// loan-level statement: lifetime position plus per-period lines
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanStatementView {
    pub current_principal: Money,
    pub current_rate: Rate,
    pub current_undrawn: Money,
    pub total_commitment: Money,
    pub average_rate: Rate,
    pub total_interest: Money,
    pub total_commitment_fees: Money,
    pub total_due: Money,
    pub periods: Vec<PeriodStatementView>,
}

impl LoanStatementView {
    pub fn from_parts(summary: &LoanSummary, accruals: &[PeriodAccrual]) -> Self {
        LoanStatementView {
            current_principal: summary.current_principal,
            current_rate: summary.current_rate,
            current_undrawn: summary.current_undrawn,
            total_commitment: summary.total_commitment,
            average_rate: summary.average_rate,
            total_interest: summary.total_interest,
            total_commitment_fees: summary.total_commitment_fees,
            total_due: summary.total_due,
            periods: accruals.iter().map(PeriodStatementView::from_accrual).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
