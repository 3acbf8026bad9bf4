use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accrual::DayCountConvention;
use crate::decimal::{Money, Rate};
use crate::types::InterestType;

/// per-loan metadata consumed from the servicing system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub total_commitment: Money,
    pub commitment_fee_rate: Rate,
    pub interest_type: InterestType,
    pub loan_start_date: NaiveDate,
    /// day-count convention for every interest and fee calculation on this
    /// loan; exactly one divisor per loan, never a hidden constant
    pub day_count: DayCountConvention,
}

impl LoanTerms {
    pub fn new(
        total_commitment: Money,
        commitment_fee_rate: Rate,
        interest_type: InterestType,
        loan_start_date: NaiveDate,
    ) -> Self {
        Self {
            total_commitment,
            commitment_fee_rate,
            interest_type,
            loan_start_date,
            day_count: DayCountConvention::default(),
        }
    }

    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }
}

/// batch orchestrator tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// accrual entries per insert call, bounded by backend insert limits
    pub chunk_size: usize,
    /// error details kept on the job record; the error count is uncapped
    pub max_recorded_errors: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            max_recorded_errors: 25,
        }
    }
}
