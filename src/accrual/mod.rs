pub mod daycount;
pub mod period;
pub mod segments;
pub mod summary;

pub use daycount::{accrual_days, DayCountConvention};
pub use period::{period_accrual, ClosingPrincipal, PeriodAccrual};
pub use segments::{
    commitment_fee_segments, daily_accruals, interest_segments, CommitmentFeeSegment,
    DailyAccrual, InterestSegment,
};
pub use summary::{summarize, LoanSummary};
