pub mod accrual;
pub mod batch;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod report;
pub mod state;
pub mod types;

// re-export key types
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{replay_order, EventKind, LoanEvent};
pub use state::{state_at, LoanState};
pub use accrual::{
    accrual_days, commitment_fee_segments, daily_accruals, interest_segments, period_accrual,
    summarize, ClosingPrincipal, CommitmentFeeSegment, DailyAccrual, DayCountConvention,
    InterestSegment, LoanSummary, PeriodAccrual,
};
pub use batch::{
    AccrualEntry, AccrualStore, BatchRunner, JobError, JobRun, JobStatus, Loan, LoanLedger,
    RunMode,
};
pub use config::{BatchConfig, LoanTerms};
pub use report::{LoanStatementView, PeriodStatementView};
pub use types::{
    find_period, EventId, EventStatus, FeePaymentType, InterestType, JobRunId, LoanId, Period,
    PeriodStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
