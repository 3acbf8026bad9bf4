pub mod memory;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::accrual::{daily_accruals, DailyAccrual};
use crate::config::{BatchConfig, LoanTerms};
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::LoanEvent;
use crate::types::{InterestType, JobRunId, LoanId};

/// an active loan as handed over by the portfolio source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub terms: LoanTerms,
}

/// persisted daily accrual artifact, one row per (loan, date).
///
/// Once written a row is never overwritten; recomputation skips dates that
/// already exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualEntry {
    pub id: Uuid,
    pub loan_id: LoanId,
    pub entry_date: NaiveDate,
    pub outstanding_principal: Money,
    pub interest_rate: Rate,
    pub interest_type: InterestType,
    pub undrawn_commitment: Money,
    pub interest_accrued: Money,
    pub commitment_fee_accrued: Money,
}

impl AccrualEntry {
    fn from_daily(loan_id: LoanId, row: DailyAccrual) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            entry_date: row.date,
            outstanding_principal: row.principal,
            interest_rate: row.rate,
            interest_type: row.interest_type,
            undrawn_commitment: row.undrawn,
            interest_accrued: row.interest,
            commitment_fee_accrued: row.commitment_fee,
        }
    }
}

/// which dates a batch run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunMode {
    /// one calendar day for every active loan
    SingleDate { date: NaiveDate },
    /// an explicit closed date range
    DateRange { start: NaiveDate, end: NaiveDate },
    /// per loan, from min(loan start, earliest approved event) through `through`
    Backfill { through: NaiveDate },
}

/// lifecycle of a job-run record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// one recorded loan failure on a job run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    pub loan_id: LoanId,
    pub message: String,
}

/// durable record of one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    pub id: JobRunId,
    pub mode: RunMode,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub processed_count: u64,
    pub skipped_count: u64,
    pub error_count: u64,
    /// capped at `BatchConfig::max_recorded_errors`; `error_count` is not
    pub error_details: Vec<JobError>,
    pub failure: Option<String>,
}

impl JobRun {
    fn started(mode: RunMode, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            status: JobStatus::Running,
            started_at,
            finished_at: None,
            processed_count: 0,
            skipped_count: 0,
            error_count: 0,
            error_details: Vec::new(),
            failure: None,
        }
    }
}

/// read seam to the servicing system
pub trait LoanLedger: Sync {
    /// loans the daily batch should cover
    fn active_loans(&self) -> Result<Vec<Loan>>;
    /// approved events for one loan; drafts stay behind this boundary
    fn approved_events(&self, loan_id: LoanId) -> Result<Vec<LoanEvent>>;
}

/// write seam to the accrual store
pub trait AccrualStore: Sync {
    /// dates already persisted for a loan, for the idempotency check
    fn existing_entry_dates(&self, loan_id: LoanId) -> Result<HashSet<NaiveDate>>;
    fn insert_entries(&self, entries: &[AccrualEntry]) -> Result<()>;
    fn create_job_run(&self, run: &JobRun) -> Result<()>;
    fn update_job_run(&self, run: &JobRun) -> Result<()>;
}

/// what one loan's unit of work came to
enum LoanOutcome {
    Done { written: u64, skipped: u64 },
    Failed { written: u64, error: LoanError },
}

/// daily accrual batch over a loan portfolio.
///
/// Loans are independent, so units fan out across the rayon pool; the
/// supervisor owns every counter and aggregates typed outcomes after the
/// fan-out. One loan's failure never aborts its siblings.
pub struct BatchRunner<'a, L, S> {
    ledger: &'a L,
    store: &'a S,
    config: BatchConfig,
    time: &'a SafeTimeProvider,
}

impl<'a, L: LoanLedger, S: AccrualStore> BatchRunner<'a, L, S> {
    pub fn new(ledger: &'a L, store: &'a S, time: &'a SafeTimeProvider) -> Self {
        Self {
            ledger,
            store,
            config: BatchConfig::default(),
            time,
        }
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// execute one batch run and return its job record.
    ///
    /// Partial success is the normal outcome: per-loan failures are counted
    /// and recorded on the run, and only an error outside the per-loan
    /// units (portfolio fetch, job-record write) marks the run `Failed`.
    pub fn run(&self, mode: RunMode) -> Result<JobRun> {
        let mut run = JobRun::started(mode, self.time.now());
        self.store.create_job_run(&run)?;
        info!(job_run = %run.id, ?mode, "accrual batch started");

        match self.ledger.active_loans() {
            Ok(loans) => {
                let ledger = self.ledger;
                let store = self.store;
                let config = self.config;
                let outcomes: Vec<(LoanId, LoanOutcome)> = loans
                    .par_iter()
                    .map(|loan| (loan.id, process_loan(ledger, store, &config, loan, &mode)))
                    .collect();

                for (loan_id, outcome) in outcomes {
                    match outcome {
                        LoanOutcome::Done { written, skipped } => {
                            run.processed_count += written;
                            run.skipped_count += skipped;
                        }
                        LoanOutcome::Failed { written, error } => {
                            warn!(loan = %loan_id, %error, "loan accrual unit failed");
                            run.processed_count += written;
                            run.error_count += 1;
                            if run.error_details.len() < self.config.max_recorded_errors {
                                run.error_details.push(JobError {
                                    loan_id,
                                    message: error.to_string(),
                                });
                            }
                        }
                    }
                }
                run.status = JobStatus::Completed;
            }
            Err(error) => {
                warn!(job_run = %run.id, %error, "accrual batch failed");
                run.status = JobStatus::Failed;
                run.failure = Some(error.to_string());
            }
        }

        run.finished_at = Some(self.time.now());
        self.store.update_job_run(&run)?;
        info!(
            job_run = %run.id,
            processed = run.processed_count,
            skipped = run.skipped_count,
            errors = run.error_count,
            "accrual batch finished"
        );
        Ok(run)
    }
}

/// one loan's unit: fetch, compute, filter already-written dates, insert in
/// chunks. Any failure stops this loan only; chunks already inserted stay.
fn process_loan<L: LoanLedger, S: AccrualStore>(
    ledger: &L,
    store: &S,
    config: &BatchConfig,
    loan: &Loan,
    mode: &RunMode,
) -> LoanOutcome {
    let events = match ledger.approved_events(loan.id) {
        Ok(events) => events,
        Err(error) => return LoanOutcome::Failed { written: 0, error },
    };
    let existing = match store.existing_entry_dates(loan.id) {
        Ok(existing) => existing,
        Err(error) => return LoanOutcome::Failed { written: 0, error },
    };

    let (start, end) = window(loan, &events, mode);
    let mut skipped = 0u64;
    let entries: Vec<AccrualEntry> = daily_accruals(&events, start, end, &loan.terms)
        .into_iter()
        .filter(|row| {
            if existing.contains(&row.date) {
                skipped += 1;
                false
            } else {
                true
            }
        })
        .map(|row| AccrualEntry::from_daily(loan.id, row))
        .collect();

    let mut written = 0u64;
    for chunk in entries.chunks(config.chunk_size.max(1)) {
        if let Err(error) = store.insert_entries(chunk) {
            return LoanOutcome::Failed { written, error };
        }
        written += chunk.len() as u64;
    }
    LoanOutcome::Done { written, skipped }
}

/// the date window a mode asks for, per loan
fn window(loan: &Loan, events: &[LoanEvent], mode: &RunMode) -> (NaiveDate, NaiveDate) {
    match mode {
        RunMode::SingleDate { date } => (*date, *date),
        RunMode::DateRange { start, end } => (*start, *end),
        RunMode::Backfill { through } => {
            let start = events
                .iter()
                .map(|e| e.effective_date)
                .min()
                .map_or(loan.terms.loan_start_date, |earliest| {
                    earliest.min(loan.terms.loan_start_date)
                });
            (start, *through)
        }
    }
}
