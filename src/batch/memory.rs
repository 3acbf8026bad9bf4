use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::batch::{AccrualEntry, AccrualStore, JobRun, Loan, LoanLedger};
use crate::errors::Result;
use crate::events::LoanEvent;
use crate::types::LoanId;

/// in-memory portfolio for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    loans: Vec<Loan>,
    events: HashMap<LoanId, Vec<LoanEvent>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_loan(&mut self, loan: Loan, events: Vec<LoanEvent>) {
        self.events.insert(loan.id, events);
        self.loans.push(loan);
    }
}

impl LoanLedger for InMemoryLedger {
    fn active_loans(&self) -> Result<Vec<Loan>> {
        Ok(self.loans.clone())
    }

    fn approved_events(&self, loan_id: LoanId) -> Result<Vec<LoanEvent>> {
        let events = self
            .events
            .get(&loan_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.is_approved())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(events)
    }
}

/// in-memory accrual store for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<Vec<AccrualEntry>>,
    runs: Mutex<Vec<JobRun>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// snapshot of all persisted entries
    pub fn entries(&self) -> Vec<AccrualEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// snapshot of all job-run records
    pub fn runs(&self) -> Vec<JobRun> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AccrualStore for InMemoryStore {
    fn existing_entry_dates(&self, loan_id: LoanId) -> Result<HashSet<NaiveDate>> {
        let dates = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.loan_id == loan_id)
            .map(|e| e.entry_date)
            .collect();
        Ok(dates)
    }

    fn insert_entries(&self, entries: &[AccrualEntry]) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(entries);
        Ok(())
    }

    fn create_job_run(&self, run: &JobRun) -> Result<()> {
        self.runs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(run.clone());
        Ok(())
    }

    fn update_job_run(&self, run: &JobRun) -> Result<()> {
        let mut runs = self.runs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = runs.iter_mut().find(|r| r.id == run.id) {
            *existing = run.clone();
        } else {
            runs.push(run.clone());
        }
        Ok(())
    }
}
