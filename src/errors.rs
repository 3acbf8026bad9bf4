use thiserror::Error;

use crate::types::LoanId;

/// failures of the I/O-adjacent seams.
///
/// Pure accrual arithmetic is total and never returns these; only ledger
/// fetches, entry inserts, and job-record writes can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoanError {
    #[error("portfolio fetch failed: {message}")]
    PortfolioFetch { message: String },

    #[error("ledger fetch failed for loan {loan_id}: {message}")]
    LedgerFetch { loan_id: LoanId, message: String },

    #[error("accrual entry insert failed for loan {loan_id}: {message}")]
    EntryInsert { loan_id: LoanId, message: String },

    #[error("job run record could not be written: {message}")]
    JobRecord { message: String },
}

pub type Result<T> = std::result::Result<T, LoanError>;
