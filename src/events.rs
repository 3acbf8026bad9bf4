use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::{EventId, EventStatus, FeePaymentType, InterestType, LoanId};

/// all financial facts that can be recorded against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventKind {
    // principal events
    PrincipalDraw {
        amount: Money,
    },
    PrincipalRepayment {
        amount: Money,
    },
    PikCapitalizationPosted {
        amount: Money,
    },

    // rate events
    InterestRateSet {
        rate: Rate,
    },
    InterestRateChange {
        rate: Rate,
    },
    PikFlagSet {
        #[serde(default)]
        interest_type: InterestType,
    },

    // commitment events
    CommitmentSet {
        amount: Money,
    },
    CommitmentChange {
        amount: Money,
    },
    CommitmentCancel {
        amount: Money,
    },

    // cash-flow events
    CashReceived {
        amount: Money,
    },
    FeeInvoice {
        amount: Money,
        #[serde(default)]
        payment_type: FeePaymentType,
    },
}

/// immutable ledger fact; corrections are new offsetting events, never edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanEvent {
    pub id: EventId,
    pub loan_id: LoanId,
    pub effective_date: NaiveDate,
    pub status: EventStatus,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl LoanEvent {
    /// create an approved event
    pub fn approved(loan_id: LoanId, effective_date: NaiveDate, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            effective_date,
            status: EventStatus::Approved,
            kind,
        }
    }

    /// create a draft event; drafts never affect derived state
    pub fn draft(loan_id: LoanId, effective_date: NaiveDate, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            effective_date,
            status: EventStatus::Draft,
            kind,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == EventStatus::Approved
    }
}

/// approved events sorted ascending by effective date.
///
/// The sort is stable: same-date events keep their original ledger order,
/// which matters financially (a draw and a repayment on the same day must
/// apply in the order they were booked).
pub fn replay_order(events: &[LoanEvent]) -> Vec<&LoanEvent> {
    let mut approved: Vec<&LoanEvent> = events.iter().filter(|e| e.is_approved()).collect();
    approved.sort_by_key(|e| e.effective_date);
    approved
}
