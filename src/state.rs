use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::events::{replay_order, EventKind, LoanEvent};
use crate::types::{FeePaymentType, InterestType};

/// point-in-time loan state, derived by replay and never stored as truth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    pub as_of: NaiveDate,
    pub outstanding_principal: Money,
    pub current_rate: Rate,
    pub interest_type: InterestType,
    pub total_commitment: Money,
    pub undrawn_commitment: Money,
}

impl LoanState {
    /// state before any event has applied
    pub fn opening(terms: &LoanTerms, as_of: NaiveDate) -> Self {
        Self {
            as_of,
            outstanding_principal: Money::ZERO,
            current_rate: Rate::ZERO,
            interest_type: terms.interest_type,
            total_commitment: terms.total_commitment,
            undrawn_commitment: terms.total_commitment.floor_zero(),
        }
    }

    /// apply one event, returning the successor state.
    ///
    /// Pure transition: the input state is untouched. Amounts are taken
    /// as recorded; validation belongs to the system that approves events.
    pub fn applied(&self, kind: &EventKind) -> LoanState {
        let mut next = self.clone();

        match kind {
            EventKind::PrincipalDraw { amount } => {
                next.outstanding_principal += *amount;
            }
            EventKind::PrincipalRepayment { amount } => {
                next.outstanding_principal =
                    (next.outstanding_principal - *amount).floor_zero();
            }
            EventKind::PikCapitalizationPosted { amount } => {
                next.outstanding_principal += *amount;
            }
            EventKind::InterestRateSet { rate } | EventKind::InterestRateChange { rate } => {
                next.current_rate = *rate;
            }
            EventKind::PikFlagSet { interest_type } => {
                next.interest_type = *interest_type;
            }
            EventKind::CommitmentSet { amount } => {
                next.total_commitment = *amount;
            }
            EventKind::CommitmentChange { amount } => {
                next.total_commitment += *amount;
            }
            EventKind::CommitmentCancel { amount } => {
                next.total_commitment = (next.total_commitment - *amount).floor_zero();
            }
            EventKind::FeeInvoice {
                amount,
                payment_type,
            } => {
                if *payment_type == FeePaymentType::Pik {
                    next.outstanding_principal += *amount;
                }
            }
            // cash receipts are cash-flow records with no state effect
            EventKind::CashReceived { .. } => {}
        }

        next.outstanding_principal = next.outstanding_principal.floor_zero();
        next.total_commitment = next.total_commitment.floor_zero();
        next.undrawn_commitment =
            (next.total_commitment - next.outstanding_principal).floor_zero();
        next
    }
}

/// replay the ledger to the state as of `target`.
///
/// Only approved events participate; events dated after `target` are
/// excluded, events dated exactly on `target` are included.
pub fn state_at(events: &[LoanEvent], target: NaiveDate, terms: &LoanTerms) -> LoanState {
    let mut state = LoanState::opening(terms, target);
    for event in replay_order(events) {
        if event.effective_date > target {
            break;
        }
        state = state.applied(&event.kind);
    }
    state
}
