use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accrual::daycount::accrual_days;
use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::events::{replay_order, EventKind, LoanEvent};
use crate::state::LoanState;
use crate::types::InterestType;

/// sub-range of a period with constant principal and rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestSegment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
    pub principal: Money,
    pub rate: Rate,
    pub interest_type: InterestType,
    pub daily_interest: Money,
    pub amount: Money,
}

/// sub-range of a period with constant undrawn commitment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentFeeSegment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
    pub undrawn: Money,
    pub fee_rate: Rate,
    pub daily_fee: Money,
    pub amount: Money,
}

/// one drill-down row per calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAccrual {
    pub date: NaiveDate,
    pub principal: Money,
    pub rate: Rate,
    pub interest_type: InterestType,
    pub undrawn: Money,
    pub interest: Money,
    pub commitment_fee: Money,
}

/// events that change what an interest segment accrues on
fn splits_interest(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::PrincipalDraw { .. }
            | EventKind::PrincipalRepayment { .. }
            | EventKind::InterestRateSet { .. }
            | EventKind::InterestRateChange { .. }
            | EventKind::PikCapitalizationPosted { .. }
    )
}

/// events that change what a fee segment accrues on
fn splits_fee(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::PrincipalDraw { .. }
            | EventKind::PrincipalRepayment { .. }
            | EventKind::CommitmentSet { .. }
            | EventKind::CommitmentChange { .. }
            | EventKind::CommitmentCancel { .. }
    )
}

/// walk the ledger across `[start, end]`, closing a segment before every
/// splitting event and a final one at `end`.
///
/// Every approved event in the window is applied to the running state; only
/// events the `splits` predicate selects close the open segment. A segment
/// is valued from its basis, the state as of its opening date, so an event
/// outside the split set (a PIK fee invoice moving principal, a PIK flag
/// flip) surfaces in segments opened at the next split rather than mutating
/// the one already accruing. The open segment is closed at event date − 1,
/// so accrual is exact to the day of change. Zero-length closes are
/// skipped, which also covers events landing on the range start.
fn walk<S>(
    events: &[LoanEvent],
    start: NaiveDate,
    end: NaiveDate,
    terms: &LoanTerms,
    splits: impl Fn(&EventKind) -> bool,
    mut close: impl FnMut(&LoanState, NaiveDate, NaiveDate) -> Option<S>,
) -> Vec<S> {
    if end < start {
        return Vec::new();
    }

    let ordered = replay_order(events);
    let mut state = LoanState::opening(terms, start);
    let mut idx = 0;
    while idx < ordered.len() && ordered[idx].effective_date < start {
        state = state.applied(&ordered[idx].kind);
        idx += 1;
    }

    let mut segments = Vec::new();
    let mut cursor = start;
    let mut basis = state.clone();
    for event in &ordered[idx..] {
        if event.effective_date > end {
            break;
        }
        if splits(&event.kind) && event.effective_date > cursor {
            if let Some(segment) = close(&basis, cursor, event.effective_date - Duration::days(1))
            {
                segments.push(segment);
            }
            cursor = event.effective_date;
        }
        state = state.applied(&event.kind);
        // events up to the open segment's start date belong to its basis
        if event.effective_date <= cursor {
            basis = state.clone();
        }
    }

    if let Some(segment) = close(&basis, cursor, end) {
        segments.push(segment);
    }
    segments
}

/// interest segments partitioning `[start, end]`
pub fn interest_segments(
    events: &[LoanEvent],
    start: NaiveDate,
    end: NaiveDate,
    terms: &LoanTerms,
) -> Vec<InterestSegment> {
    walk(events, start, end, terms, splits_interest, |state, s, e| {
        let days = accrual_days(s, e);
        if days == 0 {
            return None;
        }
        let daily_interest = terms
            .day_count
            .daily_interest(state.outstanding_principal, state.current_rate);
        Some(InterestSegment {
            start: s,
            end: e,
            days,
            principal: state.outstanding_principal,
            rate: state.current_rate,
            interest_type: state.interest_type,
            daily_interest,
            amount: daily_interest * Decimal::from(days),
        })
    })
}

/// commitment-fee segments partitioning `[start, end]`
pub fn commitment_fee_segments(
    events: &[LoanEvent],
    start: NaiveDate,
    end: NaiveDate,
    terms: &LoanTerms,
) -> Vec<CommitmentFeeSegment> {
    walk(events, start, end, terms, splits_fee, |state, s, e| {
        let days = accrual_days(s, e);
        if days == 0 {
            return None;
        }
        let daily_fee = terms
            .day_count
            .daily_fee(state.undrawn_commitment, terms.commitment_fee_rate);
        Some(CommitmentFeeSegment {
            start: s,
            end: e,
            days,
            undrawn: state.undrawn_commitment,
            fee_rate: terms.commitment_fee_rate,
            daily_fee,
            amount: daily_fee * Decimal::from(days),
        })
    })
}

/// expand the two segment sets into one row per calendar day
pub fn daily_accruals(
    events: &[LoanEvent],
    start: NaiveDate,
    end: NaiveDate,
    terms: &LoanTerms,
) -> Vec<DailyAccrual> {
    let interest = interest_segments(events, start, end, terms);
    let fees = commitment_fee_segments(events, start, end, terms);
    expand_daily(&interest, &fees, start, end)
}

/// one row per day of `[start, end]` from segments already computed over
/// exactly that range
pub(crate) fn expand_daily(
    interest: &[InterestSegment],
    fees: &[CommitmentFeeSegment],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyAccrual> {
    if end < start || interest.is_empty() || fees.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::with_capacity(accrual_days(start, end) as usize);
    let mut i = 0;
    let mut f = 0;
    let mut day = start;
    while day <= end {
        while i + 1 < interest.len() && interest[i].end < day {
            i += 1;
        }
        while f + 1 < fees.len() && fees[f].end < day {
            f += 1;
        }
        let seg = &interest[i];
        let fee = &fees[f];
        rows.push(DailyAccrual {
            date: day,
            principal: seg.principal,
            rate: seg.rate,
            interest_type: seg.interest_type,
            undrawn: fee.undrawn,
            interest: seg.daily_interest,
            commitment_fee: fee.daily_fee,
        });
        day += Duration::days(1);
    }
    rows
}
