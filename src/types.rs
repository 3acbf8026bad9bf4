use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a ledger event
pub type EventId = Uuid;

/// unique identifier for a batch job run
pub type JobRunId = Uuid;

/// approval status of a ledger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// recorded but not yet approved; never affects derived state
    Draft,
    /// approved and immutable; participates in replay
    Approved,
}

/// how interest on a loan is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterestType {
    /// interest is billed and paid in cash each period
    #[default]
    CashPay,
    /// interest capitalizes into principal at period close
    Pik,
}

/// how an invoiced fee is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeePaymentType {
    /// fee is billed for cash payment
    #[default]
    Cash,
    /// fee is added to principal
    Pik,
}

/// lifecycle status of a billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Open,
    Submitted,
    Approved,
    Sent,
}

/// a calendar sub-range of a loan's life, the billing granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: PeriodStatus,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate, status: PeriodStatus) -> Self {
        Self { start, end, status }
    }

    /// check whether a date falls inside this period, endpoints inclusive
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// find the period covering a date; `None` when no period matches
pub fn find_period(periods: &[Period], date: NaiveDate) -> Option<&Period> {
    periods.iter().find(|p| p.contains(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_contains_endpoints() {
        let p = Period::new(date(2024, 1, 1), date(2024, 1, 31), PeriodStatus::Open);
        assert!(p.contains(date(2024, 1, 1)));
        assert!(p.contains(date(2024, 1, 31)));
        assert!(!p.contains(date(2024, 2, 1)));
        assert!(!p.contains(date(2023, 12, 31)));
    }

    #[test]
    fn test_find_period_unmatched_is_none() {
        let periods = vec![
            Period::new(date(2024, 1, 1), date(2024, 1, 31), PeriodStatus::Sent),
            Period::new(date(2024, 2, 1), date(2024, 2, 29), PeriodStatus::Open),
        ];

        let found = find_period(&periods, date(2024, 2, 15)).unwrap();
        assert_eq!(found.start, date(2024, 2, 1));

        assert!(find_period(&periods, date(2024, 3, 1)).is_none());
    }
}
