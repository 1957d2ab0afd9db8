//! Late-fee derivation for common-expense periods
//!
//! For a period billed at `base_fee`:
//! - due date is `rules.due_day` of the following month
//! - on or before the due date nothing accrues and the debt is the base fee
//! - after it, months overdue = month difference between the evaluation date
//!   and the due date, plus one when the evaluation day is past the due day,
//!   never less than one
//! - interest = base_fee * TIMC / 100 / 12 (single month, simple)
//! - penalty = base_fee * penalty_fraction * months overdue
//!
//! Everything here is a pure function of its inputs.

use crate::error::{ArrearsError, Result};
use crate::payments::{PaymentRecord, Period};
use crate::schedule::{BillingRules, InterestRateTable};
use super::ledger::{LedgerEntry, LedgerStatus};
use chrono::{Datelike, NaiveDate};
use log::debug;

/// Float noise below this is treated as an exact settlement
pub const SETTLEMENT_TOLERANCE: f64 = 1e-6;

/// Months overdue between a due date and an evaluation date
///
/// Returns 0 when `on <= due`. Otherwise counts calendar months from the due
/// month, adds one once `on.day() >= rollover_day`, and floors at 1.
pub fn months_overdue(due: NaiveDate, on: NaiveDate, rollover_day: u32) -> u32 {
    if on <= due {
        return 0;
    }

    let raw = (on.year() as i64 - due.year() as i64) * 12 + (on.month() as i64 - due.month() as i64);
    let adjusted = if on.day() >= rollover_day { raw + 1 } else { raw };

    adjusted.max(1) as u32
}

/// Stateless arrears calculator configured with billing rules
#[derive(Debug, Clone)]
pub struct ArrearsCalculator {
    rules: BillingRules,
}

impl Default for ArrearsCalculator {
    fn default() -> Self {
        Self { rules: BillingRules::default() }
    }
}

impl ArrearsCalculator {
    pub fn new(rules: BillingRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &BillingRules {
        &self.rules
    }

    pub fn due_date(&self, period: Period) -> Result<NaiveDate> {
        period.due_date(self.rules.due_day)
    }

    /// Derive the ledger entry for one unit and period evaluated on `on`
    ///
    /// With `amount_paid` the entry is Paid or PartialPayment. Without it the
    /// period is Pending until the due date passes, Delinquent afterwards.
    pub fn assess(
        &self,
        unit: &str,
        base_fee: f64,
        period: Period,
        on: NaiveDate,
        rates: &InterestRateTable,
        amount_paid: Option<f64>,
    ) -> Result<LedgerEntry> {
        if !base_fee.is_finite() || base_fee < 0.0 {
            return Err(ArrearsError::invalid(format!(
                "base fee for unit {:?} must be a non-negative number, got {}",
                unit, base_fee
            )));
        }
        if let Some(paid) = amount_paid {
            if !paid.is_finite() || paid < 0.0 {
                return Err(ArrearsError::invalid(format!(
                    "amount paid by unit {:?} must be a non-negative number, got {}",
                    unit, paid
                )));
            }
        }

        let due_date = self.due_date(period)?;
        let months = months_overdue(due_date, on, self.rules.rollover_day());

        let (rate_percent, interest, penalty) = if months == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let rate = rates.rate_for(period);
            if !rate.is_finite() || rate < 0.0 {
                return Err(ArrearsError::invalid(format!(
                    "TIMC for {} must be a non-negative number, got {}",
                    period, rate
                )));
            }
            let interest = base_fee * (rate / 100.0) / 12.0;
            let penalty = base_fee * self.rules.penalty_fraction * months as f64;
            (rate, interest, penalty)
        };
        let debt = base_fee + interest + penalty;

        let (balance, pending_debt, status) = match amount_paid {
            Some(paid) => {
                let mut balance = paid - debt;
                if balance.abs() < SETTLEMENT_TOLERANCE {
                    balance = 0.0;
                }
                if balance >= 0.0 {
                    (balance, 0.0, LedgerStatus::Paid)
                } else {
                    (balance, -balance, LedgerStatus::PartialPayment)
                }
            }
            None if months > 0 => (-debt, debt, LedgerStatus::Delinquent),
            None => (-debt, 0.0, LedgerStatus::Pending),
        };

        debug!(
            "unit={} period={} on={} months_overdue={} debt={:.2} status={}",
            unit, period, on, months, debt, status
        );

        Ok(LedgerEntry {
            unit: unit.to_string(),
            period,
            due_date,
            evaluated_on: on,
            base_fee,
            amount_paid,
            method: None,
            months_overdue: months,
            rate_percent,
            interest,
            penalty,
            debt,
            balance,
            pending_debt,
            status,
        })
    }

    /// Evaluate a recorded payment against the unit's base fee
    pub fn evaluate_payment(
        &self,
        record: &PaymentRecord,
        base_fee: f64,
        rates: &InterestRateTable,
    ) -> Result<LedgerEntry> {
        let mut entry = self.assess(
            &record.unit,
            base_fee,
            record.period,
            record.payment_date,
            rates,
            Some(record.amount_paid),
        )?;
        entry.method = Some(record.method.clone());
        Ok(entry)
    }

    /// Evaluate a further payment against a period `prior` already covers
    ///
    /// Once the period is settled the money only adds to its credit. Otherwise
    /// the period is reassessed on the new payment date against everything
    /// paid so far, so the entry shows what is still owed after this record.
    pub fn evaluate_followup(
        &self,
        record: &PaymentRecord,
        prior: &LedgerEntry,
        base_fee: f64,
        rates: &InterestRateTable,
    ) -> Result<LedgerEntry> {
        if prior.period != record.period {
            return Err(ArrearsError::invalid(format!(
                "payment for {} cannot follow an entry for {}",
                record.period, prior.period
            )));
        }

        let mut entry = if prior.status == LedgerStatus::Paid {
            if !record.amount_paid.is_finite() || record.amount_paid < 0.0 {
                return Err(ArrearsError::invalid(format!(
                    "amount paid by unit {:?} must be a non-negative number, got {}",
                    record.unit, record.amount_paid
                )));
            }
            let mut entry = prior.clone();
            entry.evaluated_on = record.payment_date;
            entry.balance = prior.balance + record.amount_paid;
            entry
        } else {
            // balance = paid - debt, so this recovers what was paid before
            let paid_before = prior.debt + prior.balance;
            self.assess(
                &record.unit,
                base_fee,
                record.period,
                record.payment_date,
                rates,
                Some(paid_before + record.amount_paid),
            )?
        };
        entry.amount_paid = Some(record.amount_paid);
        entry.method = Some(record.method.clone());
        Ok(entry)
    }

    /// Evaluate several payments for one unit and period, in the given order
    ///
    /// Each record settles what the earlier ones left owing, so the last
    /// entry carries the period's final balance.
    pub fn evaluate_installments<'a, I>(
        &self,
        records: I,
        base_fee: f64,
        rates: &InterestRateTable,
    ) -> Result<Vec<LedgerEntry>>
    where
        I: IntoIterator<Item = &'a PaymentRecord>,
    {
        let mut entries: Vec<LedgerEntry> = Vec::new();
        for record in records {
            let entry = match entries.last() {
                Some(prior) => self.evaluate_followup(record, prior, base_fee, rates)?,
                None => self.evaluate_payment(record, base_fee, rates)?,
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Virtual entry for a period with no payment, as of `as_of`
    pub fn preview(
        &self,
        unit: &str,
        base_fee: f64,
        period: Period,
        as_of: NaiveDate,
        rates: &InterestRateTable,
    ) -> Result<LedgerEntry> {
        self.assess(unit, base_fee, period, as_of, rates, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::PaymentMethod;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january_2024() -> Period {
        Period::from_month_index(2024, 0).unwrap()
    }

    /// TIMC of 24% on January 2024, the period due 2024-02-10
    fn rates_24() -> InterestRateTable {
        InterestRateTable::from_entries(vec![(2024, 1, 24.0)])
    }

    #[test]
    fn test_late_payment_scenario() {
        let calc = ArrearsCalculator::default();
        let entry = calc
            .assess("12", 40_000.0, january_2024(), date(2024, 4, 15), &rates_24(), None)
            .unwrap();

        assert_eq!(entry.due_date, date(2024, 2, 10));
        // Feb -> Apr is 2 months, day 15 >= 11 adds one
        assert_eq!(entry.months_overdue, 3);
        assert_relative_eq!(entry.interest, 800.0, epsilon = 1e-9);
        assert_relative_eq!(entry.penalty, 30_000.0, epsilon = 1e-9);
        assert_relative_eq!(entry.debt, 70_800.0, epsilon = 1e-9);
        assert_eq!(entry.status, LedgerStatus::Delinquent);
        assert_relative_eq!(entry.pending_debt, 70_800.0, epsilon = 1e-9);
        assert_relative_eq!(entry.balance, -70_800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_payment_settles() {
        let calc = ArrearsCalculator::default();
        let entry = calc
            .assess("12", 40_000.0, january_2024(), date(2024, 4, 15), &rates_24(), Some(70_800.0))
            .unwrap();

        assert_abs_diff_eq!(entry.balance, 0.0);
        assert_eq!(entry.status, LedgerStatus::Paid);
        assert_abs_diff_eq!(entry.pending_debt, 0.0);
    }

    #[test]
    fn test_partial_payment() {
        let calc = ArrearsCalculator::default();
        let entry = calc
            .assess("12", 40_000.0, january_2024(), date(2024, 4, 15), &rates_24(), Some(50_000.0))
            .unwrap();

        assert_relative_eq!(entry.balance, -20_800.0, epsilon = 1e-9);
        assert_eq!(entry.status, LedgerStatus::PartialPayment);
        assert_relative_eq!(entry.pending_debt, 20_800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overpayment_leaves_credit() {
        let calc = ArrearsCalculator::default();
        let entry = calc
            .assess("12", 40_000.0, january_2024(), date(2024, 2, 1), &rates_24(), Some(45_000.0))
            .unwrap();

        assert_eq!(entry.status, LedgerStatus::Paid);
        assert_relative_eq!(entry.credit(), 5_000.0);
        assert_abs_diff_eq!(entry.pending_debt, 0.0);
    }

    #[test]
    fn test_on_due_date_is_on_time() {
        let calc = ArrearsCalculator::default();
        for on in [date(2024, 1, 20), date(2024, 2, 1), date(2024, 2, 10)] {
            let entry = calc
                .assess("12", 40_000.0, january_2024(), on, &rates_24(), Some(40_000.0))
                .unwrap();
            assert_eq!(entry.months_overdue, 0, "on {}", on);
            assert_eq!(entry.interest, 0.0);
            assert_eq!(entry.penalty, 0.0);
            assert_eq!(entry.rate_percent, 0.0);
            assert_eq!(entry.debt, 40_000.0);
            assert_eq!(entry.balance, 0.0);
            assert_eq!(entry.status, LedgerStatus::Paid);
        }
    }

    #[test]
    fn test_unpaid_before_due_is_pending() {
        let calc = ArrearsCalculator::default();
        let entry = calc
            .preview("12", 40_000.0, january_2024(), date(2024, 2, 10), &rates_24())
            .unwrap();
        assert_eq!(entry.status, LedgerStatus::Pending);
        assert_eq!(entry.debt, 40_000.0);
        assert_eq!(entry.pending_debt, 0.0);
    }

    #[test]
    fn test_day_eleven_boundary() {
        let due = date(2024, 2, 10);
        assert_eq!(months_overdue(due, date(2024, 2, 11), 11), 1);
        assert_eq!(months_overdue(due, date(2024, 3, 10), 11), 1);
        assert_eq!(months_overdue(due, date(2024, 3, 11), 11), 2);
        assert_eq!(months_overdue(due, due, 11), 0);
        assert_eq!(months_overdue(due, date(2024, 1, 31), 11), 0);
    }

    #[test]
    fn test_months_overdue_across_years() {
        let due = date(2024, 1, 10); // December 2023 period
        assert_eq!(months_overdue(due, date(2025, 1, 10), 11), 12);
        assert_eq!(months_overdue(due, date(2025, 1, 11), 11), 13);
    }

    #[test]
    fn test_any_lateness_counts_at_least_one_month() {
        let due = date(2024, 2, 10);
        for day in 11..=29 {
            assert!(months_overdue(due, date(2024, 2, day), 11) >= 1);
        }
        for day in 1..=10 {
            assert_eq!(months_overdue(due, date(2024, 3, day), 11), 1);
        }
    }

    #[test]
    fn test_missing_rate_means_no_interest() {
        let calc = ArrearsCalculator::default();
        let empty = InterestRateTable::new();
        let entry = calc
            .preview("12", 40_000.0, january_2024(), date(2024, 4, 15), &empty)
            .unwrap();

        assert_eq!(entry.months_overdue, 3);
        assert_eq!(entry.interest, 0.0);
        assert_relative_eq!(entry.debt, 70_000.0);
    }

    #[test]
    fn test_rate_is_looked_up_by_billed_period() {
        let calc = ArrearsCalculator::default();
        // A rate on the due month does not apply to January's bill
        let rates = InterestRateTable::from_entries(vec![(2024, 2, 24.0)]);
        let entry = calc
            .preview("12", 40_000.0, january_2024(), date(2024, 4, 15), &rates)
            .unwrap();
        assert_eq!(entry.interest, 0.0);

        let february = Period::new(2024, 2).unwrap();
        let entry = calc.preview("12", 40_000.0, february, date(2024, 4, 15), &rates).unwrap();
        // Due 2024-03-10, evaluated 2024-04-15: 1 month + day rule = 2
        assert_eq!(entry.months_overdue, 2);
        assert_relative_eq!(entry.interest, 800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_debt_identity_when_late() {
        let calc = ArrearsCalculator::default();
        let rates = InterestRateTable::from_entries(vec![(2024, 1, 37.5)]);
        for month in 2..=12 {
            let entry = calc
                .preview("5", 33_333.0, january_2024(), date(2024, month, 20), &rates)
                .unwrap();
            assert!(entry.months_overdue >= 1);
            assert_relative_eq!(entry.debt, entry.base_fee + entry.interest + entry.penalty);
        }
    }

    #[test]
    fn test_idempotent() {
        let calc = ArrearsCalculator::default();
        let a = calc
            .assess("12", 40_000.0, january_2024(), date(2024, 7, 3), &rates_24(), Some(12_345.0))
            .unwrap();
        let b = calc
            .assess("12", 40_000.0, january_2024(), date(2024, 7, 3), &rates_24(), Some(12_345.0))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_evaluate_payment_record() {
        let calc = ArrearsCalculator::default();
        let record = PaymentRecord::new(
            "12",
            january_2024(),
            date(2024, 4, 15),
            50_000.0,
            PaymentMethod::Check,
        );
        let entry = calc.evaluate_payment(&record, 40_000.0, &rates_24()).unwrap();
        assert_eq!(entry.unit, "12");
        assert_eq!(entry.method, Some(PaymentMethod::Check));
        assert_eq!(entry.amount_paid, Some(50_000.0));
        assert_eq!(entry.status, LedgerStatus::PartialPayment);
    }

    #[test]
    fn test_split_payment_settles_period() {
        let calc = ArrearsCalculator::default();
        let first = PaymentRecord::new("12", january_2024(), date(2024, 4, 15), 50_000.0, PaymentMethod::Cash);
        let second = PaymentRecord::new("12", january_2024(), date(2024, 4, 15), 20_800.0, PaymentMethod::Transfer);

        let entries = calc.evaluate_installments([&first, &second], 40_000.0, &rates_24()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, LedgerStatus::PartialPayment);
        assert_relative_eq!(entries[0].pending_debt, 20_800.0, epsilon = 1e-9);

        let last = &entries[1];
        assert_eq!(last.status, LedgerStatus::Paid);
        assert_eq!(last.amount_paid, Some(20_800.0));
        assert_eq!(last.method, Some(PaymentMethod::Transfer));
        assert_abs_diff_eq!(last.balance, 0.0);
        assert_abs_diff_eq!(last.pending_debt, 0.0);
    }

    #[test]
    fn test_followup_reassesses_on_later_date() {
        let calc = ArrearsCalculator::default();
        // Due 2024-02-10: two months late on 04-05, three on 04-15
        let early = PaymentRecord::new("12", january_2024(), date(2024, 4, 5), 50_000.0, PaymentMethod::Cash);
        let late = PaymentRecord::new("12", january_2024(), date(2024, 4, 15), 10_000.0, PaymentMethod::Cash);

        let entries = calc.evaluate_installments([&early, &late], 40_000.0, &rates_24()).unwrap();
        assert_relative_eq!(entries[0].debt, 60_800.0, epsilon = 1e-9);
        assert_relative_eq!(entries[0].pending_debt, 10_800.0, epsilon = 1e-9);

        assert_eq!(entries[1].months_overdue, 3);
        assert_relative_eq!(entries[1].debt, 70_800.0, epsilon = 1e-9);
        assert_eq!(entries[1].status, LedgerStatus::PartialPayment);
        assert_relative_eq!(entries[1].pending_debt, 10_800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_payment_after_settlement_adds_credit() {
        let calc = ArrearsCalculator::default();
        let on_time = PaymentRecord::new("3", january_2024(), date(2024, 2, 1), 40_000.0, PaymentMethod::Cash);
        let extra = PaymentRecord::new("3", january_2024(), date(2024, 5, 20), 5_000.0, PaymentMethod::Cash);

        let entries = calc.evaluate_installments([&on_time, &extra], 40_000.0, &rates_24()).unwrap();
        let last = &entries[1];
        assert_eq!(last.status, LedgerStatus::Paid);
        assert_eq!(last.months_overdue, 0);
        assert_eq!(last.evaluated_on, date(2024, 5, 20));
        assert_relative_eq!(last.credit(), 5_000.0);

        let other = PaymentRecord::new("3", Period::new(2024, 2).unwrap(), date(2024, 3, 1), 1.0, PaymentMethod::Cash);
        assert!(calc.evaluate_followup(&other, last, 40_000.0, &rates_24()).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let calc = ArrearsCalculator::default();
        let on = date(2024, 4, 15);
        let rates = rates_24();

        assert!(matches!(
            calc.assess("1", -1.0, january_2024(), on, &rates, None),
            Err(ArrearsError::InvalidInput(_))
        ));
        assert!(calc.assess("1", f64::NAN, january_2024(), on, &rates, None).is_err());
        assert!(calc.assess("1", 40_000.0, january_2024(), on, &rates, Some(-5.0)).is_err());

        assert!(Period::new(2024, 13).is_err());

        let negative_rate = InterestRateTable::from_entries(vec![(2024, 1, -3.0)]);
        assert!(calc.assess("1", 40_000.0, january_2024(), on, &negative_rate, None).is_err());
    }

    #[test]
    fn test_custom_rules() {
        let rules = BillingRules { due_day: 5, penalty_fraction: 0.1 };
        let calc = ArrearsCalculator::new(rules).unwrap();
        let entry = calc
            .preview("12", 10_000.0, january_2024(), date(2024, 2, 6), &InterestRateTable::new())
            .unwrap();
        assert_eq!(entry.due_date, date(2024, 2, 5));
        assert_eq!(entry.months_overdue, 1);
        assert_relative_eq!(entry.penalty, 1_000.0);

        assert!(ArrearsCalculator::new(BillingRules { due_day: 30, penalty_fraction: 0.25 }).is_err());
    }
}
