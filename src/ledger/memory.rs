//! In-memory ledger.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::{LedgerEntry, PayrollLedger, RecomputeCommit};
use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, PayrollRecord, PayrollStatus};

#[derive(Debug, Default)]
struct LedgerState {
    entries: HashMap<Uuid, LedgerEntry>,
    by_employee_period: HashMap<(String, PayPeriod), Uuid>,
}

/// A [`PayrollLedger`] kept in process memory.
///
/// Every operation takes a single lock, so a commit is observed either
/// entirely or not at all.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.read()?.entries.len())
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, LedgerState>> {
        self.state.read().map_err(|_| EngineError::LedgerUnavailable {
            message: "ledger lock poisoned".to_string(),
        })
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state.write().map_err(|_| EngineError::LedgerUnavailable {
            message: "ledger lock poisoned".to_string(),
        })
    }
}

impl PayrollLedger for InMemoryLedger {
    fn open_record(&self, record: PayrollRecord) -> EngineResult<PayrollRecord> {
        let mut state = self.write()?;

        let key = (record.employee_id.clone(), record.period);
        if state.by_employee_period.contains_key(&key) {
            return Err(EngineError::DuplicateRecord {
                employee_id: record.employee_id,
                period: record.period.to_string(),
            });
        }

        state.by_employee_period.insert(key, record.id);
        state.entries.insert(
            record.id,
            LedgerEntry {
                record: record.clone(),
                line_items: Vec::new(),
            },
        );

        debug!(record_id = %record.id, employee_id = %record.employee_id, period = %record.period, "Opened payroll record");
        Ok(record)
    }

    fn fetch(&self, record_id: Uuid) -> EngineResult<LedgerEntry> {
        self.read()?
            .entries
            .get(&record_id)
            .cloned()
            .ok_or(EngineError::RecordNotFound { record_id })
    }

    fn records_for_period(&self, period: PayPeriod) -> EngineResult<Vec<PayrollRecord>> {
        let state = self.read()?;
        let mut records: Vec<PayrollRecord> = state
            .entries
            .values()
            .filter(|entry| entry.record.period == period)
            .map(|entry| entry.record.clone())
            .collect();
        records.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(records)
    }

    fn clear_and_rewrite(&self, commit: RecomputeCommit) -> EngineResult<LedgerEntry> {
        commit.check_consistency()?;

        let mut state = self.write()?;
        let entry = state
            .entries
            .get_mut(&commit.record_id)
            .ok_or(EngineError::RecordNotFound {
                record_id: commit.record_id,
            })?;

        let record = &mut entry.record;
        if record.status.is_locked() {
            return Err(EngineError::RecordLocked {
                record_id: record.id,
                status: record.status,
            });
        }
        if record.revision != commit.expected_revision {
            return Err(EngineError::ConcurrentRecompute {
                record_id: record.id,
            });
        }

        let totals = commit.totals;
        record.gross_salary = totals.gross_salary;
        record.employee_deductions_total = totals.employee_deductions_total;
        record.employer_cost_total = totals.employer_cost_total;
        record.net_salary = totals.net_salary;
        record.status = PayrollStatus::Calculated;
        record.revision += 1;
        record.catalog_version = Some(commit.catalog_version);
        record.calculated_at = Some(commit.calculated_at);
        entry.line_items = commit.line_items;

        Ok(entry.clone())
    }

    fn transition(&self, record_id: Uuid, to: PayrollStatus) -> EngineResult<PayrollRecord> {
        let mut state = self.write()?;
        let entry = state
            .entries
            .get_mut(&record_id)
            .ok_or(EngineError::RecordNotFound { record_id })?;

        let record = &mut entry.record;
        let allowed = matches!(to, PayrollStatus::Validated | PayrollStatus::Paid)
            && record.status.can_transition_to(to);
        if !allowed {
            return Err(EngineError::InvalidStatusTransition {
                from: record.status,
                to,
            });
        }

        let now = Utc::now();
        match to {
            PayrollStatus::Validated => record.validated_at = Some(now),
            PayrollStatus::Paid => record.paid_at = Some(now),
            PayrollStatus::Draft | PayrollStatus::Calculated => {}
        }
        record.status = to;

        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContributionLine, ContributionRule, ContributionTotals, LineItem,
    };
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn period() -> PayPeriod {
        PayPeriod::new(2026, 1).unwrap()
    }

    fn open(ledger: &InMemoryLedger, employee_id: &str) -> PayrollRecord {
        ledger
            .open_record(PayrollRecord::new(employee_id, period(), dec("3000.00")).unwrap())
            .unwrap()
    }

    fn commit_for(record: &PayrollRecord, employee_amount: &str, employer_amount: &str) -> RecomputeCommit {
        let employee = ContributionRule::employee("vieillesse", "Vieillesse", "6.90").unwrap();
        let employer = ContributionRule::employer("maladie", "Assurance maladie", "13.00").unwrap();
        let gross = record.gross_salary;
        let deductions = dec(employee_amount);

        RecomputeCommit {
            record_id: record.id,
            expected_revision: record.revision,
            totals: ContributionTotals {
                gross_salary: gross,
                employee_deductions_total: deductions,
                employer_cost_total: dec(employer_amount),
                net_salary: gross - deductions,
            },
            catalog_version: "test".to_string(),
            calculated_at: Utc::now(),
            line_items: vec![
                LineItem::bind(
                    record.id,
                    ContributionLine::for_rule(1, &employee, gross, deductions),
                ),
                LineItem::bind(
                    record.id,
                    ContributionLine::for_rule(2, &employer, gross, dec(employer_amount)),
                ),
            ],
        }
    }

    #[test]
    fn test_open_and_fetch() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");

        let entry = ledger.fetch(record.id).unwrap();
        assert_eq!(entry.record, record);
        assert!(entry.line_items.is_empty());
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_employee_period_rejected() {
        let ledger = InMemoryLedger::new();
        open(&ledger, "emp_001");

        let result = ledger.open_record(
            PayrollRecord::new("emp_001", period(), dec("1.00")).unwrap(),
        );
        match result {
            Err(EngineError::DuplicateRecord { employee_id, period }) => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(period, "2026-01");
            }
            other => panic!("Expected DuplicateRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_same_employee_other_period_allowed() {
        let ledger = InMemoryLedger::new();
        open(&ledger, "emp_001");
        let february = PayrollRecord::new("emp_001", PayPeriod::new(2026, 2).unwrap(), dec("1.00"))
            .unwrap();
        assert!(ledger.open_record(february).is_ok());
    }

    #[test]
    fn test_fetch_unknown_record() {
        let ledger = InMemoryLedger::new();
        assert!(matches!(
            ledger.fetch(Uuid::new_v4()),
            Err(EngineError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn test_clear_and_rewrite_replaces_everything() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");

        let entry = ledger
            .clear_and_rewrite(commit_for(&record, "207.00", "390.00"))
            .unwrap();

        assert_eq!(entry.record.status, PayrollStatus::Calculated);
        assert_eq!(entry.record.revision, 1);
        assert_eq!(entry.record.employee_deductions_total, dec("207.00"));
        assert_eq!(entry.record.net_salary, dec("2793.00"));
        assert_eq!(entry.line_items.len(), 2);
        assert_eq!(entry.employee_lines_total(), dec("207.00"));
        assert_eq!(entry.employer_lines_total(), dec("390.00"));

        let mut second = commit_for(&entry.record, "100.00", "50.00");
        second.line_items.truncate(1);
        second.totals.employer_cost_total = Decimal::ZERO;
        let entry = ledger.clear_and_rewrite(second).unwrap();

        assert_eq!(entry.line_items.len(), 1);
        assert_eq!(entry.record.employer_cost_total, Decimal::ZERO);
        assert_eq!(entry.record.revision, 2);
    }

    #[test]
    fn test_stale_revision_rejected() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");

        ledger
            .clear_and_rewrite(commit_for(&record, "207.00", "390.00"))
            .unwrap();

        // Same expected revision as the first commit.
        let result = ledger.clear_and_rewrite(commit_for(&record, "1.00", "1.00"));
        assert!(matches!(
            result,
            Err(EngineError::ConcurrentRecompute { .. })
        ));

        let entry = ledger.fetch(record.id).unwrap();
        assert_eq!(entry.record.employee_deductions_total, dec("207.00"));
    }

    #[test]
    fn test_inconsistent_commit_leaves_record_untouched() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");

        let mut commit = commit_for(&record, "207.00", "390.00");
        commit.totals.employee_deductions_total = dec("200.00");
        commit.totals.net_salary = dec("2800.00");

        assert!(matches!(
            ledger.clear_and_rewrite(commit),
            Err(EngineError::CalculationError { .. })
        ));
        let entry = ledger.fetch(record.id).unwrap();
        assert_eq!(entry.record.status, PayrollStatus::Draft);
        assert!(entry.line_items.is_empty());
    }

    #[test]
    fn test_foreign_line_item_rejected() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");

        let mut commit = commit_for(&record, "207.00", "390.00");
        commit.line_items[0].record_id = Uuid::new_v4();
        assert!(ledger.clear_and_rewrite(commit).is_err());
    }

    #[test]
    fn test_status_workflow() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");

        assert!(matches!(
            ledger.transition(record.id, PayrollStatus::Validated),
            Err(EngineError::InvalidStatusTransition { .. })
        ));

        ledger
            .clear_and_rewrite(commit_for(&record, "207.00", "390.00"))
            .unwrap();

        let validated = ledger
            .transition(record.id, PayrollStatus::Validated)
            .unwrap();
        assert_eq!(validated.status, PayrollStatus::Validated);
        assert!(validated.validated_at.is_some());

        let paid = ledger.transition(record.id, PayrollStatus::Paid).unwrap();
        assert_eq!(paid.status, PayrollStatus::Paid);
        assert!(paid.paid_at.is_some());
    }

    #[test]
    fn test_transition_to_calculated_rejected() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");
        assert!(ledger
            .transition(record.id, PayrollStatus::Calculated)
            .is_err());
    }

    #[test]
    fn test_locked_record_rejects_rewrite() {
        let ledger = InMemoryLedger::new();
        let record = open(&ledger, "emp_001");
        let entry = ledger
            .clear_and_rewrite(commit_for(&record, "207.00", "390.00"))
            .unwrap();
        ledger
            .transition(record.id, PayrollStatus::Validated)
            .unwrap();

        let result = ledger.clear_and_rewrite(commit_for(&entry.record, "1.00", "1.00"));
        match result {
            Err(EngineError::RecordLocked { status, .. }) => {
                assert_eq!(status, PayrollStatus::Validated)
            }
            other => panic!("Expected RecordLocked, got {:?}", other),
        }
    }

    #[test]
    fn test_records_for_period_sorted_by_employee() {
        let ledger = InMemoryLedger::new();
        open(&ledger, "emp_b");
        open(&ledger, "emp_a");
        ledger
            .open_record(
                PayrollRecord::new("emp_c", PayPeriod::new(2026, 2).unwrap(), dec("1")).unwrap(),
            )
            .unwrap();

        let records = ledger.records_for_period(period()).unwrap();
        let employees: Vec<_> = records.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(employees, vec!["emp_a", "emp_b"]);
    }
}
