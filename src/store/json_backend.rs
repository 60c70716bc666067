use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{Budget, Category, Expense, ExpenseDraft, MonthKey, UserId},
    errors::ExpenseError,
    utils::ensure_dir,
};

use super::{
    events::{SnapshotBus, StoreEvent, StoreEventKind, StoreSubscription},
    ExpenseSnapshot, ExpenseStore, Result, SkippedRecord,
};

const EXPENSES_DIR: &str = "expenses";
const BUDGETS_DIR: &str = "budgets";
const RECORD_EXTENSION: &str = "json";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TMP_SUFFIX: &str = "tmp";

/// On-disk record for one expense; `id` and `date` live in the path.
#[derive(Debug, Serialize, Deserialize)]
struct ExpenseRecord {
    title: String,
    amount: Decimal,
    category: Category,
}

/// Filesystem store mirroring the remote realtime-store layout:
/// `expenses/{uid}/{date}/{id}.json` and `budgets/{uid}/{month}.json`.
#[derive(Clone)]
pub struct JsonStore {
    expenses_dir: PathBuf,
    budgets_dir: PathBuf,
    bus: SnapshotBus,
}

impl JsonStore {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(crate::utils::store_root);
        let expenses_dir = root.join(EXPENSES_DIR);
        let budgets_dir = root.join(BUDGETS_DIR);
        ensure_dir(&expenses_dir)?;
        ensure_dir(&budgets_dir)?;
        Ok(Self {
            expenses_dir,
            budgets_dir,
            bus: SnapshotBus::default(),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    fn user_dir(&self, user: &UserId) -> PathBuf {
        self.expenses_dir.join(user.as_str())
    }

    fn day_dir(&self, user: &UserId, date: NaiveDate) -> PathBuf {
        self.user_dir(user).join(date.format(DATE_FORMAT).to_string())
    }

    fn expense_path(&self, user: &UserId, date: NaiveDate, id: Uuid) -> PathBuf {
        self.day_dir(user, date)
            .join(format!("{id}.{RECORD_EXTENSION}"))
    }

    fn budget_path(&self, user: &UserId, month: MonthKey) -> PathBuf {
        self.budgets_dir
            .join(user.as_str())
            .join(format!("{month}.{RECORD_EXTENSION}"))
    }

    fn write_expense(&self, user: &UserId, expense: &Expense) -> Result<()> {
        let record = ExpenseRecord {
            title: expense.title.clone(),
            amount: expense.amount,
            category: expense.category,
        };
        let json = serde_json::to_string_pretty(&record)?;
        write_atomic(&self.expense_path(user, expense.date, expense.id), &json)
    }

    fn notify(&self, user: &UserId, kind: StoreEventKind) {
        self.bus.publish(StoreEvent {
            user: user.clone(),
            kind,
        });
    }

    /// Drops a date directory once its last record is gone, so the date
    /// key disappears from the next snapshot.
    fn prune_empty_day(&self, user: &UserId, date: NaiveDate) -> Result<()> {
        let dir = self.day_dir(user, date);
        if dir.exists() && fs::read_dir(&dir)?.next().is_none() {
            fs::remove_dir(&dir)?;
        }
        Ok(())
    }

    fn read_day(
        &self,
        date: NaiveDate,
        dir: &Path,
        expenses: &mut Vec<Expense>,
        skipped: &mut Vec<SkippedRecord>,
    ) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let id = match path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<Uuid>().ok())
            {
                Some(id) => id,
                None => {
                    tracing::warn!(?path, "skipping record with unparseable id");
                    skipped.push(SkippedRecord {
                        date: Some(date),
                        id: None,
                        reason: "unparseable record id".into(),
                    });
                    continue;
                }
            };
            let record = fs::read_to_string(&path)
                .map_err(ExpenseError::from)
                .and_then(|data| serde_json::from_str::<ExpenseRecord>(&data).map_err(Into::into));
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(%id, %date, %err, "skipping malformed expense record");
                    skipped.push(SkippedRecord {
                        date: Some(date),
                        id: Some(id),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            if record.amount <= Decimal::ZERO {
                tracing::warn!(%id, %date, amount = %record.amount, "skipping non-positive amount");
                skipped.push(SkippedRecord {
                    date: Some(date),
                    id: Some(id),
                    reason: format!("non-positive amount {}", record.amount),
                });
                continue;
            }
            expenses.push(Expense {
                id,
                title: record.title,
                amount: record.amount,
                category: record.category,
                date,
            });
        }
        Ok(())
    }
}

impl ExpenseStore for JsonStore {
    fn create_expense(&self, user: &UserId, draft: ExpenseDraft) -> Result<Expense> {
        draft.validate()?;
        let expense = Expense {
            id: Uuid::new_v4(),
            title: draft.title,
            amount: draft.amount,
            category: draft.category,
            date: draft.date,
        };
        self.write_expense(user, &expense)?;
        self.notify(user, StoreEventKind::ExpensesChanged);
        Ok(expense)
    }

    fn update_expense(
        &self,
        user: &UserId,
        previous_date: NaiveDate,
        expense: &Expense,
    ) -> Result<()> {
        let previous_path = self.expense_path(user, previous_date, expense.id);
        if !previous_path.exists() {
            return Err(ExpenseError::Storage(format!(
                "expense {} not found under {previous_date}",
                expense.id
            )));
        }
        self.write_expense(user, expense)?;
        if previous_date != expense.date {
            fs::remove_file(&previous_path)?;
            self.prune_empty_day(user, previous_date)?;
        }
        self.notify(user, StoreEventKind::ExpensesChanged);
        Ok(())
    }

    fn remove_expense(&self, user: &UserId, date: NaiveDate, id: Uuid) -> Result<()> {
        let path = self.expense_path(user, date, id);
        if !path.exists() {
            return Err(ExpenseError::Storage(format!(
                "expense {id} not found under {date}"
            )));
        }
        fs::remove_file(&path)?;
        self.prune_empty_day(user, date)?;
        self.notify(user, StoreEventKind::ExpensesChanged);
        Ok(())
    }

    fn remove_day(&self, user: &UserId, date: NaiveDate) -> Result<()> {
        let dir = self.day_dir(user, date);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        self.notify(user, StoreEventKind::ExpensesChanged);
        Ok(())
    }

    fn load_expenses(&self, user: &UserId) -> Result<ExpenseSnapshot> {
        let mut expenses = Vec::new();
        let mut skipped = Vec::new();
        let user_dir = self.user_dir(user);
        if user_dir.exists() {
            for entry in fs::read_dir(&user_dir)? {
                let path = entry?.path();
                if !path.is_dir() {
                    continue;
                }
                let name = match path.file_name().and_then(|name| name.to_str()) {
                    Some(name) => name.to_string(),
                    None => continue,
                };
                let date = match NaiveDate::parse_from_str(&name, DATE_FORMAT) {
                    Ok(date) => date,
                    Err(_) => {
                        tracing::warn!(partition = %name, "skipping unparseable date partition");
                        skipped.push(SkippedRecord {
                            date: None,
                            id: None,
                            reason: format!("unparseable date partition `{name}`"),
                        });
                        continue;
                    }
                };
                self.read_day(date, &path, &mut expenses, &mut skipped)?;
            }
        }
        expenses.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
        Ok(ExpenseSnapshot {
            user: user.clone(),
            expenses,
            skipped,
        })
    }

    fn save_budget(&self, user: &UserId, budget: &Budget) -> Result<()> {
        let json = serde_json::to_string_pretty(budget)?;
        write_atomic(&self.budget_path(user, budget.month), &json)?;
        self.notify(user, StoreEventKind::BudgetsChanged);
        Ok(())
    }

    fn load_budget(&self, user: &UserId, month: MonthKey) -> Result<Option<Budget>> {
        let path = self.budget_path(user, month);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn watch(&self, user: &UserId) -> StoreSubscription {
        self.bus.subscribe(user)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (JsonStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonStore::new(Some(temp.path().to_path_buf())).expect("json store");
        (store, temp)
    }

    fn draft(title: &str, amount: Decimal, day: u32) -> ExpenseDraft {
        ExpenseDraft::new(
            title,
            amount,
            Category::Food,
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        )
    }

    #[test]
    fn create_and_load_roundtrip() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        let created = store
            .create_expense(&user, draft("Lunch", dec!(12.50), 5))
            .expect("create expense");

        let snapshot = store.load_expenses(&user).expect("load snapshot");
        assert_eq!(snapshot.expenses, vec![created]);
        assert!(snapshot.skipped.is_empty());
    }

    #[test]
    fn create_rejects_invalid_draft() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        let err = store
            .create_expense(&user, draft("", dec!(10), 5))
            .expect_err("blank title must be rejected");
        assert!(matches!(err, ExpenseError::Validation(_)));
    }

    #[test]
    fn snapshots_are_scoped_per_user() {
        let (store, _guard) = store_with_temp_dir();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        store
            .create_expense(&alice, draft("Lunch", dec!(10), 5))
            .unwrap();

        let snapshot = store.load_expenses(&bob).expect("load bob");
        assert!(snapshot.expenses.is_empty());
    }

    #[test]
    fn date_edit_moves_the_record_across_partitions() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        let mut expense = store
            .create_expense(&user, draft("Lunch", dec!(10), 5))
            .unwrap();
        let old_date = expense.date;
        expense.date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();

        store
            .update_expense(&user, old_date, &expense)
            .expect("move expense");

        let snapshot = store.load_expenses(&user).expect("load snapshot");
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.expenses[0].date, expense.date);
    }

    #[test]
    fn removing_last_expense_drops_the_date_partition() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        let expense = store
            .create_expense(&user, draft("Lunch", dec!(10), 5))
            .unwrap();

        store
            .remove_expense(&user, expense.date, expense.id)
            .expect("remove expense");

        let day_dir = store.day_dir(&user, expense.date);
        assert!(!day_dir.exists(), "empty date directory must be pruned");
    }

    #[test]
    fn remove_day_deletes_every_record_for_that_date() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        store
            .create_expense(&user, draft("Lunch", dec!(10), 5))
            .unwrap();
        store
            .create_expense(&user, draft("Dinner", dec!(20), 5))
            .unwrap();
        store
            .create_expense(&user, draft("Taxi", dec!(8), 6))
            .unwrap();

        store
            .remove_day(&user, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .expect("remove day");

        let snapshot = store.load_expenses(&user).expect("load snapshot");
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.expenses[0].title, "Taxi");
    }

    #[test]
    fn malformed_records_are_skipped_and_flagged() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        store
            .create_expense(&user, draft("Lunch", dec!(10), 5))
            .unwrap();

        let day = store.day_dir(&user, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        fs::write(day.join(format!("{}.json", Uuid::new_v4())), "not json").unwrap();
        fs::write(
            day.join(format!("{}.json", Uuid::new_v4())),
            r#"{"title":"Bad","amount":-3,"category":"Food"}"#,
        )
        .unwrap();

        let snapshot = store.load_expenses(&user).expect("load snapshot");
        assert_eq!(snapshot.expenses.len(), 1, "good record survives");
        assert_eq!(snapshot.skipped.len(), 2, "both bad records flagged");
    }

    #[test]
    fn budget_save_is_whole_document_replace() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        let month: MonthKey = "2024-03".parse().unwrap();

        let mut budget = Budget::empty(month);
        budget.overall = Some(dec!(1000));
        budget.set_cap(Category::Food, Some(dec!(250)));
        store.save_budget(&user, &budget).expect("save budget");

        let mut replacement = Budget::empty(month);
        replacement.set_cap(Category::Transport, Some(dec!(50)));
        store.save_budget(&user, &replacement).expect("replace");

        let loaded = store
            .load_budget(&user, month)
            .expect("load budget")
            .expect("budget exists");
        assert_eq!(loaded, replacement);
        assert_eq!(loaded.cap(Category::Food), None, "old caps do not leak");
    }

    #[test]
    fn missing_budget_loads_as_none() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        let month: MonthKey = "2024-03".parse().unwrap();
        assert!(store.load_budget(&user, month).expect("load").is_none());
    }

    #[test]
    fn mutations_notify_watchers() {
        let (store, _guard) = store_with_temp_dir();
        let user = UserId::new("alice");
        let mut sub = store.watch(&user);

        store
            .create_expense(&user, draft("Lunch", dec!(10), 5))
            .unwrap();
        let event = sub.try_changed().expect("expense event");
        assert_eq!(event.kind, StoreEventKind::ExpensesChanged);

        store
            .save_budget(&user, &Budget::empty("2024-03".parse().unwrap()))
            .unwrap();
        let event = sub.try_changed().expect("budget event");
        assert_eq!(event.kind, StoreEventKind::BudgetsChanged);
    }
}
