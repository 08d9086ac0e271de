//! Financial aggregations over a user [`Snapshot`].
//!
//! Every function here is pure: it reads the snapshot, allocates its result
//! and returns. Missing amounts count as zero, empty collections are valid
//! input and no result ever carries a NaN or an infinity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BudgetRecord, Expense, Snapshot};

mod assembler;

pub use assembler::{
    BudgetRow, ExpenseRow, ExportBundle, IncomeRow, Report, ReportRequest, assemble,
    export_bundle,
};

/// Message returned by [`total_for_period`] when no budget matches.
pub const NO_PERIOD_MATCH: &str = "No expenses found for the specified year and month.";

/// Label of every [`BudgetAlert`].
pub const EXCEEDED_BUDGET: &str = "Exceeded budget";

/// The record collections [`sum_by_kind`] can total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Budgets,
    Incomes,
    Expenses,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_expense: f64,
    pub total_income: f64,
    pub total_budget: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub expenses: Vec<Expense>,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PeriodTotal {
    Matched {
        #[serde(rename = "totalExpenses")]
        total_expenses: f64,
        budgets: Vec<BudgetRecord>,
    },
    NoMatch {
        #[serde(rename = "totalExpenses")]
        total_expenses: f64,
        message: String,
    },
}

impl PeriodTotal {
    pub fn total_expenses(&self) -> f64 {
        match self {
            Self::Matched { total_expenses, .. } | Self::NoMatch { total_expenses, .. } => {
                *total_expenses
            }
        }
    }
}

/// Month name to total, in first-seen order.
pub type MonthBuckets = Vec<(String, f64)>;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrends {
    pub expenses_by_month: MonthBuckets,
    pub incomes_by_month: MonthBuckets,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total_expenses: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualBudget {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining_budget: f64,
}

/// Naive annualized forecast. Both fields are `None` when there is no
/// expense history to average.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub average_monthly_expense: Option<f64>,
    pub forecasted_expenses: Option<f64>,
}

/// Inclusive range on record creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomReport {
    pub total_expenses: f64,
    pub total_incomes: f64,
    pub net_income: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub spent: f64,
    pub budget: f64,
    pub alert: String,
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Saturate an overflowed result to the largest finite value; NaN becomes 0.
fn finite(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}

fn add(total: f64, value: f64) -> f64 {
    finite(total + value)
}

/// Folds from `+0.0`: `Iterator::sum` on `f64` starts at `-0.0`.
fn sum_values<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(0.0, add)
}

fn sum_amounts<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    sum_values(amounts.into_iter().map(amount))
}

fn expenses_total(expenses: &[Expense]) -> f64 {
    sum_amounts(expenses.iter().map(|expense| expense.amount))
}

/// Long English month name of a timestamp, e.g. `"September"`.
pub fn month_name(at: &DateTime<Utc>) -> String {
    at.format("%B").to_string()
}

fn add_to_bucket(buckets: &mut MonthBuckets, key: String, value: f64) {
    match buckets.iter_mut().find(|(name, _)| *name == key) {
        Some((_, total)) => *total = add(*total, value),
        None => buckets.push((key, value)),
    }
}

/// Sum of `amount` over one record collection.
pub fn sum_by_kind(snapshot: &Snapshot, kind: RecordKind) -> f64 {
    match kind {
        RecordKind::Budgets => sum_amounts(snapshot.budgets.iter().map(|r| r.budget.amount)),
        RecordKind::Incomes => sum_amounts(snapshot.incomes.iter().map(|i| i.amount)),
        RecordKind::Expenses => expenses_total(&snapshot.expenses),
    }
}

pub fn totals(snapshot: &Snapshot) -> Totals {
    Totals {
        total_expense: sum_by_kind(snapshot, RecordKind::Expenses),
        total_income: sum_by_kind(snapshot, RecordKind::Incomes),
        total_budget: sum_by_kind(snapshot, RecordKind::Budgets),
    }
}

/// Share of each category in the expenses of all categories.
///
/// Every percentage is 0 when nothing has been spent.
pub fn expense_percentage_by_category(snapshot: &Snapshot) -> Vec<CategoryShare> {
    let per_category: Vec<f64> = snapshot
        .categories
        .iter()
        .map(|record| expenses_total(&record.expenses))
        .collect();
    let overall = sum_values(per_category.iter().copied());

    snapshot
        .categories
        .iter()
        .zip(per_category)
        .map(|(record, spent)| {
            let percentage = if overall == 0.0 {
                0.0
            } else {
                spent / overall * 100.0
            };
            CategoryShare {
                name: record.category.name.clone(),
                expenses: record.expenses.clone(),
                percentage: finite(percentage),
            }
        })
        .collect()
}

/// Expenses booked against the budgets of one month. The month comparison
/// ignores case.
pub fn total_for_period(snapshot: &Snapshot, year: i32, month: &str) -> PeriodTotal {
    let month = month.trim();
    let matched: Vec<BudgetRecord> = snapshot
        .budgets
        .iter()
        .filter(|record| record.budget.year == year)
        .filter(|record| record.budget.month.trim().to_lowercase() == month.to_lowercase())
        .cloned()
        .collect();

    if matched.is_empty() {
        return PeriodTotal::NoMatch {
            total_expenses: 0.0,
            message: NO_PERIOD_MATCH.to_string(),
        };
    }

    let total_expenses = sum_values(
        matched
            .iter()
            .map(|record| expenses_total(&record.expenses)),
    );
    PeriodTotal::Matched {
        total_expenses,
        budgets: matched,
    }
}

/// Expenses and incomes per month name.
///
/// Expenses are reached through the budgets, incomes through the flat list.
/// Buckets are keyed by month name only, so the same month of different years
/// lands in the same bucket.
pub fn monthly_trends(snapshot: &Snapshot) -> MonthlyTrends {
    let mut expenses_by_month = MonthBuckets::new();
    for expense in snapshot.budgets.iter().flat_map(|record| &record.expenses) {
        add_to_bucket(
            &mut expenses_by_month,
            month_name(&expense.created_at),
            amount(expense.amount),
        );
    }

    let mut incomes_by_month = MonthBuckets::new();
    for income in &snapshot.incomes {
        add_to_bucket(
            &mut incomes_by_month,
            month_name(&income.created_at),
            amount(income.amount),
        );
    }

    MonthlyTrends {
        expenses_by_month,
        incomes_by_month,
    }
}

pub fn category_breakdown(snapshot: &Snapshot) -> Vec<CategoryTotal> {
    snapshot
        .categories
        .iter()
        .map(|record| CategoryTotal {
            category: record.category.name.clone(),
            total_expenses: expenses_total(&record.expenses),
        })
        .collect()
}

/// Budget against spending for the budgets of `year`.
pub fn annual_budget_planning(snapshot: &Snapshot, year: i32) -> AnnualBudget {
    let (total_budget, total_spent) = snapshot
        .budgets
        .iter()
        .filter(|record| record.budget.year == year)
        .fold((0.0, 0.0), |(budget, spent), record| {
            (
                add(budget, amount(record.budget.amount)),
                add(spent, expenses_total(&record.expenses)),
            )
        });

    AnnualBudget {
        total_budget,
        total_spent,
        remaining_budget: finite(total_budget - total_spent),
    }
}

pub fn forecast_expenses(snapshot: &Snapshot) -> Forecast {
    let mut buckets = MonthBuckets::new();
    for expense in &snapshot.expenses {
        add_to_bucket(
            &mut buckets,
            month_name(&expense.created_at),
            amount(expense.amount),
        );
    }

    if buckets.is_empty() {
        return Forecast {
            average_monthly_expense: None,
            forecasted_expenses: None,
        };
    }

    let total = sum_values(buckets.iter().map(|(_, value)| *value));
    let average = finite(total / buckets.len() as f64);
    Forecast {
        average_monthly_expense: Some(average),
        forecasted_expenses: Some(finite(average * 12.0)),
    }
}

/// Totals of the records created inside `range`. An inverted range matches
/// nothing.
pub fn custom_report(snapshot: &Snapshot, range: DateRange) -> CustomReport {
    let total_expenses = sum_amounts(
        snapshot
            .expenses
            .iter()
            .filter(|expense| range.contains(&expense.created_at))
            .map(|expense| expense.amount),
    );
    let total_incomes = sum_amounts(
        snapshot
            .incomes
            .iter()
            .filter(|income| range.contains(&income.created_at))
            .map(|income| income.amount),
    );

    CustomReport {
        total_expenses,
        total_incomes,
        net_income: finite(total_incomes - total_expenses),
    }
}

/// One alert per budget whose expenses exceed its amount.
pub fn budget_alerts(snapshot: &Snapshot) -> Vec<BudgetAlert> {
    snapshot
        .budgets
        .iter()
        .filter_map(|record| {
            let spent = expenses_total(&record.expenses);
            let budget = amount(record.budget.amount);
            (spent > budget).then(|| BudgetAlert {
                spent,
                budget,
                alert: EXCEEDED_BUDGET.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Utc};

    use super::*;
    use crate::snapshot::fixtures::*;

    fn snapshot_with(
        budgets: Vec<crate::Budget>,
        categories: Vec<crate::Category>,
        incomes: Vec<crate::Income>,
        expenses: Vec<crate::Expense>,
    ) -> Snapshot {
        Snapshot::assemble(user(), budgets, categories, incomes, expenses)
    }

    fn sample() -> Snapshot {
        snapshot_with(
            vec![
                budget("b1", 2024, "march", Some(100.0)),
                budget("b2", 2024, "april", Some(50.0)),
            ],
            vec![category("food", "Food"), category("rent", "Rent")],
            vec![
                income("i1", "b1", Some(1000.0), at(2024, 3, 1)),
                income("i2", "b2", None, at(2024, 4, 1)),
            ],
            vec![
                expense("e1", "b1", "food", Some(30.0), at(2024, 3, 2)),
                expense("e2", "b1", "rent", Some(90.0), at(2024, 3, 5)),
                expense("e3", "b2", "food", None, at(2024, 4, 2)),
            ],
        )
    }

    #[test]
    fn sums_are_zero_for_empty_collections() {
        let snapshot = Snapshot::empty(user());
        assert_eq!(sum_by_kind(&snapshot, RecordKind::Budgets), 0.0);
        assert_eq!(sum_by_kind(&snapshot, RecordKind::Incomes), 0.0);
        assert_eq!(sum_by_kind(&snapshot, RecordKind::Expenses), 0.0);
    }

    #[test]
    fn empty_sums_serialize_as_positive_zero() {
        let snapshot = snapshot_with(
            Vec::new(),
            vec![category("food", "Food")],
            Vec::new(),
            Vec::new(),
        );
        let totals = totals(&snapshot);
        assert!(totals.total_income.is_sign_positive());
        assert_eq!(
            serde_json::to_string(&totals).unwrap(),
            r#"{"totalExpense":0.0,"totalIncome":0.0,"totalBudget":0.0}"#
        );

        let breakdown = category_breakdown(&snapshot);
        assert!(breakdown[0].total_expenses.is_sign_positive());

        let range = DateRange::new(at(2024, 1, 1), at(2024, 12, 31));
        let report = custom_report(&snapshot, range);
        assert!(report.total_expenses.is_sign_positive());
        assert!(report.total_incomes.is_sign_positive());
        assert!(report.net_income.is_sign_positive());
    }

    #[test]
    fn huge_amounts_keep_results_finite() {
        let year = Utc::now().year();
        let snapshot = snapshot_with(
            vec![
                budget("b1", year, "march", Some(1e308)),
                budget("b2", year, "april", Some(1e308)),
            ],
            vec![category("food", "Food")],
            vec![
                income("i1", "b1", Some(1e308), at(year, 3, 1)),
                income("i2", "b2", Some(1e308), at(year, 4, 1)),
            ],
            vec![
                expense("e1", "b1", "food", Some(1e308), at(year, 3, 2)),
                expense("e2", "b2", "food", Some(1e308), at(year, 4, 2)),
            ],
        );

        let totals = totals(&snapshot);
        assert!(totals.total_expense.is_finite());
        assert!(totals.total_income.is_finite());
        assert!(totals.total_budget.is_finite());

        let annual = annual_budget_planning(&snapshot, year);
        assert!(annual.total_budget.is_finite());
        assert!(annual.remaining_budget.is_finite());

        let forecast = forecast_expenses(&snapshot);
        assert!(forecast.average_monthly_expense.is_some_and(f64::is_finite));
        assert!(forecast.forecasted_expenses.is_some_and(f64::is_finite));

        let shares = expense_percentage_by_category(&snapshot);
        assert!(shares[0].percentage.is_finite());

        let range = DateRange::new(at(year, 1, 1), at(year, 12, 31));
        let report = custom_report(&snapshot, range);
        assert!(report.net_income.is_finite());

        let json = serde_json::to_value(&totals).unwrap();
        assert!(json["totalExpense"].is_f64());
    }

    #[test]
    fn null_amounts_count_as_zero() {
        let snapshot = sample();
        assert_eq!(sum_by_kind(&snapshot, RecordKind::Expenses), 120.0);
        assert_eq!(sum_by_kind(&snapshot, RecordKind::Incomes), 1000.0);
        assert_eq!(sum_by_kind(&snapshot, RecordKind::Budgets), 150.0);
    }

    #[test]
    fn sum_ignores_record_order() {
        let mut reversed = sample();
        reversed.expenses.reverse();
        reversed.budgets.reverse();
        assert_eq!(
            sum_by_kind(&reversed, RecordKind::Expenses),
            sum_by_kind(&sample(), RecordKind::Expenses)
        );
        assert_eq!(
            sum_by_kind(&reversed, RecordKind::Budgets),
            sum_by_kind(&sample(), RecordKind::Budgets)
        );
    }

    #[test]
    fn totals_match_individual_sums() {
        let snapshot = sample();
        let totals = totals(&snapshot);
        assert_eq!(
            totals.total_expense,
            sum_by_kind(&snapshot, RecordKind::Expenses)
        );
        assert_eq!(totals.total_income, 1000.0);
        assert_eq!(totals.total_budget, 150.0);
    }

    #[test]
    fn category_percentages_add_up_to_one_hundred() {
        let shares = expense_percentage_by_category(&sample());
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].name, "Food");
        assert_eq!(shares[0].expenses.len(), 2);
        assert!((shares[0].percentage - 25.0).abs() < 1e-9);
        assert!((shares[1].percentage - 75.0).abs() < 1e-9);
        let sum: f64 = shares.iter().map(|share| share.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn category_percentages_are_zero_without_expenses() {
        let snapshot = snapshot_with(
            Vec::new(),
            vec![category("food", "Food"), category("rent", "Rent")],
            Vec::new(),
            Vec::new(),
        );
        let shares = expense_percentage_by_category(&snapshot);
        assert!(shares.iter().all(|share| share.percentage == 0.0));
    }

    #[test]
    fn period_total_matches_month_case_insensitively() {
        let snapshot = snapshot_with(
            vec![budget("b1", 2024, "march", Some(100.0))],
            vec![category("food", "Food")],
            Vec::new(),
            vec![expense("e1", "b1", "food", Some(40.0), at(2024, 3, 2))],
        );

        let found = total_for_period(&snapshot, 2024, "March");
        assert_eq!(found.total_expenses(), 40.0);
        match found {
            PeriodTotal::Matched { budgets, .. } => assert_eq!(budgets[0].budget.id, "b1"),
            other => panic!("expected a match, got {other:?}"),
        }

        let missing = total_for_period(&snapshot, 2024, "april");
        assert_eq!(
            missing,
            PeriodTotal::NoMatch {
                total_expenses: 0.0,
                message: NO_PERIOD_MATCH.to_string(),
            }
        );
        assert_eq!(total_for_period(&snapshot, 2023, "march").total_expenses(), 0.0);
    }

    #[test]
    fn period_total_serializes_flat() {
        let snapshot = snapshot_with(
            vec![budget("b1", 2024, "march", Some(100.0))],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let json = serde_json::to_value(total_for_period(&snapshot, 2024, "MARCH")).unwrap();
        assert_eq!(json["totalExpenses"], 0.0);
        assert_eq!(json["budgets"][0]["id"], "b1");
        assert_eq!(json["budgets"][0]["month"], "march");
    }

    #[test]
    fn monthly_trends_bucket_by_month_name() {
        let snapshot = snapshot_with(
            vec![budget("b1", 2024, "march", Some(100.0))],
            vec![category("food", "Food")],
            vec![
                income("i1", "b1", Some(500.0), at(2024, 3, 1)),
                income("i2", "b1", Some(250.0), at(2024, 9, 1)),
            ],
            vec![
                expense("e1", "b1", "food", Some(10.0), at(2024, 9, 2)),
                expense("e2", "b1", "food", Some(5.0), at(2024, 3, 2)),
                expense("e3", "b1", "food", Some(7.0), at(2023, 9, 20)),
            ],
        );
        let trends = monthly_trends(&snapshot);
        assert_eq!(
            trends.expenses_by_month,
            vec![("September".to_string(), 17.0), ("March".to_string(), 5.0)]
        );
        assert_eq!(
            trends.incomes_by_month,
            vec![("March".to_string(), 500.0), ("September".to_string(), 250.0)]
        );
    }

    #[test]
    fn category_breakdown_lists_every_category() {
        let breakdown = category_breakdown(&sample());
        assert_eq!(
            breakdown,
            vec![
                CategoryTotal {
                    category: "Food".to_string(),
                    total_expenses: 30.0,
                },
                CategoryTotal {
                    category: "Rent".to_string(),
                    total_expenses: 90.0,
                },
            ]
        );
    }

    #[test]
    fn annual_planning_excludes_other_years() {
        let year = Utc::now().year();
        let snapshot = snapshot_with(
            vec![
                budget("current", year, "may", Some(500.0)),
                budget("previous", year - 1, "may", Some(999.0)),
            ],
            vec![category("food", "Food")],
            Vec::new(),
            vec![expense("e1", "current", "food", Some(200.0), at(year, 5, 1))],
        );
        assert_eq!(
            annual_budget_planning(&snapshot, year),
            AnnualBudget {
                total_budget: 500.0,
                total_spent: 200.0,
                remaining_budget: 300.0,
            }
        );
    }

    #[test]
    fn annual_planning_can_go_negative() {
        let snapshot = snapshot_with(
            vec![budget("b1", 2024, "may", Some(100.0))],
            vec![category("food", "Food")],
            Vec::new(),
            vec![expense("e1", "b1", "food", Some(150.0), at(2024, 5, 1))],
        );
        assert_eq!(annual_budget_planning(&snapshot, 2024).remaining_budget, -50.0);
    }

    #[test]
    fn forecast_averages_distinct_months() {
        let snapshot = snapshot_with(
            vec![budget("b1", 2024, "march", Some(100.0))],
            vec![category("food", "Food")],
            Vec::new(),
            vec![
                expense("e1", "b1", "food", Some(100.0), at(2024, 3, 1)),
                expense("e2", "b1", "food", Some(50.0), at(2024, 3, 9)),
                expense("e3", "b1", "food", Some(150.0), at(2024, 4, 1)),
            ],
        );
        assert_eq!(
            forecast_expenses(&snapshot),
            Forecast {
                average_monthly_expense: Some(150.0),
                forecasted_expenses: Some(1800.0),
            }
        );
    }

    #[test]
    fn forecast_without_history_has_no_value() {
        let forecast = forecast_expenses(&Snapshot::empty(user()));
        assert_eq!(forecast.average_monthly_expense, None);
        assert_eq!(forecast.forecasted_expenses, None);
        let json = serde_json::to_value(&forecast).unwrap();
        assert!(json["averageMonthlyExpense"].is_null());
    }

    #[test]
    fn custom_report_uses_inclusive_bounds() {
        let snapshot = sample();
        let range = DateRange::new(at(2024, 3, 2), at(2024, 4, 1));
        let report = custom_report(&snapshot, range);
        assert_eq!(
            report,
            CustomReport {
                total_expenses: 120.0,
                total_incomes: 0.0,
                net_income: -120.0,
            }
        );
        assert_eq!(report, custom_report(&snapshot, range));
    }

    #[test]
    fn custom_report_with_inverted_range_is_empty() {
        let range = DateRange::new(at(2024, 12, 31), at(2024, 1, 1));
        let report = custom_report(&sample(), range);
        assert_eq!(report.total_expenses, 0.0);
        assert_eq!(report.total_incomes, 0.0);
    }

    #[test]
    fn alerts_only_for_exceeded_budgets() {
        let snapshot = snapshot_with(
            vec![
                budget("over", 2024, "march", Some(100.0)),
                budget("within", 2024, "april", Some(100.0)),
            ],
            vec![category("food", "Food")],
            Vec::new(),
            vec![
                expense("e1", "over", "food", Some(60.0), at(2024, 3, 1)),
                expense("e2", "over", "food", Some(50.0), at(2024, 3, 2)),
                expense("e3", "within", "food", Some(30.0), at(2024, 4, 1)),
            ],
        );
        assert_eq!(
            budget_alerts(&snapshot),
            vec![BudgetAlert {
                spent: 110.0,
                budget: 100.0,
                alert: EXCEEDED_BUDGET.to_string(),
            }]
        );
    }

    #[test]
    fn spending_exactly_the_budget_raises_no_alert() {
        let snapshot = snapshot_with(
            vec![budget("b1", 2024, "march", Some(100.0))],
            vec![category("food", "Food")],
            Vec::new(),
            vec![expense("e1", "b1", "food", Some(100.0), at(2024, 3, 1))],
        );
        assert!(budget_alerts(&snapshot).is_empty());
    }
}
