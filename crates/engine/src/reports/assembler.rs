//! Maps report names to aggregations and shapes the export bundle.

use serde::Serialize;

use crate::Snapshot;

use super::{
    AnnualBudget, BudgetAlert, CategoryShare, CategoryTotal, CustomReport, DateRange, Forecast,
    MonthlyTrends, PeriodTotal, Totals, annual_budget_planning, budget_alerts, category_breakdown,
    custom_report, expense_percentage_by_category, forecast_expenses, monthly_trends,
    total_for_period, totals,
};

/// A request for one of the reports the engine can compute.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportRequest {
    Totals,
    ExpensePercentage,
    Period { year: i32, month: String },
    MonthlyTrends,
    CategoryBreakdown,
    AnnualBudget { year: i32 },
    Forecast,
    Custom(DateRange),
    BudgetAlerts,
}

impl ReportRequest {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Totals => "total",
            Self::ExpensePercentage => "expense_percentage",
            Self::Period { .. } => "period",
            Self::MonthlyTrends => "monthly_trends",
            Self::CategoryBreakdown => "category_breakdown",
            Self::AnnualBudget { .. } => "annual_budget",
            Self::Forecast => "forecast_expenses",
            Self::Custom(_) => "custom_report",
            Self::BudgetAlerts => "budget_alerts",
        }
    }

    /// Human readable label used in response messages.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Totals => "Totals",
            Self::ExpensePercentage => "Expense percentages",
            Self::Period { .. } => "Period total",
            Self::MonthlyTrends => "Monthly trends",
            Self::CategoryBreakdown => "Category breakdown",
            Self::AnnualBudget { .. } => "Annual budget",
            Self::Forecast => "Expense forecast",
            Self::Custom(_) => "Custom report",
            Self::BudgetAlerts => "Budget alerts",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Totals(Totals),
    ExpensePercentage(Vec<CategoryShare>),
    Period(PeriodTotal),
    MonthlyTrends(MonthlyTrends),
    CategoryBreakdown(Vec<CategoryTotal>),
    AnnualBudget(AnnualBudget),
    Forecast(Forecast),
    Custom(CustomReport),
    BudgetAlerts(Vec<BudgetAlert>),
}

pub fn assemble(snapshot: &Snapshot, request: &ReportRequest) -> Report {
    match request {
        ReportRequest::Totals => Report::Totals(totals(snapshot)),
        ReportRequest::ExpensePercentage => {
            Report::ExpensePercentage(expense_percentage_by_category(snapshot))
        }
        ReportRequest::Period { year, month } => {
            Report::Period(total_for_period(snapshot, *year, month))
        }
        ReportRequest::MonthlyTrends => Report::MonthlyTrends(monthly_trends(snapshot)),
        ReportRequest::CategoryBreakdown => {
            Report::CategoryBreakdown(category_breakdown(snapshot))
        }
        ReportRequest::AnnualBudget { year } => {
            Report::AnnualBudget(annual_budget_planning(snapshot, *year))
        }
        ReportRequest::Forecast => Report::Forecast(forecast_expenses(snapshot)),
        ReportRequest::Custom(range) => Report::Custom(custom_report(snapshot, *range)),
        ReportRequest::BudgetAlerts => Report::BudgetAlerts(budget_alerts(snapshot)),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetRow {
    pub year: i32,
    pub month: String,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpenseRow {
    pub category: String,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncomeRow {
    pub source: String,
    pub amount: f64,
}

/// Everything the PDF export prints, already flattened into table rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub user_id: String,
    pub owner: String,
    pub totals: Totals,
    pub budgets: Vec<BudgetRow>,
    pub expenses: Vec<ExpenseRow>,
    pub incomes: Vec<IncomeRow>,
}

/// Expenses whose category is missing from the snapshot are labelled
/// `"Uncategorized"`.
pub fn export_bundle(snapshot: &Snapshot) -> ExportBundle {
    let budgets = snapshot
        .budgets
        .iter()
        .map(|record| BudgetRow {
            year: record.budget.year,
            month: capitalize(&record.budget.month),
            amount: super::amount(record.budget.amount),
        })
        .collect();
    let expenses = snapshot
        .expenses
        .iter()
        .map(|expense| ExpenseRow {
            category: snapshot
                .category_name(&expense.category_id)
                .unwrap_or("Uncategorized")
                .to_string(),
            amount: super::amount(expense.amount),
        })
        .collect();
    let incomes = snapshot
        .incomes
        .iter()
        .map(|income| IncomeRow {
            source: income.source.clone(),
            amount: super::amount(income.amount),
        })
        .collect();

    ExportBundle {
        user_id: snapshot.user.id.clone(),
        owner: snapshot.user.full_name(),
        totals: totals(snapshot),
        budgets,
        expenses,
        incomes,
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
