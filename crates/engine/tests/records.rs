use chrono::{Datelike, Duration, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    BudgetPatch, CategoryPatch, DateRange, Engine, EngineError, ExpensePatch, IncomePatch, Report,
    ReportRequest, Role, User, UserPatch,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn register(engine: &Engine, email: &str) -> User {
    engine
        .register_user("Ada", "Lovelace", email, "secret123", None, Role::User)
        .await
        .unwrap()
}

#[tokio::test]
async fn register_and_authenticate() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "Ada@Example.com").await;
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role, Role::User);

    let logged = engine
        .authenticate("ADA@example.com", "secret123")
        .await
        .unwrap();
    assert_eq!(logged.id, user.id);

    assert_eq!(
        engine.authenticate("ada@example.com", "wrong-pass").await,
        Err(EngineError::InvalidCredentials)
    );
    assert!(matches!(
        engine.authenticate("nobody@example.com", "secret123").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "ada@example.com").await;
    let err = engine
        .register_user("Ada", "Byron", "ADA@example.com", "secret123", None, Role::User)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("ada@example.com".to_string()));
}

#[tokio::test]
async fn registration_validates_input() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine
            .register_user("A", "Lovelace", "ada@example.com", "secret123", None, Role::User)
            .await,
        Err(EngineError::InvalidName(_))
    ));
    assert!(matches!(
        engine
            .register_user("Ada", "Lovelace", "ada@example.com", "123", None, Role::User)
            .await,
        Err(EngineError::InvalidName(_))
    ));
}

#[tokio::test]
async fn update_user_changes_profile_and_password() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;

    let updated = engine
        .update_user(
            &user.id,
            UserPatch {
                first_name: Some("Augusta".to_string()),
                password: Some("newsecret".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Augusta");
    assert_eq!(updated.last_name, "Lovelace");

    assert!(engine.authenticate("ada@example.com", "newsecret").await.is_ok());
    assert_eq!(
        engine.authenticate("ada@example.com", "secret123").await,
        Err(EngineError::InvalidCredentials)
    );
}

#[tokio::test]
async fn budgets_are_unique_per_period() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;

    let budget = engine
        .new_budget(&user.id, 500.0, " March ", 2024)
        .await
        .unwrap();
    assert_eq!(budget.month, "march");
    assert_eq!(budget.amount, Some(500.0));

    assert!(matches!(
        engine.new_budget(&user.id, 100.0, "MARCH", 2024).await,
        Err(EngineError::ExistingKey(_))
    ));
    assert!(engine.new_budget(&user.id, 100.0, "march", 2025).await.is_ok());

    let other = register(&engine, "grace@example.com").await;
    assert!(engine.new_budget(&other.id, 100.0, "march", 2024).await.is_ok());
}

#[tokio::test]
async fn budget_input_is_validated() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let too_late = Utc::now().year() + 11;

    assert!(matches!(
        engine.new_budget(&user.id, -1.0, "march", 2024).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.new_budget(&user.id, f64::NAN, "march", 2024).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.new_budget(&user.id, 1e308, "march", 2024).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.new_budget(&user.id, 10.0, "march", too_late).await,
        Err(EngineError::InvalidPeriod(_))
    ));
    assert!(matches!(
        engine.new_budget(&user.id, 10.0, "march", 1899).await,
        Err(EngineError::InvalidPeriod(_))
    ));
}

#[tokio::test]
async fn budget_filters_and_update() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let march = engine.new_budget(&user.id, 100.0, "march", 2024).await.unwrap();
    engine.new_budget(&user.id, 200.0, "april", 2024).await.unwrap();
    engine.new_budget(&user.id, 300.0, "march", 2023).await.unwrap();

    assert_eq!(engine.budgets(&user.id, None, None).await.unwrap().len(), 3);
    assert_eq!(
        engine
            .budgets(&user.id, Some(2024), None)
            .await
            .unwrap()
            .len(),
        2
    );
    let filtered = engine
        .budgets(&user.id, Some(2024), Some("MARCH"))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, march.id);

    assert!(matches!(
        engine
            .update_budget(
                &user.id,
                &march.id,
                BudgetPatch {
                    month: Some("April".to_string()),
                    ..BudgetPatch::default()
                },
            )
            .await,
        Err(EngineError::ExistingKey(_))
    ));

    let updated = engine
        .update_budget(
            &user.id,
            &march.id,
            BudgetPatch {
                amount: Some(150.0),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, Some(150.0));
    assert_eq!(updated.month, "march");
}

#[tokio::test]
async fn records_of_other_users_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let ada = register(&engine, "ada@example.com").await;
    let grace = register(&engine, "grace@example.com").await;

    let budget = engine.new_budget(&ada.id, 100.0, "march", 2024).await.unwrap();
    let category = engine.new_category(&ada.id, "Food", None).await.unwrap();

    assert!(matches!(
        engine.budget(&grace.id, &budget.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_category(&grace.id, &category.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .new_expense(&grace.id, &budget.id, &category.id, 10.0, None)
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .new_income(&grace.id, &budget.id, 10.0, "march", 2024, "salary")
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn budget_is_hydrated_with_children() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let budget = engine.new_budget(&user.id, 100.0, "march", 2024).await.unwrap();
    let category = engine
        .new_category(&user.id, "Food", Some("groceries"))
        .await
        .unwrap();
    let expense = engine
        .new_expense(&user.id, &budget.id, &category.id, 42.5, Some("market"))
        .await
        .unwrap();
    engine
        .new_income(&user.id, &budget.id, 1000.0, "March", 2024, "salary")
        .await
        .unwrap();

    let record = engine.budget(&user.id, &budget.id).await.unwrap();
    assert_eq!(record.expenses, vec![expense.clone()]);
    assert_eq!(record.incomes.len(), 1);
    assert_eq!(record.incomes[0].month, "march");

    let record = engine.category(&user.id, &category.id).await.unwrap();
    assert_eq!(record.category.description.as_deref(), Some("groceries"));
    assert_eq!(record.expenses, vec![expense]);
}

#[tokio::test]
async fn deleting_a_budget_removes_its_records() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let budget = engine.new_budget(&user.id, 100.0, "march", 2024).await.unwrap();
    let category = engine.new_category(&user.id, "Food", None).await.unwrap();
    engine
        .new_expense(&user.id, &budget.id, &category.id, 10.0, None)
        .await
        .unwrap();
    engine
        .new_income(&user.id, &budget.id, 10.0, "march", 2024, "gift")
        .await
        .unwrap();

    engine.delete_budget(&user.id, &budget.id).await.unwrap();
    assert!(engine.expenses(&user.id).await.unwrap().is_empty());
    assert!(engine.incomes(&user.id, None, None).await.unwrap().is_empty());
    assert_eq!(engine.categories(&user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_category_removes_its_expenses() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let budget = engine.new_budget(&user.id, 100.0, "march", 2024).await.unwrap();
    let food = engine.new_category(&user.id, "Food", None).await.unwrap();
    let rent = engine.new_category(&user.id, "Rent", None).await.unwrap();
    engine
        .new_expense(&user.id, &budget.id, &food.id, 10.0, None)
        .await
        .unwrap();
    let kept = engine
        .new_expense(&user.id, &budget.id, &rent.id, 20.0, None)
        .await
        .unwrap();

    engine.delete_category(&user.id, &food.id).await.unwrap();
    assert_eq!(engine.expenses(&user.id).await.unwrap(), vec![kept]);
}

#[tokio::test]
async fn expense_and_income_updates() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let march = engine.new_budget(&user.id, 100.0, "march", 2024).await.unwrap();
    let april = engine.new_budget(&user.id, 100.0, "april", 2024).await.unwrap();
    let food = engine.new_category(&user.id, "Food", None).await.unwrap();
    let rent = engine.new_category(&user.id, "Rent", None).await.unwrap();
    let expense = engine
        .new_expense(&user.id, &march.id, &food.id, 10.0, None)
        .await
        .unwrap();

    let moved = engine
        .update_expense(
            &user.id,
            &expense.id,
            ExpensePatch {
                amount: Some(12.0),
                budget_id: Some(april.id.clone()),
                category_id: Some(rent.id.clone()),
                ..ExpensePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.amount, Some(12.0));
    assert_eq!(moved.budget_id, april.id);
    assert_eq!(moved.category_id, rent.id);

    assert!(matches!(
        engine
            .update_expense(
                &user.id,
                &expense.id,
                ExpensePatch {
                    category_id: Some("missing".to_string()),
                    ..ExpensePatch::default()
                },
            )
            .await,
        Err(EngineError::KeyNotFound(_))
    ));

    let income = engine
        .new_income(&user.id, &march.id, 10.0, "march", 2024, "salary")
        .await
        .unwrap();
    let income = engine
        .update_income(
            &user.id,
            &income.id,
            IncomePatch {
                source: Some("bonus".to_string()),
                ..IncomePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(income.source, "bonus");
    assert_eq!(
        engine
            .incomes(&user.id, Some("March"), Some(2024))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(
        engine
            .incomes(&user.id, Some("april"), None)
            .await
            .unwrap()
            .is_empty()
    );

    let category = engine
        .update_category(
            &user.id,
            &food.id,
            CategoryPatch {
                name: Some("Groceries".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(category.name, "Groceries");
}

#[tokio::test]
async fn delete_user_removes_everything() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let budget = engine.new_budget(&user.id, 100.0, "march", 2024).await.unwrap();
    let category = engine.new_category(&user.id, "Food", None).await.unwrap();
    engine
        .new_expense(&user.id, &budget.id, &category.id, 10.0, None)
        .await
        .unwrap();

    engine.delete_user(&user.id).await.unwrap();
    assert!(matches!(
        engine.user(&user.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.snapshot(&user.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn reports_run_over_stored_records() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "ada@example.com").await;
    let year = Utc::now().year();
    let budget = engine.new_budget(&user.id, 100.0, "march", year).await.unwrap();
    let food = engine.new_category(&user.id, "Food", None).await.unwrap();
    let rent = engine.new_category(&user.id, "Rent", None).await.unwrap();
    engine
        .new_expense(&user.id, &budget.id, &food.id, 40.0, None)
        .await
        .unwrap();
    engine
        .new_expense(&user.id, &budget.id, &rent.id, 80.0, None)
        .await
        .unwrap();
    engine
        .new_income(&user.id, &budget.id, 1000.0, "march", year, "salary")
        .await
        .unwrap();

    let snapshot = engine.snapshot(&user.id).await.unwrap();
    assert_eq!(snapshot.budgets[0].expenses.len(), 2);
    assert_eq!(snapshot.categories.len(), 2);

    match engine.report(&user.id, &ReportRequest::Totals).await.unwrap() {
        Report::Totals(totals) => {
            assert_eq!(totals.total_expense, 120.0);
            assert_eq!(totals.total_income, 1000.0);
            assert_eq!(totals.total_budget, 100.0);
        }
        other => panic!("unexpected report {other:?}"),
    }

    match engine
        .report(&user.id, &ReportRequest::AnnualBudget { year })
        .await
        .unwrap()
    {
        Report::AnnualBudget(plan) => assert_eq!(plan.remaining_budget, -20.0),
        other => panic!("unexpected report {other:?}"),
    }

    match engine
        .report(&user.id, &ReportRequest::BudgetAlerts)
        .await
        .unwrap()
    {
        Report::BudgetAlerts(alerts) => {
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].spent, 120.0);
        }
        other => panic!("unexpected report {other:?}"),
    }

    let now = Utc::now();
    let range = DateRange::new(now - Duration::hours(1), now + Duration::hours(1));
    match engine
        .report(&user.id, &ReportRequest::Custom(range))
        .await
        .unwrap()
    {
        Report::Custom(report) => assert_eq!(report.net_income, 880.0),
        other => panic!("unexpected report {other:?}"),
    }

    let bundle = engine.export(&user.id).await.unwrap();
    assert_eq!(bundle.budgets.len(), 1);
    assert_eq!(bundle.expenses.len(), 2);
    assert_eq!(bundle.incomes[0].source, "salary");
}

#[tokio::test]
async fn report_for_unknown_user_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.report("missing", &ReportRequest::Forecast).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
