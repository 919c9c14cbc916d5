use super::{
    calculate_spending, AlertStatus, Budget, BudgetOverview, FilterUpdate, NewBudget, NewTransaction, Registration,
    Transaction, TransactionFilter, TransactionStats, ValidationError
};

use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::types::TransactionType;

fn day(offset: i64) -> DateTime<Utc> {
    // 2025-01-01T00:00:00Z
    DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_089 + offset)
}

fn create_transaction(id: &str, transaction_type: TransactionType, amount: &str, category: &str, description: &str, offset: i64) -> Result<Transaction> {
    Ok(Transaction {
        id: id.to_string(),
        transaction_type,
        amount: Decimal::from_str(amount)?,
        category: category.to_string(),
        description: description.to_string(),
        date: day(offset)
    })
}

fn create_budget(id: &str, category: &str, amount: &str) -> Result<Budget> {
    Ok(Budget {
        id: id.to_string(),
        category: category.to_string(),
        amount: Decimal::from_str(amount)?
    })
}

fn sample_transactions() -> Result<Vec<Transaction>> {
    Ok(vec![
        create_transaction("1", TransactionType::Income, "3000", "salary", "Monthly salary", 0)?,
        create_transaction("2", TransactionType::Expense, "45.50", "food", "Groceries at market", 2)?,
        create_transaction("3", TransactionType::Expense, "1200", "housing", "Rent", 3)?,
        create_transaction("4", TransactionType::Expense, "30", "Food", "Lunch with team", 10)?,
        create_transaction("5", TransactionType::Income, "250", "gift", "Birthday", 20)?,
    ])
}

#[test]
fn test_empty_filter_matches_everything() -> Result<()> {
    let transactions = sample_transactions()?;
    let filter = TransactionFilter::default();

    assert!(filter.is_empty());
    assert_eq!(filter.apply(&transactions), transactions);

    Ok(())
}

#[test]
fn test_search_matches_description_or_category_case_insensitively() -> Result<()> {
    let transactions = sample_transactions()?;

    let mut filter = TransactionFilter::default();
    filter.merge(FilterUpdate::new().search("LUNCH"));
    let ids: Vec<_> = filter.apply(&transactions).into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["4"]);

    filter.merge(FilterUpdate::new().search("foo"));
    let ids: Vec<_> = filter.apply(&transactions).into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["2", "4"]);

    Ok(())
}

#[test]
fn test_type_and_category_filters_require_exact_matches() -> Result<()> {
    let transactions = sample_transactions()?;

    let mut filter = TransactionFilter::default();
    filter.merge(FilterUpdate::new().transaction_type(Some(TransactionType::Income)));
    assert_eq!(filter.apply(&transactions).len(), 2);

    filter.merge(FilterUpdate::new().transaction_type(None).category(Some("food".to_string())));
    let ids: Vec<_> = filter.apply(&transactions).into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["2"]);

    Ok(())
}

#[test]
fn test_date_bounds_are_inclusive() -> Result<()> {
    let transactions = sample_transactions()?;

    let mut filter = TransactionFilter::default();
    filter.merge(FilterUpdate::new().start_date(Some(day(2))).end_date(Some(day(10))));
    let ids: Vec<_> = filter.apply(&transactions).into_iter().map(|t| t.id).collect();

    assert_eq!(ids, vec!["2", "3", "4"]);

    Ok(())
}

#[test]
fn test_filter_merge_only_touches_provided_fields() {
    let mut filter = TransactionFilter::default();
    filter.merge(FilterUpdate::new().search("rent").transaction_type(Some(TransactionType::Expense)));
    filter.merge(FilterUpdate::new().category(Some("housing".to_string())));

    assert_eq!(filter.search_query, "rent");
    assert_eq!(filter.transaction_type, Some(TransactionType::Expense));
    assert_eq!(filter.category.as_deref(), Some("housing"));
    assert!(filter.start_date.is_none());
}

#[test]
fn test_stats_balance_and_savings_rate() -> Result<()> {
    let transactions = sample_transactions()?;
    let stats = TransactionStats::from_transactions(&transactions);

    assert_eq!(stats.income, Decimal::from(3250));
    assert_eq!(stats.expenses, Decimal::from_str("1275.50")?);
    assert_eq!(stats.balance, Decimal::from_str("1974.50")?);
    assert_eq!(stats.savings_rate.round_dp(2), Decimal::from_str("60.75")?);

    Ok(())
}

#[test]
fn test_stats_without_income_have_zero_savings_rate() -> Result<()> {
    let transactions = vec![create_transaction("1", TransactionType::Expense, "20", "food", "Snacks", 0)?];
    let stats = TransactionStats::from_transactions(&transactions);

    assert_eq!(stats.balance, Decimal::from(-20));
    assert!(stats.savings_rate.is_zero());
    assert_eq!(TransactionStats::from_transactions(&Vec::<Transaction>::new()), TransactionStats::default());

    Ok(())
}

#[test]
fn test_budget_at_85_percent_is_a_warning() -> Result<()> {
    let transactions = vec![
        create_transaction("1", TransactionType::Expense, "50", "food", "Groceries", 0)?,
        create_transaction("2", TransactionType::Expense, "35", "food", "Dinner", 1)?,
    ];
    let budgets = vec![create_budget("b1", "food", "100")?];

    let statuses = calculate_spending(&transactions, &budgets);

    assert_eq!(statuses[0].spent, Decimal::from(85));
    assert_eq!(statuses[0].percentage, Decimal::from(85));
    assert_eq!(statuses[0].remaining, Decimal::from(15));
    assert_eq!(statuses[0].alert_status, AlertStatus::Warning);

    Ok(())
}

#[test]
fn test_budget_over_ceiling_is_exceeded_with_clamped_percentage() -> Result<()> {
    let transactions = vec![
        create_transaction("1", TransactionType::Expense, "100", "food", "Groceries", 0)?,
        create_transaction("2", TransactionType::Expense, "20", "food", "Dinner", 1)?,
    ];
    let budgets = vec![create_budget("b1", "food", "100")?];

    let statuses = calculate_spending(&transactions, &budgets);

    assert_eq!(statuses[0].percentage, Decimal::ONE_HUNDRED);
    assert_eq!(statuses[0].remaining, Decimal::from(-20));
    assert_eq!(statuses[0].alert_status, AlertStatus::Exceeded);

    let exact = calculate_spending(&transactions[..1], &budgets);
    assert_eq!(exact[0].alert_status, AlertStatus::Exceeded);

    Ok(())
}

#[test]
fn test_spending_matches_categories_case_insensitively_and_ignores_income() -> Result<()> {
    let transactions = vec![
        create_transaction("1", TransactionType::Expense, "10", "food", "Groceries", 0)?,
        create_transaction("2", TransactionType::Expense, "5", "FOOD", "Coffee", 0)?,
        create_transaction("3", TransactionType::Income, "500", "food", "Refund", 0)?,
        create_transaction("4", TransactionType::Expense, "70", "travel", "Train", 0)?,
    ];
    let budgets = vec![create_budget("b1", "Food", "200")?, create_budget("b2", "health", "50")?];

    let statuses = calculate_spending(&transactions, &budgets);

    assert_eq!(statuses[0].spent, Decimal::from(15));
    assert_eq!(statuses[0].alert_status, AlertStatus::Normal);
    assert!(statuses[1].spent.is_zero());
    assert!(statuses[1].percentage.is_zero());

    Ok(())
}

#[test]
fn test_zero_amount_budget_reports_zero_percentage() -> Result<()> {
    let transactions = vec![create_transaction("1", TransactionType::Expense, "10", "food", "Groceries", 0)?];
    let budgets = vec![create_budget("b1", "food", "0")?];

    let statuses = calculate_spending(&transactions, &budgets);

    assert!(statuses[0].percentage.is_zero());
    assert_eq!(statuses[0].alert_status, AlertStatus::Normal);
    assert_eq!(statuses[0].remaining, Decimal::from(-10));

    Ok(())
}

#[test]
fn test_tiny_budget_saturates_instead_of_panicking() -> Result<()> {
    let budget = NewBudget { category: "food".to_string(), amount: Decimal::from_str("0.0000000000000000000001")? };
    assert_eq!(budget.validate(), Ok(()));

    let transactions = vec![create_transaction("1", TransactionType::Expense, "10000000", "food", "Groceries", 0)?];
    let statuses = calculate_spending(&transactions, &[budget.into_budget("b1".to_string())]);

    assert_eq!(statuses[0].percentage, Decimal::ONE_HUNDRED);
    assert_eq!(statuses[0].alert_status, AlertStatus::Exceeded);

    let overview = BudgetOverview::from_statuses(&statuses);
    assert_eq!(overview.alerts.len(), 1);
    assert_eq!(overview.utilization, Decimal::MAX);

    Ok(())
}

#[test]
fn test_stats_saturate_on_huge_amounts() -> Result<()> {
    let mut huge_income = create_transaction("1", TransactionType::Income, "1", "salary", "Windfall", 0)?;
    huge_income.amount = Decimal::MAX;
    let mut huge_expense = create_transaction("2", TransactionType::Expense, "1", "food", "Feast", 0)?;
    huge_expense.amount = Decimal::MAX;

    let transactions = vec![huge_income.clone(), huge_income, huge_expense.clone(), huge_expense];
    let stats = TransactionStats::from_transactions(&transactions);

    assert_eq!(stats.income, Decimal::MAX);
    assert_eq!(stats.expenses, Decimal::MAX);
    assert_eq!(stats.balance, Decimal::ZERO);

    Ok(())
}

#[test]
fn test_budget_overview_totals_and_alerts() -> Result<()> {
    let transactions = vec![
        create_transaction("1", TransactionType::Expense, "90", "food", "Groceries", 0)?,
        create_transaction("2", TransactionType::Expense, "10", "travel", "Bus", 0)?,
    ];
    let budgets = vec![create_budget("b1", "food", "100")?, create_budget("b2", "travel", "100")?];

    let overview = BudgetOverview::from_statuses(&calculate_spending(&transactions, &budgets));

    assert_eq!(overview.total_budget, Decimal::from(200));
    assert_eq!(overview.total_spent, Decimal::from(100));
    assert_eq!(overview.remaining, Decimal::from(100));
    assert_eq!(overview.utilization, Decimal::from(50));
    assert_eq!(overview.alerts.len(), 1);
    assert_eq!(overview.alerts[0].budget.id, "b1");

    Ok(())
}

#[test]
fn test_new_transaction_validation_rules() -> Result<()> {
    let now = day(30);
    let valid = NewTransaction {
        transaction_type: TransactionType::Expense,
        amount: Decimal::from_str("12.99")?,
        category: "food".to_string(),
        description: "Pizza".to_string(),
        date: day(29)
    };

    assert!(valid.validate(now).is_ok());

    let zero_amount = NewTransaction { amount: Decimal::ZERO, ..valid.clone() };
    assert_eq!(zero_amount.validate(now), Err(ValidationError::NonPositiveAmount));

    let blank_description = NewTransaction { description: "  ".to_string(), ..valid.clone() };
    assert_eq!(blank_description.validate(now), Err(ValidationError::MissingDescription));

    let long_description = NewTransaction { description: "x".repeat(101), ..valid.clone() };
    assert!(matches!(long_description.validate(now), Err(ValidationError::DescriptionTooLong { .. })));

    let no_category = NewTransaction { category: String::new(), ..valid.clone() };
    assert_eq!(no_category.validate(now), Err(ValidationError::MissingCategory));

    let future = NewTransaction { date: day(31), ..valid };
    assert_eq!(future.validate(now), Err(ValidationError::FutureDate));

    Ok(())
}

#[test]
fn test_new_budget_validation_rules() -> Result<()> {
    assert!(NewBudget { category: "food".to_string(), amount: Decimal::from(100) }.validate().is_ok());
    assert_eq!(NewBudget { category: " ".to_string(), amount: Decimal::from(100) }.validate(), Err(ValidationError::MissingCategory));
    assert_eq!(NewBudget { category: "food".to_string(), amount: Decimal::from(-5) }.validate(), Err(ValidationError::NonPositiveAmount));

    Ok(())
}

#[test]
fn test_registration_validation_rules() {
    let valid = Registration {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "Secret123".to_string()
    };

    assert!(valid.validate().is_ok());
    assert_eq!(Registration { name: String::new(), ..valid.clone() }.validate(), Err(ValidationError::MissingName));
    assert_eq!(Registration { email: String::new(), ..valid.clone() }.validate(), Err(ValidationError::MissingEmail));
    assert_eq!(Registration { email: "ada@example".to_string(), ..valid.clone() }.validate(), Err(ValidationError::InvalidEmail));
    assert_eq!(Registration { email: "ada example@x.io".to_string(), ..valid.clone() }.validate(), Err(ValidationError::InvalidEmail));
    assert_eq!(Registration { password: "Sh0rt".to_string(), ..valid.clone() }.validate(), Err(ValidationError::PasswordTooShort { min: 8 }));
    assert_eq!(Registration { password: "alllowercase1".to_string(), ..valid }.validate(), Err(ValidationError::WeakPassword));
}

#[test]
fn test_transaction_wire_format_uses_backend_field_names() -> Result<()> {
    let json = r#"{"_id":"abc","type":"expense","amount":42.75,"category":"food","description":"Tacos","date":"2025-01-03T12:00:00Z","user":"u1"}"#;
    let transaction: Transaction = serde_json::from_str(json)?;

    assert_eq!(transaction.id, "abc");
    assert_eq!(transaction.transaction_type, TransactionType::Expense);
    assert_eq!(transaction.amount, Decimal::from_str("42.75")?);

    let value = serde_json::to_value(&transaction)?;
    assert_eq!(value["_id"], "abc");
    assert_eq!(value["type"], "expense");
    assert_eq!(value["amount"], 42.75);

    Ok(())
}

fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        0u32..10_000,
        any::<bool>(),
        1i64..1_000_000,
        prop::sample::select(vec!["food", "Food", "salary", "travel", ""]),
        prop::sample::select(vec!["Lunch", "Rent payment", "Bonus", "Taxi ride", ""]),
        0i64..365
    )
        .prop_map(|(id, is_income, cents, category, description, offset)| Transaction {
            id: format!("tx-{id}"),
            transaction_type: if is_income { TransactionType::Income } else { TransactionType::Expense },
            amount: Decimal::new(cents, 2),
            category: category.to_string(),
            description: description.to_string(),
            date: day(offset)
        })
}

fn filter_strategy() -> impl Strategy<Value = TransactionFilter> {
    (
        prop::sample::select(vec!["", "foo", "FOOD", "taxi", "rent", "zzz"]),
        prop::option::of(any::<bool>()),
        prop::option::of(prop::sample::select(vec!["food", "Food", "travel"])),
        prop::option::of(0i64..365),
        prop::option::of(0i64..365)
    )
        .prop_map(|(search, is_income, category, start, end)| TransactionFilter {
            search_query: search.to_string(),
            transaction_type: is_income.map(|income| if income { TransactionType::Income } else { TransactionType::Expense }),
            category: category.map(str::to_string),
            start_date: start.map(day),
            end_date: end.map(day)
        })
}

proptest! {
    #[test]
    fn test_filtered_transactions_are_a_subset_satisfying_every_predicate(
        transactions in prop::collection::vec(transaction_strategy(), 0..60),
        filter in filter_strategy()
    ) {
        let filtered = filter.apply(&transactions);
        let expected_count = transactions.iter().filter(|t| filter.matches(t)).count();

        prop_assert_eq!(filtered.len(), expected_count);

        for transaction in &filtered {
            prop_assert!(transactions.contains(transaction));
            prop_assert!(filter.matches(transaction));

            if let Some(kind) = filter.transaction_type {
                prop_assert_eq!(transaction.transaction_type, kind);
            }
            if let Some(start) = filter.start_date {
                prop_assert!(transaction.date >= start);
            }
            if let Some(end) = filter.end_date {
                prop_assert!(transaction.date <= end);
            }
        }
    }

    #[test]
    fn test_balance_is_always_income_minus_expenses(
        transactions in prop::collection::vec(transaction_strategy(), 0..60)
    ) {
        let stats = TransactionStats::from_transactions(&transactions);

        prop_assert_eq!(stats.balance, stats.income - stats.expenses);
        prop_assert!(stats.income >= Decimal::ZERO);
        prop_assert!(stats.expenses >= Decimal::ZERO);
    }
}
