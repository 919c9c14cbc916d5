use super::{display_name, format_currency, format_percentage, lookup, percentage_of, total, TransactionType};
use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

#[test]
fn test_percentage_of_handles_positive_and_zero_wholes() -> Result<()> {
    assert_eq!(percentage_of(Decimal::from(85), Decimal::from(100)), Decimal::from(85));
    assert_eq!(percentage_of(Decimal::from(50), Decimal::from(200)), Decimal::from(25));
    assert_eq!(percentage_of(Decimal::from(50), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(percentage_of(Decimal::from(50), Decimal::from_str("-10")?), Decimal::ZERO);

    Ok(())
}

#[test]
fn test_percentage_of_saturates_instead_of_overflowing() -> Result<()> {
    let tiny = Decimal::from_str("0.0000000000000000000001")?;

    assert_eq!(percentage_of(Decimal::from(10_000_000), tiny), Decimal::MAX);
    assert_eq!(percentage_of(Decimal::from(-10_000_000), tiny), Decimal::MIN);
    assert_eq!(percentage_of(Decimal::MAX, Decimal::ONE), Decimal::MAX);

    Ok(())
}

#[test]
fn test_total_saturates_at_the_decimal_range() {
    assert_eq!(total([Decimal::from(2), Decimal::from(3)]), Decimal::from(5));
    assert_eq!(total([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
    assert_eq!(total(Vec::new()), Decimal::ZERO);
}

#[test]
fn test_currency_is_formatted_with_separators_and_sign() -> Result<()> {
    let test_cases = vec![
        ("0", "$0.00"),
        ("12.5", "$12.50"),
        ("1234.567", "$1,234.57"),
        ("1000000", "$1,000,000.00"),
        ("-42.005", "-$42.01"),
        ("-0.001", "$0.00"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(format_currency(Decimal::from_str(input)?), expected);
    }

    Ok(())
}

#[test]
fn test_percentage_is_formatted_with_one_decimal() -> Result<()> {
    assert_eq!(format_percentage(Decimal::from(85)), "85.0%");
    assert_eq!(format_percentage(Decimal::from_str("33.333")?), "33.3%");
    assert_eq!(format_percentage(Decimal::from_str("-12.25")?), "-12.3%");
    assert_eq!(format_percentage(Decimal::from(1500)), "1,500.0%");

    Ok(())
}

#[test]
fn test_transaction_type_parses_case_insensitively() -> Result<()> {
    assert_eq!(TransactionType::from_str("income")?, TransactionType::Income);
    assert_eq!(TransactionType::from_str(" Expense ")?, TransactionType::Expense);
    assert!(TransactionType::from_str("transfer").is_err());
    assert_eq!(TransactionType::Expense.to_string(), "expense");

    Ok(())
}

#[test]
fn test_transaction_type_serializes_lowercase() -> Result<()> {
    assert_eq!(serde_json::to_string(&TransactionType::Income)?, "\"income\"");
    assert_eq!(serde_json::from_str::<TransactionType>("\"Expense\"")?, TransactionType::Expense);

    Ok(())
}

#[test]
fn test_category_catalog_lookup() {
    assert_eq!(lookup("food").map(|category| category.name), Some("Food & Dining"));
    assert_eq!(lookup("FOOD").map(|category| category.kind), Some(TransactionType::Expense));
    assert_eq!(lookup("salary").map(|category| category.kind), Some(TransactionType::Income));
    assert!(lookup("lottery").is_none());

    assert_eq!(display_name("personal"), "Personal Care");
    assert_eq!(display_name("Groceries"), "Groceries");
}
