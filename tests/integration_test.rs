use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Output};

use anyhow::{anyhow, Result};

fn run_report(args: &[&str]) -> Result<Output> {
    let binary_path = env!("CARGO_BIN_EXE_finance-tracker");

    Ok(Command::new(binary_path)
        .arg("report")
        .args(args)
        .output()?)
}

/// Splits the report into its blank-line separated CSV sections.
fn sections(stdout: &str) -> Vec<Vec<Vec<String>>> {
    stdout.split("\n\n")
        .map(|section| {
            section.lines()
                .map(|line| line.split(',').map(str::to_string).collect())
                .collect()
        })
        .collect()
}

fn rows_by_name(section: &[Vec<String>]) -> HashMap<String, Vec<String>> {
    section.iter()
        .skip(1)
        .map(|row| (row[0].clone(), row.clone()))
        .collect()
}

#[test]
fn test_offline_report_from_samples() -> Result<()> {
    let transactions = Path::new("samples").join("transactions.csv");
    let budgets = Path::new("samples").join("budgets.csv");

    let output = run_report(&[
        "--transactions", &transactions.to_string_lossy(),
        "--budgets", &budgets.to_string_lossy()
    ])?;

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let sections = sections(&stdout);

    assert_eq!(sections.len(), 4);

    let stats = &sections[0];
    assert_eq!(stats[0], vec!["income", "expenses", "balance", "savings_rate"]);
    let figures: Vec<f64> = stats[1].iter().map(|value| value.parse()).collect::<Result<_, _>>()?;
    assert_eq!(figures, vec![3500.0, 1400.0, 2100.0, 60.0]);

    let breakdown = &sections[1];
    assert_eq!(breakdown[0], vec!["group", "expense", "percentage"]);
    let names: Vec<&str> = breakdown.iter().skip(1).map(|row| row[0].as_str()).collect();
    assert_eq!(names, vec!["food", "Uncategorized", "housing"]);

    let breakdown = rows_by_name(breakdown);
    let food = breakdown.get("food").ok_or_else(|| anyhow!("food missing from breakdown"))?;
    assert_eq!(food[1].parse::<f64>()?, 160.0);
    assert_eq!(food[2].parse::<f64>()?, 11.4);

    let budgets = rows_by_name(&sections[3]);
    let housing = budgets.get("b2").ok_or_else(|| anyhow!("housing budget missing from output"))?;
    assert_eq!(housing[2], "Housing");
    assert_eq!(housing[4].parse::<f64>()?, 1200.0);
    assert_eq!(housing[5].parse::<f64>()?, 100.0);
    assert_eq!(housing[6].parse::<f64>()?, -200.0);
    assert_eq!(housing[7], "exceeded");

    let food = budgets.get("b1").ok_or_else(|| anyhow!("food budget missing from output"))?;
    assert_eq!(food[7], "normal");

    Ok(())
}

#[test]
fn test_offline_report_groups_by_month() -> Result<()> {
    let transactions = Path::new("samples").join("transactions.csv");

    let output = run_report(&["--transactions", &transactions.to_string_lossy(), "--group-by", "month"])?;

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let sections = sections(&stdout);

    assert_eq!(sections.len(), 3);

    let months: Vec<&str> = sections[2].iter().skip(1).map(|row| row[0].as_str()).collect();
    assert_eq!(months, vec!["Mar 2025", "Apr 2025"]);

    Ok(())
}

#[test]
fn test_missing_csv_fails() -> Result<()> {
    let output = run_report(&["--transactions", "samples/does-not-exist.csv"])?;

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("does-not-exist.csv"));

    Ok(())
}
