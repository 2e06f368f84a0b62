//! First-run seeding from CSV

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_log::test;

use investor_calculator::database::CompanyRepository;
use investor_calculator::error::LedgerError;
use investor_calculator::models::{Config, StoreStats};
use investor_calculator::tools::csv_importer::seed_if_missing;

use crate::common::test_data;

fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        database_path: dir.path().join("investor.db").to_string_lossy().to_string(),
        companies_csv: test_data::fixture("companies.csv").to_string_lossy().to_string(),
        financials_csv: test_data::fixture("financial.csv").to_string_lossy().to_string(),
        ..Config::default()
    }
}

#[test]
fn test_seeds_only_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let (mut db, seeded) = seed_if_missing(&config).expect("First run failed");
    assert_eq!(seeded, Some(StoreStats { companies: 5, financials: 4 }));
    db.delete("XOM").unwrap();
    drop(db);

    let (db, seeded) = seed_if_missing(&config).expect("Second run failed");
    assert_eq!(seeded, None);
    assert_eq!(db.stats().unwrap(), StoreStats { companies: 4, financials: 3 });
}

#[test]
fn test_failed_seed_leaves_no_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir);
    config.financials_csv = dir.path().join("missing.csv").to_string_lossy().to_string();

    assert_matches!(seed_if_missing(&config), Err(LedgerError::Io(_)));
    assert!(!std::path::Path::new(&config.database_path).exists());
}

#[test]
fn test_orphan_financial_rolls_back_seed() {
    let dir = tempfile::tempdir().unwrap();
    let financials = dir.path().join("financial.csv");
    std::fs::write(
        &financials,
        "ticker,ebitda,sales,net_profit,market_price,net_debt,assets,equity,cash_equivalents,liabilities\n\
         GHOST,1,2,3,4,5,6,7,8,9\n",
    )
    .unwrap();
    let mut config = config_in(&dir);
    config.financials_csv = financials.to_string_lossy().to_string();

    assert_matches!(seed_if_missing(&config), Err(LedgerError::Validation(_)));
    assert!(!std::path::Path::new(&config.database_path).exists());
}

#[test]
fn test_unopenable_database_path_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir);
    config.database_path = dir
        .path()
        .join("no-such-dir")
        .join("investor.db")
        .to_string_lossy()
        .to_string();

    assert_matches!(seed_if_missing(&config), Err(LedgerError::Database(_)));
    assert!(!std::path::Path::new(&config.database_path).exists());
}
