//! Record store tests against a file-backed database

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_log::test;

use investor_calculator::database::{CompanyRepository, DatabaseManager};
use investor_calculator::error::LedgerError;
use investor_calculator::models::{Company, FieldUpdate, Financial, FinancialField, FinancialUpdate};

use crate::common::{database, logging, test_data};

#[test]
fn test_create_then_find_by_exact_name() {
    logging::log_test_step("Testing create followed by name lookup");
    let mut db = database::init_fresh_test_database().expect("Failed to create test database");

    let (company, financial) = test_data::create_test_company("MOON", "Moon Corp");
    db.manager.create(company.clone(), Some(financial)).expect("Failed to create company");

    let found = db.manager.find_by_name_substring("Moon Corp").unwrap();
    assert_eq!(found, vec![company]);
}

#[test]
fn test_list_all_is_ordered_by_ticker() {
    let mut db = database::init_fresh_test_database().unwrap();
    database::insert_sample_companies(&mut db.manager).unwrap();

    let tickers: Vec<String> = db.manager.list_all().unwrap().into_iter().map(|c| c.ticker).collect();
    assert_eq!(tickers, vec!["AAPL", "AMZN", "GOOGL", "MSFT", "TSLA"]);
}

#[test]
fn test_name_search_matches_substring_any_case() {
    let mut db = database::init_fresh_test_database().unwrap();
    database::insert_sample_companies(&mut db.manager).unwrap();

    let found: Vec<String> = db
        .manager
        .find_by_name_substring("INC")
        .unwrap()
        .into_iter()
        .map(|c| c.ticker)
        .collect();
    logging::log_test_data("Matches for 'INC'", &found);
    assert_eq!(found, vec!["AAPL", "AMZN", "GOOGL", "TSLA"]);
}

#[test]
fn test_duplicate_create_is_rejected() {
    let mut db = database::init_fresh_test_database().unwrap();
    let (company, financial) = test_data::create_test_company("MOON", "Moon Corp");
    db.manager.create(company.clone(), Some(financial)).unwrap();

    let result = db.manager.create(company, None);
    assert_matches!(result, Err(LedgerError::DuplicateKey { ref ticker }) if ticker == "MOON");
    assert_eq!(db.manager.stats().unwrap().companies, 1);
}

#[test]
fn test_update_preserves_unmentioned_and_clears_blank_fields() {
    let mut db = database::init_fresh_test_database().unwrap();
    let (company, financial) = test_data::create_test_company("MOON", "Moon Corp");
    db.manager.create(company, Some(financial.clone())).unwrap();

    let update = FinancialUpdate::new()
        .with(FinancialField::NetProfit, FieldUpdate::Set(40.0))
        .with(FinancialField::Equity, FieldUpdate::Clear);
    let stored = db.manager.update_financial("MOON", update).unwrap();

    let expected = Financial {
        net_profit: Some(40.0),
        equity: None,
        ..financial
    };
    assert_eq!(stored, expected);

    let record = db.manager.get_company("MOON").unwrap().unwrap();
    assert_eq!(record.financial, Some(expected));
}

#[test]
fn test_update_unknown_ticker_is_not_found() {
    let mut db = database::init_fresh_test_database().unwrap();
    let result = db.manager.update_financial("GHOST", FinancialUpdate::new());
    assert_matches!(result, Err(LedgerError::NotFound { .. }));
    assert_eq!(db.manager.stats().unwrap().financials, 0);
}

#[test]
fn test_delete_removes_company_and_financial() {
    let mut db = database::init_fresh_test_database().unwrap();
    database::insert_sample_companies(&mut db.manager).unwrap();

    db.manager.delete("MSFT").unwrap();

    assert!(db.manager.get_company("MSFT").unwrap().is_none());
    assert!(db.manager.find_by_name_substring("Microsoft").unwrap().is_empty());
    assert!(db.manager.list_financials().unwrap().iter().all(|f| f.ticker != "MSFT"));
    assert_matches!(db.manager.delete("MSFT"), Err(LedgerError::NotFound { .. }));
    assert_matches!(
        db.manager.update_financial("MSFT", FinancialUpdate::new()),
        Err(LedgerError::NotFound { .. })
    );
}

#[test]
fn test_changes_survive_reopen() {
    let mut db = database::init_fresh_test_database().unwrap();
    db.manager
        .create(Company::new("MOON", "Moon Corp", None), Some(Financial::empty("MOON")))
        .unwrap();

    let reopened = DatabaseManager::new(&db.path).unwrap();
    let record = reopened.get_company("MOON").unwrap().unwrap();
    assert_eq!(record.company.name, "Moon Corp");
    assert_eq!(record.financial, Some(Financial::empty("MOON")));
}
