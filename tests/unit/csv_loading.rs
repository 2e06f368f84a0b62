//! CSV bulk loading tests

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_log::test;

use investor_calculator::database::CompanyRepository;
use investor_calculator::error::{LedgerError, ValidationError};
use investor_calculator::models::StoreStats;
use investor_calculator::tools::csv_importer::{import_files, read_companies};

use crate::common::{database, test_data};

#[test]
fn test_import_fixture_files() {
    let mut db = database::init_fresh_test_database().unwrap();

    let stats = import_files(
        &mut db.manager,
        &test_data::fixture("companies.csv"),
        &test_data::fixture("financial.csv"),
    )
    .expect("Failed to import fixtures");

    assert_eq!(stats, StoreStats { companies: 5, financials: 4 });
    assert_eq!(db.manager.stats().unwrap(), stats);

    // NEWCO has no financial row and stays incomplete
    let newco = db.manager.get_company("NEWCO").unwrap().unwrap();
    assert_eq!(newco.company.sector, None);
    assert!(newco.financial.is_none());

    assert!(db.manager.get_metadata("seeded_at").unwrap().is_some());
    assert_eq!(db.manager.get_metadata("seeded_companies").unwrap().as_deref(), Some("5"));
}

#[test]
fn test_duplicate_ticker_in_input() {
    let input = "ticker,name,sector\nMOON,Moon Corp,Tech\nMOON,Moon Again,Tech\n";
    let companies = read_companies(input.as_bytes()).unwrap();

    let mut db = database::init_fresh_test_database().unwrap();
    let err = db.manager.import_records(&companies, &[]).unwrap_err();
    assert_matches!(err, LedgerError::DuplicateKey { .. });
    assert_eq!(db.manager.stats().unwrap().companies, 0);
}

#[test]
fn test_blank_name_is_rejected_with_line() {
    let input = "ticker,name,sector\nMOON,Moon Corp,Tech\nSUN,,Energy\n";
    assert_matches!(
        read_companies(input.as_bytes()),
        Err(LedgerError::Validation(ValidationError::InvalidCsvRow { line: 3, .. }))
    );
}
