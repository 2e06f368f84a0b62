use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::{info, warn};

use crate::database::DatabaseManager;
use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::models::{validate_ticker, Company, Config, Financial, FinancialField, StoreStats};

#[derive(Debug, Deserialize)]
struct CompanyRow {
    ticker: String,
    name: Option<String>,
    sector: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinancialRow {
    ticker: String,
    ebitda: Option<String>,
    sales: Option<String>,
    net_profit: Option<String>,
    market_price: Option<String>,
    net_debt: Option<String>,
    assets: Option<String>,
    equity: Option<String>,
    cash_equivalents: Option<String>,
    liabilities: Option<String>,
}

impl FinancialRow {
    fn raw(&self, field: FinancialField) -> Option<&str> {
        let value = match field {
            FinancialField::Ebitda => &self.ebitda,
            FinancialField::Sales => &self.sales,
            FinancialField::NetProfit => &self.net_profit,
            FinancialField::MarketPrice => &self.market_price,
            FinancialField::NetDebt => &self.net_debt,
            FinancialField::Assets => &self.assets,
            FinancialField::Equity => &self.equity,
            FinancialField::CashEquivalents => &self.cash_equivalents,
            FinancialField::Liabilities => &self.liabilities,
        };
        value.as_deref()
    }
}

fn row_error(line: u64, err: impl ToString) -> LedgerError {
    ValidationError::InvalidCsvRow {
        line,
        reason: err.to_string(),
    }
    .into()
}

/// Walk every data row of a headed CSV source, handing each to `f` with its line number.
fn for_each_row<R, T, F>(reader: R, mut f: F) -> LedgerResult<()>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
    F: FnMut(u64, T) -> LedgerResult<()>,
{
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut record = StringRecord::new();

    while rdr.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| row_error(line, e))?;
        f(line, row)?;
    }
    Ok(())
}

/// Parse company rows (`ticker,name,sector`); a blank sector is stored as missing.
pub fn read_companies<R: Read>(reader: R) -> LedgerResult<Vec<Company>> {
    let mut companies = Vec::new();
    for_each_row(reader, |line, row: CompanyRow| {
        let company = Company::new(row.ticker, row.name.unwrap_or_default(), row.sector)
            .validated()
            .map_err(|e| row_error(line, e))?;
        companies.push(company);
        Ok(())
    })?;
    Ok(companies)
}

/// Parse financial rows (`ticker` plus the nine figures); a blank cell is stored as missing.
pub fn read_financials<R: Read>(reader: R) -> LedgerResult<Vec<Financial>> {
    let mut financials = Vec::new();
    for_each_row(reader, |line, row: FinancialRow| {
        let ticker = validate_ticker(&row.ticker).map_err(|e| row_error(line, e))?;
        let mut financial = Financial::empty(ticker);
        for field in FinancialField::ALL {
            let value = match row.raw(field) {
                Some(raw) => field.parse_value(raw).map_err(|e| row_error(line, e))?,
                None => None,
            };
            financial.set(field, value);
        }
        financials.push(financial);
        Ok(())
    })?;
    Ok(financials)
}

/// Load both CSV files into the store in a single transaction.
pub fn import_files(
    db: &mut DatabaseManager,
    companies_csv: &Path,
    financials_csv: &Path,
) -> LedgerResult<StoreStats> {
    let companies = read_companies(File::open(companies_csv)?)?;
    let financials = read_financials(File::open(financials_csv)?)?;
    info!(
        "Read {} companies from {} and {} financial records from {}",
        companies.len(),
        companies_csv.display(),
        financials.len(),
        financials_csv.display()
    );
    db.import_records(&companies, &financials)
}

/// Open the configured store, seeding it from CSV only when the database file is new.
///
/// Returns the load statistics when seeding ran. A failed open or seed
/// removes the half-created file so the next start tries again.
pub fn seed_if_missing(config: &Config) -> LedgerResult<(DatabaseManager, Option<StoreStats>)> {
    let db_path = Path::new(&config.database_path);
    if db_path.exists() {
        info!("Using existing database {}", db_path.display());
        return Ok((DatabaseManager::new(db_path)?, None));
    }

    // Read the inputs before touching the filesystem.
    let companies = read_companies(File::open(&config.companies_csv)?)?;
    let financials = read_financials(File::open(&config.financials_csv)?)?;

    let seeded = DatabaseManager::new(db_path).and_then(|mut db| {
        let stats = db.import_records(&companies, &financials)?;
        Ok((db, stats))
    });
    match seeded {
        Ok((db, stats)) => Ok((db, Some(stats))),
        Err(e) => {
            warn!("Seeding failed, removing {}: {}", db_path.display(), e);
            discard_partial(db_path);
            Err(e)
        }
    }
}

/// Remove a database file left behind by a failed seed.
fn discard_partial(db_path: &Path) {
    if !db_path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(db_path) {
        warn!(
            "Could not remove {}; delete it before the next start or seeding will be skipped: {}",
            db_path.display(),
            e
        );
    }
}
