use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::models::{Company, CompanyRecord, Financial, FinancialUpdate, StoreStats};

const FINANCIAL_COLUMNS: &str = "f.ticker, f.ebitda, f.sales, f.net_profit, f.market_price, \
     f.net_debt, f.assets, f.equity, f.cash_equivalents, f.liabilities";

/// Access layer over the company and financial tables.
///
/// Every mutating call is a single transaction: it either fully commits or
/// leaves the store untouched.
#[cfg_attr(test, mockall::automock)]
pub trait CompanyRepository {
    /// Insert a company and, when given, its financial record.
    fn create(&mut self, company: Company, financial: Option<Financial>) -> LedgerResult<()>;

    /// Companies whose name contains `text`, ignoring ASCII case, ordered by ticker.
    ///
    /// `text` is matched as given, surrounding whitespace included.
    fn find_by_name_substring(&self, text: &str) -> LedgerResult<Vec<Company>>;

    fn get_company(&self, ticker: &str) -> LedgerResult<Option<CompanyRecord>>;

    /// Apply a partial update and return the stored record.
    fn update_financial(&mut self, ticker: &str, update: FinancialUpdate) -> LedgerResult<Financial>;

    /// Remove a company together with its financial record.
    fn delete(&mut self, ticker: &str) -> LedgerResult<()>;

    /// All companies ordered by ticker.
    fn list_all(&self) -> LedgerResult<Vec<Company>>;

    /// All financial records ordered by ticker.
    fn list_financials(&self) -> LedgerResult<Vec<Financial>>;

    fn stats(&self) -> LedgerResult<StoreStats>;
}

/// SQLite-backed record store.
#[derive(Debug)]
pub struct DatabaseManager {
    connection: Connection,
}

impl DatabaseManager {
    /// Open (creating if needed) the database at the given path
    pub fn new(database_path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = database_path.as_ref();
        let db = Self::from_connection(Connection::open(path)?)?;
        info!("Database initialized at {}", path.display());
        Ok(db)
    }

    /// Private in-memory store, used by tests and dry runs.
    pub fn in_memory() -> LedgerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> LedgerResult<Self> {
        connection.pragma_update(None, "foreign_keys", true)?;
        let db = DatabaseManager { connection };
        db.run_migrations()?;
        Ok(db)
    }

    /// Create tables if they are not there yet
    fn run_migrations(&self) -> LedgerResult<()> {
        self.connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS companies (
                ticker TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sector TEXT
            );

            CREATE TABLE IF NOT EXISTS financial (
                ticker TEXT PRIMARY KEY
                    REFERENCES companies(ticker) ON DELETE CASCADE,
                ebitda REAL,
                sales REAL,
                net_profit REAL,
                market_price REAL,
                net_debt REAL,
                assets REAL,
                equity REAL,
                cash_equivalents REAL,
                liabilities REAL
            );

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name);",
        )?;

        debug!("Database schema ready");
        Ok(())
    }

    /// Insert a full data set in one transaction, used by the bulk loader.
    ///
    /// Companies go in first so every financial row can be checked against them.
    pub fn import_records(
        &mut self,
        companies: &[Company],
        financials: &[Financial],
    ) -> LedgerResult<StoreStats> {
        let tx = self.connection.transaction()?;

        for company in companies {
            if company_exists(&tx, &company.ticker)? {
                return Err(LedgerError::duplicate(&company.ticker));
            }
            insert_company(&tx, company)?;
        }

        for financial in financials {
            if !company_exists(&tx, &financial.ticker)? {
                return Err(ValidationError::OrphanFinancial {
                    ticker: financial.ticker.clone(),
                }
                .into());
            }
            if financial_exists(&tx, &financial.ticker)? {
                return Err(LedgerError::duplicate(&financial.ticker));
            }
            upsert_financial(&tx, financial)?;
        }

        put_metadata(&tx, "seeded_at", &Utc::now().to_rfc3339())?;
        put_metadata(&tx, "seeded_companies", &companies.len().to_string())?;
        put_metadata(&tx, "seeded_financials", &financials.len().to_string())?;
        tx.commit()?;

        info!(
            "Imported {} companies and {} financial records",
            companies.len(),
            financials.len()
        );
        Ok(StoreStats {
            companies: companies.len(),
            financials: financials.len(),
        })
    }

    /// Get system metadata
    pub fn get_metadata(&self, key: &str) -> LedgerResult<Option<String>> {
        let value = self
            .connection
            .query_row("SELECT value FROM metadata WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> LedgerResult<()> {
        put_metadata(&self.connection, key, value)
    }
}

impl CompanyRepository for DatabaseManager {
    fn create(&mut self, company: Company, financial: Option<Financial>) -> LedgerResult<()> {
        let company = company.validated()?;
        let financial = financial.map(|f| Financial {
            ticker: company.ticker.clone(),
            ..f
        });
        if let Some(financial) = &financial {
            financial.validate()?;
        }

        let tx = self.connection.transaction()?;
        if company_exists(&tx, &company.ticker)? {
            warn!("Rejected duplicate ticker {}", company.ticker);
            return Err(LedgerError::duplicate(&company.ticker));
        }
        insert_company(&tx, &company)?;
        if let Some(financial) = &financial {
            upsert_financial(&tx, financial)?;
        }
        tx.commit()?;

        info!("Created company {} ({})", company.ticker, company.name);
        Ok(())
    }

    fn find_by_name_substring(&self, text: &str) -> LedgerResult<Vec<Company>> {
        let mut stmt = self.connection.prepare(
            "SELECT ticker, name, sector FROM companies
             WHERE instr(lower(name), lower(?1)) > 0
             ORDER BY ticker",
        )?;
        let companies = stmt
            .query_map(params![text], company_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Name search '{}' matched {} companies", text, companies.len());
        Ok(companies)
    }

    fn get_company(&self, ticker: &str) -> LedgerResult<Option<CompanyRecord>> {
        let sql = format!(
            "SELECT c.ticker, c.name, c.sector, {FINANCIAL_COLUMNS}
             FROM companies c LEFT JOIN financial f ON f.ticker = c.ticker
             WHERE c.ticker = ?1"
        );
        let record = self
            .connection
            .query_row(&sql, params![ticker.trim()], |row| {
                let company = company_from_row(row)?;
                let financial = match row.get::<_, Option<String>>(3)? {
                    Some(_) => Some(financial_from_row(row, 3)?),
                    None => None,
                };
                Ok(CompanyRecord { company, financial })
            })
            .optional()?;
        Ok(record)
    }

    fn update_financial(&mut self, ticker: &str, update: FinancialUpdate) -> LedgerResult<Financial> {
        update.validate()?;
        let ticker = ticker.trim();

        let tx = self.connection.transaction()?;
        if !company_exists(&tx, ticker)? {
            return Err(LedgerError::not_found(ticker));
        }
        let existing = select_financial(&tx, ticker)?;
        let (mut financial, created) = match existing {
            Some(financial) if update.is_noop() => {
                debug!("Nothing to change for {}", ticker);
                return Ok(financial);
            }
            Some(financial) => (financial, false),
            None => (Financial::empty(ticker), true),
        };
        financial.apply(&update);
        upsert_financial(&tx, &financial)?;
        tx.commit()?;

        if created {
            info!("Created financial record for {}", ticker);
        } else {
            info!("Updated financial record for {}", ticker);
        }
        Ok(financial)
    }

    fn delete(&mut self, ticker: &str) -> LedgerResult<()> {
        let ticker = ticker.trim();

        let tx = self.connection.transaction()?;
        tx.execute("DELETE FROM financial WHERE ticker = ?1", params![ticker])?;
        let removed = tx.execute("DELETE FROM companies WHERE ticker = ?1", params![ticker])?;
        if removed == 0 {
            return Err(LedgerError::not_found(ticker));
        }
        tx.commit()?;

        info!("Deleted company {}", ticker);
        Ok(())
    }

    fn list_all(&self) -> LedgerResult<Vec<Company>> {
        let mut stmt = self
            .connection
            .prepare("SELECT ticker, name, sector FROM companies ORDER BY ticker")?;
        let companies = stmt
            .query_map([], company_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(companies)
    }

    fn list_financials(&self) -> LedgerResult<Vec<Financial>> {
        let sql = format!(
            "SELECT {FINANCIAL_COLUMNS}, c.ticker
             FROM financial f LEFT JOIN companies c ON c.ticker = f.ticker
             ORDER BY f.ticker"
        );
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((financial_from_row(row, 0)?, row.get::<_, Option<String>>(10)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut financials = Vec::with_capacity(rows.len());
        for (financial, owner) in rows {
            if owner.is_none() {
                return Err(LedgerError::Integrity(format!(
                    "financial record '{}' has no company",
                    financial.ticker
                )));
            }
            financials.push(financial);
        }
        Ok(financials)
    }

    fn stats(&self) -> LedgerResult<StoreStats> {
        let companies: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
        let financials: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM financial", [], |row| row.get(0))?;

        Ok(StoreStats {
            companies: companies as usize,
            financials: financials as usize,
        })
    }
}

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        ticker: row.get(0)?,
        name: row.get(1)?,
        sector: row.get(2)?,
    })
}

/// Read the ten financial columns starting at `offset`.
fn financial_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Financial> {
    Ok(Financial {
        ticker: row.get(offset)?,
        ebitda: row.get(offset + 1)?,
        sales: row.get(offset + 2)?,
        net_profit: row.get(offset + 3)?,
        market_price: row.get(offset + 4)?,
        net_debt: row.get(offset + 5)?,
        assets: row.get(offset + 6)?,
        equity: row.get(offset + 7)?,
        cash_equivalents: row.get(offset + 8)?,
        liabilities: row.get(offset + 9)?,
    })
}

fn company_exists(conn: &Connection, ticker: &str) -> LedgerResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM companies WHERE ticker = ?1", params![ticker], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn financial_exists(conn: &Connection, ticker: &str) -> LedgerResult<bool> {
    Ok(select_financial(conn, ticker)?.is_some())
}

fn select_financial(conn: &Connection, ticker: &str) -> LedgerResult<Option<Financial>> {
    let sql = format!("SELECT {FINANCIAL_COLUMNS} FROM financial f WHERE f.ticker = ?1");
    let financial = conn
        .query_row(&sql, params![ticker], |row| financial_from_row(row, 0))
        .optional()?;
    Ok(financial)
}

fn insert_company(conn: &Connection, company: &Company) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO companies (ticker, name, sector) VALUES (?1, ?2, ?3)",
        params![company.ticker, company.name, company.sector],
    )?;
    Ok(())
}

fn upsert_financial(conn: &Connection, financial: &Financial) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO financial (
            ticker, ebitda, sales, net_profit, market_price,
            net_debt, assets, equity, cash_equivalents, liabilities
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(ticker) DO UPDATE SET
            ebitda = excluded.ebitda,
            sales = excluded.sales,
            net_profit = excluded.net_profit,
            market_price = excluded.market_price,
            net_debt = excluded.net_debt,
            assets = excluded.assets,
            equity = excluded.equity,
            cash_equivalents = excluded.cash_equivalents,
            liabilities = excluded.liabilities",
        params![
            financial.ticker,
            financial.ebitda,
            financial.sales,
            financial.net_profit,
            financial.market_price,
            financial.net_debt,
            financial.assets,
            financial.equity,
            financial.cash_equivalents,
            financial.liabilities
        ],
    )?;
    Ok(())
}

fn put_metadata(conn: &Connection, key: &str, value: &str) -> LedgerResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value, updated_at) VALUES (?1, ?2, ?3)",
        params![key, value, Utc::now()],
    )?;
    Ok(())
}
