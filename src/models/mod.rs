use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MAX_TICKER_LEN: usize = 10;

/// Core company information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub ticker: String,
    pub name: String,
    pub sector: Option<String>,
}

impl Company {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>, sector: Option<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            sector,
        }
    }

    /// Trim the text fields and reject a malformed ticker or a blank name.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let ticker = validate_ticker(&self.ticker)?;
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let sector = self
            .sector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(Self { ticker, name, sector })
    }
}

/// Raw financial statement figures for one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financial {
    pub ticker: String,
    pub ebitda: Option<f64>,
    pub sales: Option<f64>,
    pub net_profit: Option<f64>,
    pub market_price: Option<f64>,
    pub net_debt: Option<f64>,
    pub assets: Option<f64>,
    pub equity: Option<f64>,
    pub cash_equivalents: Option<f64>,
    pub liabilities: Option<f64>,
}

impl Financial {
    /// A record with every figure missing.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: FinancialField) -> Option<f64> {
        match field {
            FinancialField::Ebitda => self.ebitda,
            FinancialField::Sales => self.sales,
            FinancialField::NetProfit => self.net_profit,
            FinancialField::MarketPrice => self.market_price,
            FinancialField::NetDebt => self.net_debt,
            FinancialField::Assets => self.assets,
            FinancialField::Equity => self.equity,
            FinancialField::CashEquivalents => self.cash_equivalents,
            FinancialField::Liabilities => self.liabilities,
        }
    }

    fn slot_mut(&mut self, field: FinancialField) -> &mut Option<f64> {
        match field {
            FinancialField::Ebitda => &mut self.ebitda,
            FinancialField::Sales => &mut self.sales,
            FinancialField::NetProfit => &mut self.net_profit,
            FinancialField::MarketPrice => &mut self.market_price,
            FinancialField::NetDebt => &mut self.net_debt,
            FinancialField::Assets => &mut self.assets,
            FinancialField::Equity => &mut self.equity,
            FinancialField::CashEquivalents => &mut self.cash_equivalents,
            FinancialField::Liabilities => &mut self.liabilities,
        }
    }

    pub fn set(&mut self, field: FinancialField, value: Option<f64>) {
        *self.slot_mut(field) = value;
    }

    /// Apply a partial update in place; `Keep` entries leave the figure untouched.
    pub fn apply(&mut self, update: &FinancialUpdate) {
        for field in FinancialField::ALL {
            match update.get(field) {
                FieldUpdate::Keep => {}
                FieldUpdate::Clear => self.set(field, None),
                FieldUpdate::Set(value) => self.set(field, Some(value)),
            }
        }
    }

    /// Reject NaN and infinite figures before they reach the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in FinancialField::ALL {
            if let Some(value) = self.get(field) {
                if !value.is_finite() {
                    return Err(ValidationError::NonFiniteNumber { field: field.column() });
                }
            }
        }
        Ok(())
    }
}

/// The nine figures a financial record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancialField {
    Ebitda,
    Sales,
    NetProfit,
    MarketPrice,
    NetDebt,
    Assets,
    Equity,
    CashEquivalents,
    Liabilities,
}

impl FinancialField {
    /// Column order of the `financial` table and the CSV file.
    pub const ALL: [FinancialField; 9] = [
        FinancialField::Ebitda,
        FinancialField::Sales,
        FinancialField::NetProfit,
        FinancialField::MarketPrice,
        FinancialField::NetDebt,
        FinancialField::Assets,
        FinancialField::Equity,
        FinancialField::CashEquivalents,
        FinancialField::Liabilities,
    ];

    pub fn column(self) -> &'static str {
        match self {
            FinancialField::Ebitda => "ebitda",
            FinancialField::Sales => "sales",
            FinancialField::NetProfit => "net_profit",
            FinancialField::MarketPrice => "market_price",
            FinancialField::NetDebt => "net_debt",
            FinancialField::Assets => "assets",
            FinancialField::Equity => "equity",
            FinancialField::CashEquivalents => "cash_equivalents",
            FinancialField::Liabilities => "liabilities",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FinancialField::Ebitda => "ebitda",
            FinancialField::Sales => "sales",
            FinancialField::NetProfit => "net profit",
            FinancialField::MarketPrice => "market price",
            FinancialField::NetDebt => "net debt",
            FinancialField::Assets => "assets",
            FinancialField::Equity => "equity",
            FinancialField::CashEquivalents => "cash equivalents",
            FinancialField::Liabilities => "liabilities",
        }
    }

    /// Parse a raw cell or answer: blank means missing, anything else must be a finite number.
    pub fn parse_value(self, raw: &str) -> Result<Option<f64>, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value: f64 = trimmed.parse().map_err(|_| ValidationError::InvalidNumber {
            field: self.column(),
            value: trimmed.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteNumber { field: self.column() });
        }
        Ok(Some(value))
    }
}

impl fmt::Display for FinancialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do with one figure during an update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldUpdate {
    #[default]
    Keep,
    Clear,
    Set(f64),
}

impl FieldUpdate {
    /// Map interactive input: a blank answer clears the figure.
    pub fn from_input(field: FinancialField, raw: &str) -> Result<Self, ValidationError> {
        Ok(match field.parse_value(raw)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        })
    }
}

/// Partial update of a financial record, one entry per named figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialUpdate {
    pub ebitda: FieldUpdate,
    pub sales: FieldUpdate,
    pub net_profit: FieldUpdate,
    pub market_price: FieldUpdate,
    pub net_debt: FieldUpdate,
    pub assets: FieldUpdate,
    pub equity: FieldUpdate,
    pub cash_equivalents: FieldUpdate,
    pub liabilities: FieldUpdate,
}

impl FinancialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FinancialField, update: FieldUpdate) -> Self {
        *self.slot_mut(field) = update;
        self
    }

    pub fn get(&self, field: FinancialField) -> FieldUpdate {
        match field {
            FinancialField::Ebitda => self.ebitda,
            FinancialField::Sales => self.sales,
            FinancialField::NetProfit => self.net_profit,
            FinancialField::MarketPrice => self.market_price,
            FinancialField::NetDebt => self.net_debt,
            FinancialField::Assets => self.assets,
            FinancialField::Equity => self.equity,
            FinancialField::CashEquivalents => self.cash_equivalents,
            FinancialField::Liabilities => self.liabilities,
        }
    }

    fn slot_mut(&mut self, field: FinancialField) -> &mut FieldUpdate {
        match field {
            FinancialField::Ebitda => &mut self.ebitda,
            FinancialField::Sales => &mut self.sales,
            FinancialField::NetProfit => &mut self.net_profit,
            FinancialField::MarketPrice => &mut self.market_price,
            FinancialField::NetDebt => &mut self.net_debt,
            FinancialField::Assets => &mut self.assets,
            FinancialField::Equity => &mut self.equity,
            FinancialField::CashEquivalents => &mut self.cash_equivalents,
            FinancialField::Liabilities => &mut self.liabilities,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in FinancialField::ALL {
            if let FieldUpdate::Set(value) = self.get(field) {
                if !value.is_finite() {
                    return Err(ValidationError::NonFiniteNumber { field: field.column() });
                }
            }
        }
        Ok(())
    }

    pub fn is_noop(&self) -> bool {
        FinancialField::ALL
            .iter()
            .all(|field| self.get(*field) == FieldUpdate::Keep)
    }
}

/// A company together with its financial record, if it has one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRecord {
    pub company: Company,
    pub financial: Option<Financial>,
}

/// Row counts for the status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub companies: usize,
    pub financials: usize,
}

/// Normalize a ticker and check it is 1..=10 ASCII alphanumerics, `.` or `-`.
pub fn validate_ticker(raw: &str) -> Result<String, ValidationError> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(ValidationError::EmptyTicker);
    }
    if ticker.chars().count() > MAX_TICKER_LEN {
        return Err(ValidationError::TickerTooLong {
            ticker: ticker.to_string(),
            max: MAX_TICKER_LEN,
        });
    }
    if let Some(ch) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
    {
        return Err(ValidationError::TickerInvalidChar {
            ticker: ticker.to_string(),
            ch,
        });
    }
    Ok(ticker.to_string())
}

/// Configuration for the application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: String,
    pub companies_csv: String,
    pub financials_csv: String,
    pub top_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "investor.db".to_string(),
            companies_csv: "data/companies.csv".to_string(),
            financials_csv: "data/financial.csv".to_string(),
            top_limit: crate::analysis::DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Config {
            database_path: lookup("INVESTOR_DB_PATH").unwrap_or(defaults.database_path),
            companies_csv: lookup("INVESTOR_COMPANIES_CSV").unwrap_or(defaults.companies_csv),
            financials_csv: lookup("INVESTOR_FINANCIALS_CSV").unwrap_or(defaults.financials_csv),
            top_limit: lookup("INVESTOR_TOP_LIMIT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.top_limit),
        }
    }
}
