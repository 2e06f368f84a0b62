//! Valuation and leverage ratios derived from raw financial figures.
//!
//! Every ratio is a plain quotient of two figures. A ratio is undefined
//! (`None`) when an operand is missing or the denominator is zero, never
//! infinite or NaN. Defined values are rounded to two decimals, half away
//! from zero.

pub mod ranking;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;
use crate::models::{Company, CompanyRecord, Financial, FinancialField};

pub use ranking::{rank, top_n_by_ratio, RankedEntry, TopReport, DEFAULT_TOP_N};

/// The seven ratios the calculator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Ratio {
    #[serde(rename = "P/E")]
    PriceToEarnings,
    #[serde(rename = "P/S")]
    PriceToSales,
    #[serde(rename = "P/B")]
    PriceToBook,
    #[serde(rename = "ND/EBITDA")]
    NetDebtToEbitda,
    #[serde(rename = "ROE")]
    ReturnOnEquity,
    #[serde(rename = "ROA")]
    ReturnOnAssets,
    #[serde(rename = "L/A")]
    LiabilitiesToAssets,
}

impl Ratio {
    pub const ALL: [Ratio; 7] = [
        Ratio::PriceToEarnings,
        Ratio::PriceToSales,
        Ratio::PriceToBook,
        Ratio::NetDebtToEbitda,
        Ratio::ReturnOnEquity,
        Ratio::ReturnOnAssets,
        Ratio::LiabilitiesToAssets,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Ratio::PriceToEarnings => "P/E",
            Ratio::PriceToSales => "P/S",
            Ratio::PriceToBook => "P/B",
            Ratio::NetDebtToEbitda => "ND/EBITDA",
            Ratio::ReturnOnEquity => "ROE",
            Ratio::ReturnOnAssets => "ROA",
            Ratio::LiabilitiesToAssets => "L/A",
        }
    }

    /// (numerator, denominator)
    pub fn operands(self) -> (FinancialField, FinancialField) {
        use FinancialField::*;
        match self {
            Ratio::PriceToEarnings => (MarketPrice, NetProfit),
            Ratio::PriceToSales => (MarketPrice, Sales),
            Ratio::PriceToBook => (MarketPrice, Assets),
            Ratio::NetDebtToEbitda => (NetDebt, Ebitda),
            Ratio::ReturnOnEquity => (NetProfit, Equity),
            Ratio::ReturnOnAssets => (NetProfit, Assets),
            Ratio::LiabilitiesToAssets => (Liabilities, Assets),
        }
    }

    pub fn compute(self, financial: &Financial) -> Option<f64> {
        let (numerator, denominator) = self.operands();
        safe_ratio(financial.get(numerator), financial.get(denominator))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Ratio {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "pe" => Ok(Ratio::PriceToEarnings),
            "ps" => Ok(Ratio::PriceToSales),
            "pb" => Ok(Ratio::PriceToBook),
            "ndebitda" | "ndebita" => Ok(Ratio::NetDebtToEbitda),
            "roe" => Ok(Ratio::ReturnOnEquity),
            "roa" => Ok(Ratio::ReturnOnAssets),
            "la" => Ok(Ratio::LiabilitiesToAssets),
            _ => Err(ValidationError::UnknownRatio(s.trim().to_string())),
        }
    }
}

/// Round half away from zero to two decimals.
///
/// Values too large to scale by 100 are returned as they are, and a
/// negative zero result comes back as `0.0`.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Divide two optional figures, yielding `None` instead of an error or a non-finite value.
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (numerator, denominator) = (numerator?, denominator?);
    if denominator == 0.0 {
        return None;
    }
    let quotient = numerator / denominator;
    if !quotient.is_finite() {
        return None;
    }
    Some(round2(quotient))
}

/// All seven ratios for one financial record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Ratios {
    #[serde(rename = "P/E")]
    pub pe: Option<f64>,
    #[serde(rename = "P/S")]
    pub ps: Option<f64>,
    #[serde(rename = "P/B")]
    pub pb: Option<f64>,
    #[serde(rename = "ND/EBITDA")]
    pub nd_ebitda: Option<f64>,
    #[serde(rename = "ROE")]
    pub roe: Option<f64>,
    #[serde(rename = "ROA")]
    pub roa: Option<f64>,
    #[serde(rename = "L/A")]
    pub la: Option<f64>,
}

impl Ratios {
    pub fn from_financial(financial: &Financial) -> Self {
        Self {
            pe: Ratio::PriceToEarnings.compute(financial),
            ps: Ratio::PriceToSales.compute(financial),
            pb: Ratio::PriceToBook.compute(financial),
            nd_ebitda: Ratio::NetDebtToEbitda.compute(financial),
            roe: Ratio::ReturnOnEquity.compute(financial),
            roa: Ratio::ReturnOnAssets.compute(financial),
            la: Ratio::LiabilitiesToAssets.compute(financial),
        }
    }

    /// Ratios of a company with no financial record: all undefined.
    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn get(&self, ratio: Ratio) -> Option<f64> {
        match ratio {
            Ratio::PriceToEarnings => self.pe,
            Ratio::PriceToSales => self.ps,
            Ratio::PriceToBook => self.pb,
            Ratio::NetDebtToEbitda => self.nd_ebitda,
            Ratio::ReturnOnEquity => self.roe,
            Ratio::ReturnOnAssets => self.roa,
            Ratio::LiabilitiesToAssets => self.la,
        }
    }
}

/// Format a ratio value the way the report prints it.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "None".to_string(),
    }
}

impl fmt::Display for Ratios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = Ratio::ALL
            .iter()
            .map(|ratio| format!("{} = {}", ratio.label(), format_value(self.get(*ratio))))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

/// One company with its figures and derived ratios, as `show` and the read menu print it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyReport {
    pub company: Company,
    pub financial: Option<Financial>,
    pub ratios: Ratios,
}

impl From<CompanyRecord> for CompanyReport {
    fn from(record: CompanyRecord) -> Self {
        let ratios = record
            .financial
            .as_ref()
            .map(Ratios::from_financial)
            .unwrap_or_else(Ratios::undefined);
        Self {
            company: record.company,
            financial: record.financial,
            ratios,
        }
    }
}

impl fmt::Display for CompanyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}\n{}", self.company.ticker, self.company.name, self.ratios)
    }
}
