use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::analysis::Ratio;
use crate::database::CompanyRepository;
use crate::error::LedgerResult;
use crate::models::Financial;

pub const DEFAULT_TOP_N: usize = 10;

/// One line of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub ticker: String,
    pub value: f64,
}

/// Rank financial records by one ratio, best (highest) first.
///
/// Records whose ratio is undefined are left out. Equal values are ordered
/// by ticker ascending.
pub fn rank(financials: &[Financial], ratio: Ratio, n: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = financials
        .iter()
        .filter_map(|financial| {
            ratio.compute(financial).map(|value| RankedEntry {
                ticker: financial.ticker.clone(),
                value,
            })
        })
        .collect();

    entries.sort_by(|a, b| match b.value.total_cmp(&a.value) {
        Ordering::Equal => a.ticker.cmp(&b.ticker),
        other => other,
    });
    entries.truncate(n);
    entries
}

/// Top `n` companies by `ratio` across the whole store.
pub fn top_n_by_ratio<R>(repo: &R, ratio: Ratio, n: usize) -> LedgerResult<Vec<RankedEntry>>
where
    R: CompanyRepository + ?Sized,
{
    let financials = repo.list_financials()?;
    let ranked = rank(&financials, ratio, n);
    debug!(
        "Ranked {} of {} financial records by {}",
        ranked.len(),
        financials.len(),
        ratio
    );
    Ok(ranked)
}

/// A ranking ready for printing or JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopReport {
    pub ratio: Ratio,
    pub entries: Vec<RankedEntry>,
}

impl TopReport {
    pub fn build<R>(repo: &R, ratio: Ratio, n: usize) -> LedgerResult<Self>
    where
        R: CompanyRepository + ?Sized,
    {
        Ok(Self {
            ratio,
            entries: top_n_by_ratio(repo, ratio, n)?,
        })
    }
}

impl fmt::Display for TopReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TICKER {}", self.ratio.label())?;
        for entry in &self.entries {
            write!(f, "\n{} {:.2}", entry.ticker, entry.value)?;
        }
        Ok(())
    }
}
