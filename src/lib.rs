pub mod analysis;
pub mod database;
pub mod error;
pub mod models;
pub mod tools;
pub mod ui;

pub use analysis::{Ratio, Ratios};
pub use database::{CompanyRepository, DatabaseManager};
pub use error::{LedgerError, LedgerResult, ValidationError};
pub use models::{Company, Config, Financial, FinancialUpdate};
