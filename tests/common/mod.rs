//! Common test utilities and helpers


/// Test data utilities
pub mod test_data {
    use investor_calculator::models::{Company, Financial};
    use std::path::PathBuf;

    /// Create a company with a complete financial record
    pub fn create_test_company(ticker: &str, name: &str) -> (Company, Financial) {
        (
            Company::new(ticker, name, Some("Technology".to_string())),
            Financial {
                ticker: ticker.to_string(),
                ebitda: Some(50.0),
                sales: Some(400.0),
                net_profit: Some(20.0),
                market_price: Some(100.0),
                net_debt: Some(75.0),
                assets: Some(300.0),
                equity: Some(80.0),
                cash_equivalents: Some(10.0),
                liabilities: Some(220.0),
            },
        )
    }

    /// Path of a file under tests/fixtures
    pub fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // Already installed by test-log; keep going
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("investor_calculator=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
