//! Ranking over a populated store

use pretty_assertions::assert_eq;
use test_log::test;

use investor_calculator::analysis::{top_n_by_ratio, Ratio, RankedEntry, DEFAULT_TOP_N};
use investor_calculator::database::CompanyRepository;
use investor_calculator::models::{Company, Financial};

use crate::common::database;

#[test]
fn test_top_roe_skips_zero_equity() {
    let mut db = database::init_fresh_test_database().unwrap();
    database::insert_sample_companies(&mut db.manager).unwrap();

    let ranked = top_n_by_ratio(&db.manager, Ratio::ReturnOnEquity, DEFAULT_TOP_N).unwrap();

    assert_eq!(
        ranked,
        vec![
            RankedEntry { ticker: "AAPL".to_string(), value: 1.58 },
            RankedEntry { ticker: "MSFT".to_string(), value: 0.36 },
            RankedEntry { ticker: "GOOGL".to_string(), value: 0.3 },
            RankedEntry { ticker: "AMZN".to_string(), value: 0.15 },
        ]
    );
}

#[test]
fn test_top_n_limits_and_orders() {
    let mut db = database::init_fresh_test_database().unwrap();
    for i in 0..12 {
        let ticker = format!("T{:02}", i);
        let financial = Financial {
            net_debt: Some(i as f64),
            ebitda: Some(2.0),
            ..Financial::empty(ticker.as_str())
        };
        db.manager
            .create(Company::new(ticker.as_str(), format!("Company {}", i), None), Some(financial))
            .unwrap();
    }
    db.manager.create(Company::new("BARE", "Bare Corp", None), None).unwrap();

    let ranked = top_n_by_ratio(&db.manager, Ratio::NetDebtToEbitda, 10).unwrap();

    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0].ticker, "T11");
    assert!(ranked.windows(2).all(|w| w[0].value >= w[1].value));
    assert!(ranked.iter().all(|e| e.ticker != "BARE"));
}

#[test]
fn test_empty_store_ranks_nothing() {
    let db = database::init_fresh_test_database().unwrap();
    assert!(db.manager.list_financials().unwrap().is_empty());
    assert!(top_n_by_ratio(&db.manager, Ratio::PriceToEarnings, 10).unwrap().is_empty());
}
