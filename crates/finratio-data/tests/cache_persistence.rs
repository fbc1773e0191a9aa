//! On-disk cache behavior across connections.

use chrono::NaiveDate;
use finratio_data::lines::income_statement;
use finratio_data::{
    LineItemSnapshot, PricePoint, PriceSeries, QuoteSnapshot, SqliteCache, StatementSet,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn statements() -> StatementSet {
    StatementSet {
        annual_income: LineItemSnapshot::new(vec![date(2024, 3, 31), date(2023, 3, 31)])
            .with_item(income_statement::TOTAL_REVENUE, vec![Some(240.0), None]),
        ..StatementSet::default()
    }
}

#[test]
fn test_payloads_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("finratio.db");
    let as_of = date(2024, 6, 28);

    {
        let cache = SqliteCache::new(&path).unwrap();
        cache.put_statements("TCS.NS", as_of, &statements()).unwrap();
        cache
            .put_quote(
                "TCS.NS",
                as_of,
                &QuoteSnapshot {
                    trailing_pe: Some(31.2),
                    ..QuoteSnapshot::default()
                },
            )
            .unwrap();
    }

    let cache = SqliteCache::new(&path).unwrap();
    assert_eq!(
        cache.get_statements("TCS.NS", as_of).unwrap(),
        Some(statements())
    );
    assert_eq!(
        cache.get_quote("TCS.NS", as_of).unwrap().and_then(|q| q.trailing_pe),
        Some(31.2)
    );
    assert_eq!(cache.get_stats().unwrap().total_payloads, 2);
}

#[test]
fn test_new_day_misses_and_prunes() {
    let cache = SqliteCache::in_memory().unwrap();
    let monday = date(2024, 6, 24);
    let tuesday = date(2024, 6, 25);
    let start = date(2023, 6, 24);
    let series = PriceSeries::new(vec![
        PricePoint::new(start, 100.0),
        PricePoint::new(monday, 120.0),
    ]);

    cache.put_prices("INFY.NS", start, monday, monday, &series).unwrap();
    cache.put_statements("INFY.NS", monday, &statements()).unwrap();

    assert_eq!(
        cache.get_prices("INFY.NS", start, monday, monday).unwrap(),
        Some(series)
    );
    assert!(cache.get_prices("INFY.NS", start, monday, tuesday).unwrap().is_none());
    assert!(cache.get_statements("INFY.NS", tuesday).unwrap().is_none());

    assert_eq!(cache.prune_before(tuesday).unwrap(), 2);
    assert_eq!(cache.get_stats().unwrap().unique_symbols, 0);
}
