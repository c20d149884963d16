//! Property tests for transform invariants.
//!
//! Uses proptest to verify:
//! 1. record_count always equals the data payload length
//! 2. The feed window cap holds for any input size, ordered newest-first
//! 3. Price capping never invents rows and keeps per-symbol ordering

use chrono::{NaiveDate, TimeZone, Utc};
use marketbrief_core::registry::Registry;
use marketbrief_core::rows::{FeedRow, PriceRow, RowBatch};
use marketbrief_core::sources::FetchOutcome;
use marketbrief_core::transform::{self, feed, price, TransformOptions};
use proptest::prelude::*;

fn arb_price_row() -> impl Strategy<Value = PriceRow> {
    (
        prop::sample::select(vec!["SPY", "QQQ", "IWM"]),
        0u32..600,
        1.0..1000.0f64,
        0u64..1_000_000,
    )
        .prop_map(|(symbol, day_offset, close, volume)| PriceRow {
            symbol: symbol.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Duration::days(day_offset as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume,
        })
}

fn arb_feed_row() -> impl Strategy<Value = FeedRow> {
    (0i64..100_000, "[a-z]{1,12}").prop_map(|(minutes, slug)| FeedRow {
        title: slug.clone(),
        link: format!("https://example.com/{slug}/{minutes}"),
        published: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::minutes(minutes),
        source: "feed".into(),
        author: None,
    })
}

proptest! {
    /// metadata.record_count == data payload length, for any price input.
    #[test]
    fn record_count_matches_data_length(rows in prop::collection::vec(arb_price_row(), 0..200)) {
        let registry = Registry::builtin();
        let descriptor = registry.lookup("us_indices").unwrap();
        let outcome = FetchOutcome::new(RowBatch::Prices(rows), Vec::new());
        let doc = transform::transform(descriptor, outcome, &TransformOptions::default()).unwrap();
        prop_assert_eq!(doc.metadata.record_count, doc.data.len());
    }

    /// The feed transform never retains more than the window, and the
    /// retained entries are ordered newest-first.
    #[test]
    fn feed_window_cap_holds(rows in prop::collection::vec(arb_feed_row(), 0..120)) {
        let (_, retained) = feed::summarize(rows.clone(), 30);
        prop_assert!(retained.len() <= 30);
        prop_assert!(retained.len() <= rows.len());
        for pair in retained.windows(2) {
            prop_assert!(pair[0].published >= pair[1].published);
        }
    }

    /// Price capping never invents rows, and each symbol's retained rows
    /// stay date-ordered.
    #[test]
    fn price_cap_is_a_pure_reduction(
        rows in prop::collection::vec(arb_price_row(), 0..200),
        cap in 1usize..50,
    ) {
        let input_len = rows.len();
        let (stats, retained) = price::summarize(rows, cap);
        prop_assert!(retained.len() <= input_len);
        for summary in &stats.symbols {
            let group: Vec<_> = retained.iter().filter(|r| r.symbol == summary.symbol).collect();
            prop_assert!(group.len() <= cap);
            for pair in group.windows(2) {
                prop_assert!(pair[0].date <= pair[1].date);
            }
        }
    }
}
