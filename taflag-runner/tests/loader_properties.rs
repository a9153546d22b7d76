//! Property tests for CSV cleaning.
//!
//! 1. Output is strictly increasing in time, whatever the row order
//! 2. Row accounting: read == kept + dropped + duplicates
//! 3. The first row in file order wins for a duplicated timestamp

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use taflag_runner::load_csv_from_reader;

fn arb_rows() -> impl Strategy<Value = Vec<(u8, bool, u32)>> {
    // (hour offset, bad date?, close in cents)
    prop::collection::vec((0u8..48, prop::bool::weighted(0.1), 1000u32..2000), 1..80)
}

fn timestamp(hour: u8) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(hour as i64)
}

fn render(rows: &[(u8, bool, u32)]) -> String {
    let mut text = String::from("date,open,high,low,close,volume\n");
    for (hour, bad, cents) in rows {
        let close = *cents as f64 / 100.0;
        let date = if *bad {
            "n/a".to_string()
        } else {
            timestamp(*hour).format("%Y-%m-%d %H:%M:%S").to_string()
        };
        text.push_str(&format!("{date},{close},{},{},{close},10\n", close + 1.0, close - 1.0));
    }
    text
}

proptest! {
    #[test]
    fn cleaned_series_is_strictly_increasing(rows in arb_rows()) {
        let text = render(&rows);
        match load_csv_from_reader(text.as_bytes()) {
            Ok(loaded) => {
                prop_assert!(loaded.bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
                prop_assert_eq!(
                    loaded.rows_read,
                    loaded.bars.len() + loaded.rows_dropped + loaded.duplicates_removed
                );
            }
            Err(_) => prop_assert!(rows.iter().all(|(_, bad, _)| *bad)),
        }
    }

    #[test]
    fn first_duplicate_wins(rows in arb_rows()) {
        let text = render(&rows);
        if let Ok(loaded) = load_csv_from_reader(text.as_bytes()) {
            for bar in &loaded.bars {
                let first = rows
                    .iter()
                    .find(|(hour, bad, _)| !*bad && timestamp(*hour) == bar.timestamp)
                    .map(|(_, _, cents)| *cents as f64 / 100.0);
                prop_assert_eq!(first, Some(bar.close));
            }
        }
    }
}
