//! Temporal trend of a peer group's unit value.

use crate::analysis::aggregator::mean;
use crate::models::ListingRecord;
use tracing::trace;

/// Minimum dated samples before a trend is reported.
pub const MIN_TREND_SAMPLES: usize = 4;

/// Stable ascending sort by date. Undated records sort first.
pub fn chronological<'a, I>(records: I) -> Vec<&'a ListingRecord>
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let mut sorted: Vec<&ListingRecord> = records.into_iter().collect();
    sorted.sort_by_key(|r| r.date);
    sorted
}

/// Percentage change between the older and newer half of a peer group.
///
/// Records need both a unit value and a date to count. The sorted series is
/// split at `len / 2`, so an odd-length series gives the extra element to
/// the newer half. Returns `None` below [`MIN_TREND_SAMPLES`].
pub fn trend(records: &[ListingRecord], key: &str) -> Option<f64> {
    let series: Vec<f64> = chronological(
        records
            .iter()
            .filter(|r| r.in_group(key) && r.unit_value.is_some() && r.date.is_some()),
    )
    .into_iter()
    .filter_map(|r| r.unit_value)
    .collect();

    if series.len() < MIN_TREND_SAMPLES {
        trace!("trend for '{}': {} samples, not enough", key, series.len());
        return None;
    }

    let (older, newer) = series.split_at(series.len() / 2);
    let mean_older = mean(older.iter().copied())?;
    let mean_newer = mean(newer.iter().copied())?;

    if mean_older == 0.0 {
        return None;
    }

    Some(((mean_newer - mean_older) / mean_older) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::NaiveDate;

    fn create_test_record(condominium: &str, unit_value: Option<f64>, date: &str) -> ListingRecord {
        ListingRecord {
            id: None,
            condominium: condominium.to_string(),
            neighborhood: "Centro".to_string(),
            area: String::new(),
            price: String::new(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            source: Source::Professional,
            responsible: "Ana".to_string(),
            unit_value,
            favorite: false,
        }
    }

    #[test]
    fn test_trend_requires_four_samples() {
        let records = vec![
            create_test_record("Solar", Some(100.0), "2024-01-01"),
            create_test_record("Solar", Some(100.0), "2024-02-01"),
            create_test_record("Solar", Some(200.0), "2024-03-01"),
            create_test_record("Solar", None, "2024-04-01"),
            create_test_record("Solar", Some(200.0), ""),
        ];

        assert_eq!(trend(&records, "Solar"), None);
    }

    #[test]
    fn test_trend_sorts_by_date_not_insertion_order() {
        let records = vec![
            create_test_record("Solar", Some(200.0), "2024-04-01"),
            create_test_record("Solar", Some(100.0), "2024-01-01"),
            create_test_record("Solar", Some(200.0), "2024-03-01"),
            create_test_record("Solar", Some(100.0), "2024-02-01"),
            create_test_record("Other", Some(9999.0), "2024-05-01"),
        ];

        let value = trend(&records, "Solar").unwrap();
        assert!((value - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_depreciation_is_negative() {
        let records = vec![
            create_test_record("Solar", Some(200.0), "2024-01-01"),
            create_test_record("Solar", Some(200.0), "2024-02-01"),
            create_test_record("Solar", Some(150.0), "2024-03-01"),
            create_test_record("Solar", Some(150.0), "2024-04-01"),
        ];

        let value = trend(&records, "Solar").unwrap();
        assert!((value + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_odd_length_puts_extra_in_newer_half() {
        // older = [100, 100], newer = [200, 200, 500]
        let records = vec![
            create_test_record("Solar", Some(100.0), "2024-01-01"),
            create_test_record("Solar", Some(100.0), "2024-02-01"),
            create_test_record("Solar", Some(200.0), "2024-03-01"),
            create_test_record("Solar", Some(200.0), "2024-04-01"),
            create_test_record("Solar", Some(500.0), "2024-05-01"),
        ];

        let value = trend(&records, "Solar").unwrap();
        assert!((value - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_chronological_is_stable() {
        let records = vec![
            create_test_record("A", Some(1.0), "2024-02-01"),
            create_test_record("B", Some(2.0), "2024-01-01"),
            create_test_record("C", Some(3.0), "2024-02-01"),
        ];

        let sorted = chronological(&records);
        let names: Vec<&str> = sorted.iter().map(|r| r.condominium.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }
}
