//! Peer-group aggregation and summary statistics.
//!
//! This module groups listings by condominium and computes the averages,
//! rankings and search summaries shown to the user. Records without a
//! unit value are left out of every mean.

use crate::analysis::trend::{chronological, trend};
use crate::models::{ChartPoint, GroupRanking, ListingRecord, OverallSummary, SearchSummary};
use std::collections::HashMap;
use tracing::debug;

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Unit values of a peer group in collection order.
pub fn group_values(records: &[ListingRecord], key: &str) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.in_group(key))
        .filter_map(|r| r.unit_value)
        .collect()
}

/// Mean unit value of a peer group.
pub fn group_average(records: &[ListingRecord], key: &str) -> Option<f64> {
    mean(group_values(records, key))
}

/// Rank condominiums by average unit value, highest first.
///
/// Ties keep the order in which the groups were first seen.
pub fn rank_groups(records: &[ListingRecord]) -> Vec<GroupRanking> {
    let mut order: Vec<(String, Vec<f64>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(value) = record.unit_value else {
            continue;
        };
        if record.condominium.is_empty() {
            continue;
        }

        let slot = *index.entry(record.condominium.as_str()).or_insert_with(|| {
            order.push((record.condominium.clone(), Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(value);
    }

    let mut ranking: Vec<GroupRanking> = order
        .into_iter()
        .filter_map(|(name, values)| {
            let count = values.len();
            mean(values).map(|average| GroupRanking {
                name,
                average,
                count,
            })
        })
        .collect();

    // Vec::sort_by is stable, so equal averages keep encounter order.
    ranking.sort_by(|a, b| {
        b.average
            .partial_cmp(&a.average)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!("ranked {} condominiums", ranking.len());
    ranking
}

/// Case-insensitive substring match.
pub fn matches_query(text: &str, query: &str) -> bool {
    text.to_lowercase().contains(&query.to_lowercase())
}

/// Records whose condominium or neighborhood contains `query`.
///
/// An empty query matches everything.
pub fn filter_listings<'a>(records: &'a [ListingRecord], query: &str) -> Vec<&'a ListingRecord> {
    records
        .iter()
        .filter(|r| matches_query(&r.condominium, query) || matches_query(&r.neighborhood, query))
        .collect()
}

/// Summary for a free-text condominium search.
pub fn search_summary(records: &[ListingRecord], query: &str) -> Option<SearchSummary> {
    if query.is_empty() {
        return None;
    }

    let matches: Vec<&ListingRecord> = records
        .iter()
        .filter(|r| matches_query(&r.condominium, query))
        .collect();

    let name = matches.first()?.condominium.clone();
    let values: Vec<f64> = matches.iter().filter_map(|r| r.unit_value).collect();
    let count = values.len();

    Some(SearchSummary {
        trend: trend(records, &name),
        name,
        average: mean(values),
        count,
    })
}

/// Unit-value history for a condominium search, oldest first.
pub fn search_series(records: &[ListingRecord], query: &str) -> Vec<ChartPoint> {
    if query.is_empty() {
        return Vec::new();
    }

    chronological(
        records
            .iter()
            .filter(|r| matches_query(&r.condominium, query)),
    )
    .into_iter()
    .filter_map(|r| {
        r.unit_value.map(|unit_value| ChartPoint {
            date: r.date,
            unit_value,
        })
    })
    .collect()
}

/// Summary over the whole collection.
pub fn overall_summary(records: &[ListingRecord]) -> Option<OverallSummary> {
    if records.is_empty() {
        return None;
    }

    Some(OverallSummary {
        average: mean(records.iter().filter_map(|r| r.unit_value)),
        count: records.len(),
        most_recent_date: records.iter().filter_map(|r| r.date).max(),
    })
}
