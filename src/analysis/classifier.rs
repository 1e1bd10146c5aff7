//! Market-position classification.
//!
//! Every place that shows where a listing sits relative to its peer group
//! goes through [`position_from_ratio`]: the console diagnosis, the
//! market tag, the opportunity filter and the report.

use crate::analysis::aggregator::{group_values, mean};
use crate::models::{Diagnosis, ListingRecord, MarketPosition};

/// Half-width of the "within market" band, as a fraction of the average.
pub const MARKET_BAND: f64 = 0.10;

/// Minimum peers (the record included) before a record is classified.
pub const MIN_PEERS: usize = 2;

/// Map a relative difference `(value - average) / average` to a position.
///
/// The band edges are exclusive: exactly +10% or -10% is within market.
pub fn position_from_ratio(ratio: f64) -> MarketPosition {
    if ratio > MARKET_BAND {
        MarketPosition::AboveMarket
    } else if ratio < -MARKET_BAND {
        MarketPosition::BuyingOpportunity
    } else {
        MarketPosition::WithinMarket
    }
}

/// Position of `record` against its peer group in `records`.
///
/// The peer average includes the record itself when it is part of the
/// collection.
pub fn market_position(records: &[ListingRecord], record: &ListingRecord) -> MarketPosition {
    let peers = group_values(records, &record.condominium);
    if peers.len() < MIN_PEERS {
        return MarketPosition::InsufficientData;
    }

    let (Some(value), Some(average)) = (record.unit_value, mean(peers)) else {
        return MarketPosition::InsufficientData;
    };
    if average == 0.0 {
        return MarketPosition::InsufficientData;
    }

    position_from_ratio((value - average) / average)
}

/// Label and tone for a record's market position.
pub fn classify(records: &[ListingRecord], record: &ListingRecord) -> Diagnosis {
    Diagnosis::from(market_position(records, record))
}

/// Whether `record` is priced more than 10% below its peer average.
pub fn is_opportunity(records: &[ListingRecord], record: &ListingRecord) -> bool {
    market_position(records, record) == MarketPosition::BuyingOpportunity
}

/// All opportunities in collection order.
pub fn opportunities(records: &[ListingRecord]) -> Vec<&ListingRecord> {
    records
        .iter()
        .filter(|r| is_opportunity(records, r))
        .collect()
}
