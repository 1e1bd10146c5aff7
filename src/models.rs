//! Data models for the m² index.
//!
//! This module contains the listing record as it is stored and exchanged,
//! the market-position vocabulary shared by every consumer, and the
//! summary shapes returned by the analysis functions.

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Provenance tag of a listing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Source {
    /// Entered by a market professional.
    #[default]
    #[serde(rename = "professional", alias = "Profissional")]
    Professional,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Professional => write!(f, "Professional"),
        }
    }
}

/// One observed property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    /// Store-assigned identifier, absent until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Grouping key for the peer group (case-sensitive).
    #[serde(default, alias = "condominio", deserialize_with = "deserialize_text")]
    pub condominium: String,
    #[serde(default, alias = "bairro", deserialize_with = "deserialize_text")]
    pub neighborhood: String,
    /// Area in square meters, kept as entered.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub area: String,
    /// Asking price, kept as entered.
    #[serde(default, alias = "preco", deserialize_with = "deserialize_text")]
    pub price: String,
    #[serde(default, alias = "data", deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "fonte")]
    pub source: Source,
    #[serde(default, alias = "responsavel", deserialize_with = "deserialize_text")]
    pub responsible: String,
    /// Price per m², fixed at creation time.
    #[serde(default, alias = "m2", deserialize_with = "deserialize_unit_value")]
    pub unit_value: Option<f64>,
    #[serde(default, alias = "favorito")]
    pub favorite: bool,
}

/// Form input for a listing that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewListing {
    pub condominium: String,
    pub neighborhood: String,
    pub area: String,
    pub price: String,
}

impl ListingRecord {
    /// Builds a record from form input, deriving its unit value.
    pub fn from_input(input: NewListing, responsible: &str, date: NaiveDate) -> Self {
        let unit_value = unit_value(&input.area, &input.price);

        Self {
            id: None,
            condominium: input.condominium,
            neighborhood: input.neighborhood,
            area: input.area,
            price: input.price,
            date: Some(date),
            source: Source::Professional,
            responsible: responsible.to_string(),
            unit_value,
            favorite: false,
        }
    }

    /// Returns the record with the given store id attached.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether this record belongs to the peer group `key`.
    pub fn in_group(&self, key: &str) -> bool {
        self.condominium == key
    }
}

/// Parses a decimal typed as text. Returns `None` for empty, non-numeric,
/// non-finite or non-positive input.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Price per m² rounded to two decimals, absent when either side is unusable.
pub fn unit_value(area: &str, price: &str) -> Option<f64> {
    let area = parse_decimal(area)?;
    let price = parse_decimal(price)?;
    Some(round_to(price / area, 2))
}

/// Rounds half away from zero at `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected text or number, found {}",
            other
        ))),
    }
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid date '{}': {}", s, e))),
        other => Err(de::Error::custom(format!(
            "expected YYYY-MM-DD date, found {}",
            other
        ))),
    }
}

fn deserialize_unit_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64().filter(|v| v.is_finite() && *v > 0.0)),
        Value::String(s) => Ok(parse_decimal(&s)),
        other => Err(de::Error::custom(format!(
            "expected unit value, found {}",
            other
        ))),
    }
}

/// Display tone attached to a market position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Not enough data (grey).
    Neutral,
    /// Priced above the peer group (red).
    Warn,
    /// Priced below the peer group (blue).
    Info,
    /// In line with the peer group (green).
    Positive,
}

impl Tone {
    /// Hex color used by the presentation layer.
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Neutral => "#6B778C",
            Tone::Warn => "#D64545",
            Tone::Info => "#2D7FF9",
            Tone::Positive => "#1FA971",
        }
    }

    /// Emoji marker for console output.
    pub fn emoji(&self) -> &'static str {
        match self {
            Tone::Neutral => "⚪",
            Tone::Warn => "🔴",
            Tone::Info => "🔵",
            Tone::Positive => "🟢",
        }
    }
}

/// Where a listing sits relative to its peer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    AboveMarket,
    WithinMarket,
    BuyingOpportunity,
    InsufficientData,
}

impl MarketPosition {
    pub fn label(&self) -> &'static str {
        match self {
            MarketPosition::AboveMarket => "above market",
            MarketPosition::WithinMarket => "within market",
            MarketPosition::BuyingOpportunity => "buying opportunity",
            MarketPosition::InsufficientData => "insufficient data",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            MarketPosition::AboveMarket => Tone::Warn,
            MarketPosition::WithinMarket => Tone::Positive,
            MarketPosition::BuyingOpportunity => Tone::Info,
            MarketPosition::InsufficientData => Tone::Neutral,
        }
    }

    /// Short market-position tag for styling hooks.
    pub fn tag(&self) -> &'static str {
        match self {
            MarketPosition::AboveMarket => "high",
            MarketPosition::WithinMarket => "ok",
            MarketPosition::BuyingOpportunity => "low",
            MarketPosition::InsufficientData => "",
        }
    }

    /// Fixed report conclusion for this position.
    pub fn conclusion(&self) -> Option<&'static str> {
        match self {
            MarketPosition::AboveMarket => {
                Some("priced above market, expect reduced demand until price adjustment")
            }
            MarketPosition::BuyingOpportunity => {
                Some("represents a buying opportunity relative to current market")
            }
            MarketPosition::WithinMarket => {
                Some("positioned within market value, with good expected liquidity")
            }
            MarketPosition::InsufficientData => None,
        }
    }
}

impl fmt::Display for MarketPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification of a single record: label plus display tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub position: MarketPosition,
    pub label: &'static str,
    pub tone: Tone,
}

impl From<MarketPosition> for Diagnosis {
    fn from(position: MarketPosition) -> Self {
        Self {
            position,
            label: position.label(),
            tone: position.tone(),
        }
    }
}

/// One row of the condominium ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRanking {
    pub name: String,
    pub average: f64,
    pub count: usize,
}

/// Aggregate for a free-text condominium search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    /// Condominium of the first match in collection order.
    pub name: String,
    pub average: Option<f64>,
    pub count: usize,
    pub trend: Option<f64>,
}

/// Aggregate over the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub average: Option<f64>,
    pub count: usize,
    pub most_recent_date: Option<NaiveDate>,
}

/// A point of a unit-value time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: Option<NaiveDate>,
    pub unit_value: f64,
}
