//! Report content synthesis.
//!
//! Builds every derived value a one-page listing report needs. Rendering
//! is left to [`super::generator`] or any external document renderer.

use crate::analysis::{chronological, mean, position_from_ratio};
use crate::models::{round_to, ChartPoint, ListingRecord, MarketPosition};
use chrono::NaiveDate;
use serde::Serialize;

/// Time-ordered unit values of a peer group, ready to plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
    min: f64,
    max: f64,
}

impl ChartSeries {
    /// Returns `None` unless there are at least two points to join.
    pub fn from_points(points: Vec<ChartPoint>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let min = points.iter().map(|p| p.unit_value).fold(f64::INFINITY, f64::min);
        let max = points
            .iter()
            .map(|p| p.unit_value)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(Self { points, min, max })
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Position of each value within `[min, max]`, from 0.0 to 1.0.
    ///
    /// A flat series maps every point to 0.0.
    pub fn normalized(&self) -> Vec<f64> {
        let span = self.max - self.min;
        self.points
            .iter()
            .map(|p| {
                if span > 0.0 {
                    (p.unit_value - self.min) / span
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Polyline vertices inside a `width` x `height` box, y growing upward.
    pub fn polyline(&self, width: f64, height: f64) -> Vec<(f64, f64)> {
        let step = match self.points.len() {
            0 | 1 => 0.0,
            n => width / (n - 1) as f64,
        };
        self.normalized()
            .into_iter()
            .enumerate()
            .map(|(i, level)| (i as f64 * step, level * height))
            .collect()
    }
}

/// Everything a listing report shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportContent {
    pub condominium: String,
    pub neighborhood: String,
    pub area: String,
    pub price: String,
    pub unit_value: Option<f64>,
    /// Peer-group mean, two decimals.
    pub group_average: Option<f64>,
    /// Signed difference to the peer mean in percent, one decimal.
    pub percent_difference: Option<f64>,
    pub position: Option<MarketPosition>,
    /// Hex color of the position's tone.
    pub tone_color: Option<&'static str>,
    pub conclusion: Option<&'static str>,
    pub chart: Option<ChartSeries>,
    pub issued_on: NaiveDate,
    pub responsible: String,
}

/// Synthesize the report for `record` against the collection `records`.
pub fn synthesize_report(
    record: &ListingRecord,
    records: &[ListingRecord],
    responsible: &str,
    issued_on: NaiveDate,
) -> ReportContent {
    let series: Vec<ChartPoint> = chronological(
        records
            .iter()
            .filter(|r| r.in_group(&record.condominium) && r.unit_value.is_some()),
    )
    .into_iter()
    .filter_map(|r| {
        r.unit_value.map(|unit_value| ChartPoint {
            date: r.date,
            unit_value,
        })
    })
    .collect();

    let average = mean(series.iter().map(|p| p.unit_value));

    let ratio = match (record.unit_value, average) {
        (Some(value), Some(avg)) if avg != 0.0 => Some((value - avg) / avg),
        _ => None,
    };
    let position = ratio.map(position_from_ratio);

    ReportContent {
        condominium: record.condominium.clone(),
        neighborhood: record.neighborhood.clone(),
        area: record.area.clone(),
        price: record.price.clone(),
        unit_value: record.unit_value,
        group_average: average.map(|avg| round_to(avg, 2)),
        percent_difference: ratio.map(|r| round_to(r * 100.0, 1)),
        position,
        tone_color: position.map(|p| p.tone().color()),
        conclusion: position.and_then(|p| p.conclusion()),
        chart: ChartSeries::from_points(series),
        issued_on,
        responsible: responsible.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn create_test_record(condominium: &str, unit_value: Option<f64>, date: &str) -> ListingRecord {
        ListingRecord {
            id: None,
            condominium: condominium.to_string(),
            neighborhood: "Centro".to_string(),
            area: "100".to_string(),
            price: "500000".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            source: Source::Professional,
            responsible: "Ana".to_string(),
            unit_value,
            favorite: false,
        }
    }

    fn issued() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_report_above_market() {
        let records = vec![
            create_test_record("Solar", Some(100.0), "2024-01-01"),
            create_test_record("Solar", Some(100.0), "2024-02-01"),
            create_test_record("Solar", Some(160.0), "2024-03-01"),
            create_test_record("Vista", Some(900.0), "2024-03-01"),
        ];

        let report = synthesize_report(&records[2], &records, "Ana", issued());

        assert_eq!(report.group_average, Some(120.0));
        assert_eq!(report.percent_difference, Some(33.3));
        assert_eq!(report.position, Some(MarketPosition::AboveMarket));
        assert_eq!(report.tone_color, Some("#D64545"));
        assert_eq!(
            report.conclusion,
            Some("priced above market, expect reduced demand until price adjustment")
        );
        assert_eq!(report.chart.as_ref().map(|c| c.points().len()), Some(3));
        assert_eq!(report.responsible, "Ana");
    }

    #[test]
    fn test_report_opportunity_and_within() {
        let records = vec![
            create_test_record("Solar", Some(80.0), "2024-01-01"),
            create_test_record("Solar", Some(110.0), "2024-02-01"),
            create_test_record("Solar", Some(110.0), "2024-03-01"),
        ];

        let low = synthesize_report(&records[0], &records, "Ana", issued());
        assert_eq!(low.position, Some(MarketPosition::BuyingOpportunity));
        assert_eq!(
            low.conclusion,
            Some("represents a buying opportunity relative to current market")
        );

        let mid = synthesize_report(&records[1], &records, "Ana", issued());
        assert_eq!(mid.position, Some(MarketPosition::WithinMarket));
        assert_eq!(
            mid.conclusion,
            Some("positioned within market value, with good expected liquidity")
        );
    }

    #[test]
    fn test_report_single_point_has_no_chart() {
        let records = vec![create_test_record("Solar", Some(100.0), "2024-01-01")];
        let report = synthesize_report(&records[0], &records, "Ana", issued());

        assert_eq!(report.chart, None);
        assert_eq!(report.group_average, Some(100.0));
        assert_eq!(report.percent_difference, Some(0.0));
    }

    #[test]
    fn test_report_without_unit_value() {
        let records = vec![
            create_test_record("Solar", None, "2024-01-01"),
            create_test_record("Solar", Some(100.0), "2024-02-01"),
        ];
        let report = synthesize_report(&records[0], &records, "Ana", issued());

        assert_eq!(report.group_average, Some(100.0));
        assert_eq!(report.percent_difference, None);
        assert_eq!(report.position, None);
        assert_eq!(report.tone_color, None);
        assert_eq!(report.conclusion, None);
        assert_eq!(report.chart, None);
    }

    #[test]
    fn test_report_rounds_average_to_cents() {
        let records = vec![
            create_test_record("Solar", Some(100.0), "2024-01-01"),
            create_test_record("Solar", Some(100.0), "2024-02-01"),
            create_test_record("Solar", Some(100.01), "2024-03-01"),
        ];
        let report = synthesize_report(&records[0], &records, "Ana", issued());

        assert_eq!(report.group_average, Some(100.0));
    }

    #[test]
    fn test_chart_series_is_chronological_and_scaled() {
        let records = vec![
            create_test_record("Solar", Some(300.0), "2024-03-01"),
            create_test_record("Solar", Some(100.0), "2024-01-01"),
            create_test_record("Solar", Some(200.0), "2024-02-01"),
        ];

        let report = synthesize_report(&records[0], &records, "Ana", issued());
        let chart = report.chart.unwrap();

        assert_eq!(chart.min(), 100.0);
        assert_eq!(chart.max(), 300.0);
        assert_eq!(chart.normalized(), vec![0.0, 0.5, 1.0]);
        assert_eq!(
            chart.polyline(170.0, 40.0),
            vec![(0.0, 0.0), (85.0, 20.0), (170.0, 40.0)]
        );
    }

    #[test]
    fn test_flat_chart_does_not_divide_by_zero() {
        let points = vec![
            ChartPoint {
                date: None,
                unit_value: 50.0,
            },
            ChartPoint {
                date: None,
                unit_value: 50.0,
            },
        ];
        let chart = ChartSeries::from_points(points).unwrap();
        assert_eq!(chart.normalized(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_single_point_polyline_does_not_underflow() {
        let point = ChartPoint {
            date: None,
            unit_value: 50.0,
        };
        assert_eq!(ChartSeries::from_points(vec![point.clone()]), None);

        let chart = ChartSeries {
            points: vec![point],
            min: 50.0,
            max: 50.0,
        };
        assert_eq!(chart.polyline(170.0, 40.0), vec![(0.0, 0.0)]);
    }
}
