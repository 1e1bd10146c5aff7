//! Listing report synthesis and rendering.
//!
//! [`content`] computes the report values; [`generator`] renders them.

pub mod content;
pub mod generator;

pub use content::{synthesize_report, ChartSeries};
pub use generator::{generate_json_report, generate_markdown_report, write_report, RenderOptions};
