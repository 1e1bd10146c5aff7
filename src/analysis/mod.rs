//! Market analytics engine.
//!
//! Pure functions over a snapshot of listing records. Nothing here keeps
//! state or touches the filesystem; every value is recomputed from the
//! slice passed in.

pub mod aggregator;
pub mod classifier;
pub mod trend;

pub use aggregator::*;
pub use classifier::*;
pub use trend::*;
