//! Windowed usage statistics fed by a private bus subscription.

pub mod aggregator;

pub use aggregator::StatsAggregator;
