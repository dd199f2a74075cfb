//! The two aggregation levels.
//!
//! - [`SampleAggregator`]: moving average of the last `SAMPLES` raw readings
//! - [`MeanAggregator`]: moving average of the last `MEANS` Level-1 averages,
//!   plus the sample standard deviation over them
//!
//! The facade feeds one Level-1 average into the mean aggregator every time the
//! sample aggregator completes a cycle.

mod mean;
mod sample;

pub use mean::MeanAggregator;
pub use sample::SampleAggregator;
