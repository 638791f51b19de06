//! clvseg: customer lifetime value scoring and segmentation
//!
//! Merges customer activity from several sources into one row per customer,
//! scores each customer's lifetime value and assigns a High/Medium/Low
//! segment, then summarises and charts the result.

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod data;
pub mod error;
pub mod model;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use aggregate::{AggregatedCustomer, Aggregator, AggregatorConfig};
pub use analysis::{
    export_reports, filter_by_segment, run_analysis, AnalysisObserver, AnalysisSummary,
    CustomerProcessed, CustomerReport, NoopObserver, SegmentBreakdown, TracingObserver,
};
pub use cli::Args;
pub use data::{coerce_year, load_source, read_source, RawActivityRecord, SourceSchema, SourceTable};
pub use error::{AnalysisError, AnalysisResult};
pub use model::{
    calculate_clv, segment_customer, Segment, SegmentThresholds, ValueAssessment, ValueModel,
};
pub use stats::{correlation_matrix, describe, ColumnSummary, CorrelationMatrix};
pub use viz::generate_visualization_report;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
