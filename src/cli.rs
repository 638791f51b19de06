//! Command-line interface definitions and argument parsing

use crate::aggregate::AggregatorConfig;
use crate::data::SourceSchema;
use crate::model::{Segment, SegmentThresholds};
use chrono::{Datelike, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Customer lifetime value scoring and segmentation across two activity sources
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV export of the Customers sheet
    #[arg(short, long, default_value = "customers.csv")]
    pub customers: PathBuf,

    /// CSV export of the Members sheet
    #[arg(short, long, default_value = "members.csv")]
    pub members: PathBuf,

    /// Column holding the customer identifier in both sources
    #[arg(long, default_value = "Customer Id")]
    pub id_column: String,

    /// Since-year column of the Customers source
    #[arg(long, default_value = "Customer Since")]
    pub customers_since_column: String,

    /// Since-year column of the Members source
    #[arg(long, default_value = "Member Since")]
    pub members_since_column: String,

    /// Year tenure is measured against (defaults to the current UTC year)
    #[arg(long)]
    pub current_year: Option<i32>,

    /// CLV above which a customer is High Value
    #[arg(long, default_value = "2000")]
    pub high_threshold: f64,

    /// CLV from which a customer is Medium Value
    #[arg(long, default_value = "1000")]
    pub medium_threshold: f64,

    /// Only chart customers of this segment
    #[arg(short, long, value_enum)]
    pub segment: Option<Segment>,

    /// Output path for the scatter plot; donut charts and the heatmap are written next to it
    #[arg(short, long, default_value = "segments.png")]
    pub output: String,

    /// Write per-customer results to this CSV file
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Utc::now().year())
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig::new(self.current_year())
    }

    pub fn thresholds(&self) -> crate::Result<SegmentThresholds> {
        Ok(SegmentThresholds::new(
            self.medium_threshold,
            self.high_threshold,
        )?)
    }

    /// Input files paired with the column layout each one is read with
    pub fn sources(&self) -> Vec<(PathBuf, SourceSchema)> {
        let customers = SourceSchema {
            id_column: self.id_column.clone(),
            since_columns: vec![self.customers_since_column.clone()],
            ..SourceSchema::customers()
        };
        let members = SourceSchema {
            id_column: self.id_column.clone(),
            since_columns: vec![self.members_since_column.clone()],
            ..SourceSchema::members()
        };

        vec![
            (self.customers.clone(), customers),
            (self.members.clone(), members),
        ]
    }
}
