//! Merging of activity sources into one row per customer

use crate::data::{load_source, SourceSchema, SourceTable};
use crate::error::AnalysisResult;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Settings the aggregation depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Year tenure is measured against
    pub current_year: i32,
}

impl AggregatorConfig {
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }
}

/// Totals for one customer across every source
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCustomer {
    pub customer_id: String,
    pub total_purchases: u64,
    pub total_spent: f64,
    /// `None` when no source had a usable since-year for this customer
    pub years_active: Option<i32>,
}

impl AggregatedCustomer {
    /// Tenure with a missing value read as zero
    pub fn tenure(&self) -> i32 {
        self.years_active.unwrap_or(0)
    }
}

/// Merges raw activity from several sources keyed by customer id
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Combine all sources into one `AggregatedCustomer` per id.
    ///
    /// Purchases and spend are summed over every row of a customer. Each row
    /// contributes `current_year - earliest_since` as its tenure and the
    /// customer keeps the longest one, so a missing year in one source does
    /// not hide the tenure reported by another. Output is sorted by id.
    pub fn aggregate(&self, sources: &[SourceTable]) -> Vec<AggregatedCustomer> {
        let mut by_customer: BTreeMap<&str, AggregatedCustomer> = BTreeMap::new();
        let mut rows = 0usize;

        for source in sources {
            for record in &source.records {
                rows += 1;
                let years_active = record
                    .earliest_since()
                    .and_then(|year| self.config.current_year.checked_sub(year));

                let entry = by_customer
                    .entry(record.customer_id.as_str())
                    .or_insert_with(|| AggregatedCustomer {
                        customer_id: record.customer_id.clone(),
                        total_purchases: 0,
                        total_spent: 0.0,
                        years_active: None,
                    });

                entry.total_purchases = entry.total_purchases.saturating_add(record.purchase_count);
                entry.total_spent += record.amount_spent;
                // None orders below Some, so missing tenure never wins
                entry.years_active = entry.years_active.max(years_active);
            }
        }

        let customers: Vec<AggregatedCustomer> = by_customer.into_values().collect();
        info!(
            sources = sources.len(),
            rows,
            customers = customers.len(),
            current_year = self.config.current_year,
            "aggregated customer activity"
        );
        customers
    }

    /// Load every source from disk and aggregate them.
    ///
    /// Fails on the first source whose header lacks a required column.
    pub fn load_and_aggregate(
        &self,
        inputs: &[(PathBuf, SourceSchema)],
    ) -> AnalysisResult<Vec<AggregatedCustomer>> {
        let sources = inputs
            .iter()
            .map(|(path, schema)| load_source(path, schema))
            .collect::<AnalysisResult<Vec<_>>>()?;

        Ok(self.aggregate(&sources))
    }
}
