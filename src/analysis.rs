//! Single scoring pass over aggregated customers, with an observer hook

use crate::aggregate::AggregatedCustomer;
use crate::error::AnalysisResult;
use crate::model::{Segment, ValueModel};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

/// Everything reporting needs to know about one customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerReport {
    #[serde(rename = "Customer Id")]
    pub customer_id: String,
    #[serde(rename = "CLV")]
    pub clv_score: f64,
    #[serde(rename = "Customer Segment")]
    pub segment: Segment,
    #[serde(rename = "Years Active")]
    pub years_active: Option<i32>,
    #[serde(rename = "Total Purchase")]
    pub total_purchases: u64,
    #[serde(rename = "Total Spent")]
    pub total_spent: f64,
}

/// Emitted once per scored customer
#[derive(Debug)]
pub struct CustomerProcessed<'a> {
    pub report: &'a CustomerReport,
    pub elapsed: Duration,
}

/// Receives an event for every customer the analysis scores
pub trait AnalysisObserver {
    fn on_customer(&mut self, event: &CustomerProcessed<'_>);
}

impl<F> AnalysisObserver for F
where
    F: FnMut(&CustomerProcessed<'_>),
{
    fn on_customer(&mut self, event: &CustomerProcessed<'_>) {
        self(event)
    }
}

/// Ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl AnalysisObserver for NoopObserver {
    fn on_customer(&mut self, _event: &CustomerProcessed<'_>) {}
}

/// Logs each scored customer at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AnalysisObserver for TracingObserver {
    fn on_customer(&mut self, event: &CustomerProcessed<'_>) {
        let report = event.report;
        debug!(
            customer_id = %report.customer_id,
            clv = report.clv_score,
            segment = %report.segment,
            years_active = ?report.years_active,
            elapsed_ns = event.elapsed.as_nanos() as u64,
            "customer processed"
        );
    }
}

/// Score every customer exactly once.
///
/// Reports come back in input order, each carrying its customer id so
/// callers never have to rely on position.
pub fn run_analysis<O>(
    customers: &[AggregatedCustomer],
    model: &ValueModel,
    observer: &mut O,
) -> Vec<CustomerReport>
where
    O: AnalysisObserver + ?Sized,
{
    customers
        .iter()
        .map(|customer| {
            let start = Instant::now();
            let assessment = model.assess(customer);
            let report = CustomerReport {
                customer_id: customer.customer_id.clone(),
                clv_score: assessment.clv_score,
                segment: assessment.segment,
                years_active: customer.years_active,
                total_purchases: customer.total_purchases,
                total_spent: customer.total_spent,
            };

            observer.on_customer(&CustomerProcessed {
                report: &report,
                elapsed: start.elapsed(),
            });
            report
        })
        .collect()
}

/// Reports belonging to one segment, or all of them
pub fn filter_by_segment(reports: &[CustomerReport], segment: Option<Segment>) -> Vec<CustomerReport> {
    reports
        .iter()
        .filter(|report| segment.map_or(true, |s| report.segment == s))
        .cloned()
        .collect()
}

/// Totals for a single segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBreakdown {
    pub segment: Segment,
    pub customers: usize,
    pub total_spent: f64,
    pub total_purchases: u64,
}

/// Per-segment totals over a set of reports
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub total_customers: usize,
    /// One entry per segment in `Segment::ALL` order, empty segments included
    pub segments: Vec<SegmentBreakdown>,
}

impl AnalysisSummary {
    pub fn from_reports(reports: &[CustomerReport]) -> Self {
        let segments = Segment::ALL
            .iter()
            .map(|&segment| {
                let members = reports.iter().filter(|r| r.segment == segment);
                SegmentBreakdown {
                    segment,
                    customers: members.clone().count(),
                    total_spent: members.clone().map(|r| r.total_spent).sum(),
                    total_purchases: members.map(|r| r.total_purchases).sum(),
                }
            })
            .collect();

        Self {
            total_customers: reports.len(),
            segments,
        }
    }

    pub fn breakdown(&self, segment: Segment) -> Option<&SegmentBreakdown> {
        self.segments.iter().find(|b| b.segment == segment)
    }

    /// Share of customers in a segment, as a percentage
    pub fn percentage(&self, segment: Segment) -> f64 {
        if self.total_customers == 0 {
            return 0.0;
        }
        let customers = self.breakdown(segment).map_or(0, |b| b.customers);
        customers as f64 / self.total_customers as f64 * 100.0
    }
}

/// Write reports as CSV with the same column names the sources use
pub fn export_reports(path: impl AsRef<Path>, reports: &[CustomerReport]) -> AnalysisResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for report in reports {
        writer.serialize(report)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str, purchases: u64, spent: f64, years: Option<i32>) -> AggregatedCustomer {
        AggregatedCustomer {
            customer_id: id.to_string(),
            total_purchases: purchases,
            total_spent: spent,
            years_active: years,
        }
    }

    fn sample_customers() -> Vec<AggregatedCustomer> {
        vec![
            customer("A", 10, 15000.0, Some(2)),
            customer("B", 4, 1200.0, Some(5)),
            customer("C", 0, 500.0, Some(3)),
            customer("D", 2, 300.0, None),
        ]
    }

    #[test]
    fn test_run_analysis() {
        let reports = run_analysis(&sample_customers(), &ValueModel::default(), &mut NoopObserver);

        let scored: Vec<_> = reports
            .iter()
            .map(|r| (r.customer_id.as_str(), r.clv_score, r.segment))
            .collect();
        assert_eq!(
            scored,
            vec![
                ("A", 3000.0, Segment::High),
                ("B", 1500.0, Segment::Medium),
                ("C", 0.0, Segment::Low),
                ("D", 0.0, Segment::Low),
            ]
        );
        assert_eq!(reports[3].years_active, None);
    }

    #[test]
    fn test_observer_sees_each_customer_once() {
        let mut seen = Vec::new();
        let mut observer = |event: &CustomerProcessed<'_>| {
            seen.push(event.report.customer_id.clone());
        };

        run_analysis(&sample_customers(), &ValueModel::default(), &mut observer);

        assert_eq!(seen, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_filter_by_segment() {
        let reports = run_analysis(&sample_customers(), &ValueModel::default(), &mut NoopObserver);

        assert_eq!(filter_by_segment(&reports, None).len(), 4);
        let low = filter_by_segment(&reports, Some(Segment::Low));
        assert_eq!(low.len(), 2);
        assert!(low.iter().all(|r| r.segment == Segment::Low));
    }

    #[test]
    fn test_summary() {
        let reports = run_analysis(&sample_customers(), &ValueModel::default(), &mut NoopObserver);
        let summary = AnalysisSummary::from_reports(&reports);

        assert_eq!(summary.total_customers, 4);
        assert_eq!(summary.segments.len(), 3);

        let low = summary.breakdown(Segment::Low).unwrap();
        assert_eq!(low.customers, 2);
        assert_eq!(low.total_spent, 800.0);
        assert_eq!(low.total_purchases, 2);
        assert_eq!(summary.percentage(Segment::Low), 50.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = AnalysisSummary::from_reports(&[]);

        assert_eq!(summary.total_customers, 0);
        assert!(summary.segments.iter().all(|b| b.customers == 0));
        assert_eq!(summary.percentage(Segment::High), 0.0);
    }
}
