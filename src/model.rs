//! Customer lifetime value scoring and segmentation

use crate::aggregate::AggregatedCustomer;
use crate::error::{AnalysisError, AnalysisResult};
use serde::Serialize;
use std::fmt;

/// Value tier a customer falls into
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum,
)]
pub enum Segment {
    #[serde(rename = "High Value")]
    High,
    #[serde(rename = "Medium Value")]
    Medium,
    #[serde(rename = "Low Value")]
    Low,
}

impl Segment {
    /// All segments, highest first
    pub const ALL: [Segment; 3] = [Segment::High, Segment::Medium, Segment::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Segment::High => "High Value",
            Segment::Medium => "Medium Value",
            Segment::Low => "Low Value",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// CLV cut-offs between segments.
///
/// Medium is closed on both ends: `medium <= clv <= high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentThresholds {
    pub medium: f64,
    pub high: f64,
}

impl SegmentThresholds {
    pub fn new(medium: f64, high: f64) -> AnalysisResult<Self> {
        // Also rejects NaN
        if !(medium <= high) {
            return Err(AnalysisError::InvalidThresholds { medium, high });
        }
        Ok(Self { medium, high })
    }
}

impl Default for SegmentThresholds {
    fn default() -> Self {
        Self {
            medium: 1000.0,
            high: 2000.0,
        }
    }
}

/// Score and segment derived for one customer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAssessment {
    pub clv_score: f64,
    pub segment: Segment,
}

/// Round to two decimals, halves away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Customer lifetime value: average order value times years active.
///
/// Customers without purchases or without positive tenure are worth zero,
/// whatever they spent.
pub fn calculate_clv(total_purchases: u64, total_spent: f64, years_active: i32) -> f64 {
    if total_purchases > 0 && years_active > 0 {
        round2((total_spent / total_purchases as f64) * years_active as f64)
    } else {
        0.0
    }
}

/// Segment a CLV with the default thresholds
pub fn segment_customer(clv: f64) -> Segment {
    ValueModel::default().segment_customer(clv)
}

/// Stateless CLV model parameterised by its segment thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueModel {
    thresholds: SegmentThresholds,
}

impl ValueModel {
    pub fn new(thresholds: SegmentThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SegmentThresholds {
        &self.thresholds
    }

    pub fn segment_customer(&self, clv: f64) -> Segment {
        if clv > self.thresholds.high {
            Segment::High
        } else if clv >= self.thresholds.medium {
            Segment::Medium
        } else {
            Segment::Low
        }
    }

    pub fn assess(&self, customer: &AggregatedCustomer) -> ValueAssessment {
        let clv_score = calculate_clv(
            customer.total_purchases,
            customer.total_spent,
            customer.tenure(),
        );

        ValueAssessment {
            clv_score,
            segment: self.segment_customer(clv_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_clv() {
        assert_eq!(calculate_clv(10, 15000.0, 2), 3000.0);
        assert_eq!(calculate_clv(3, 10.0, 1), 3.33);
        assert_eq!(calculate_clv(3, 2.0, 1), 0.67);
    }

    #[test]
    fn test_clv_rounds_half_away_from_zero() {
        // 1 / 8 = 0.125 is exact in binary; banker's rounding would give 0.12
        assert_eq!(calculate_clv(8, 1.0, 1), 0.13);
    }

    #[test]
    fn test_clv_floor_at_zero() {
        assert_eq!(calculate_clv(0, 500.0, 3), 0.0);
        assert_eq!(calculate_clv(4, 500.0, 0), 0.0);
        assert_eq!(calculate_clv(4, 500.0, -2), 0.0);
    }

    #[test]
    fn test_clv_idempotent() {
        let first = calculate_clv(7, 1234.56, 3);
        assert_eq!(first, calculate_clv(7, 1234.56, 3));
    }

    #[test]
    fn test_segment_boundaries() {
        assert_eq!(segment_customer(2000.0), Segment::Medium);
        assert_eq!(segment_customer(2000.01), Segment::High);
        assert_eq!(segment_customer(1000.0), Segment::Medium);
        assert_eq!(segment_customer(999.99), Segment::Low);
        assert_eq!(segment_customer(0.0), Segment::Low);
    }

    #[test]
    fn test_custom_thresholds() {
        let model = ValueModel::new(SegmentThresholds::new(100.0, 500.0).unwrap());

        assert_eq!(model.segment_customer(501.0), Segment::High);
        assert_eq!(model.segment_customer(100.0), Segment::Medium);
        assert_eq!(model.segment_customer(99.0), Segment::Low);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(SegmentThresholds::new(3000.0, 2000.0).is_err());
        assert!(SegmentThresholds::new(f64::NAN, 2000.0).is_err());
        assert!(SegmentThresholds::new(1500.0, 1500.0).is_ok());
    }

    #[test]
    fn test_assess() {
        let model = ValueModel::default();
        let customer = AggregatedCustomer {
            customer_id: "C1".to_string(),
            total_purchases: 10,
            total_spent: 15000.0,
            years_active: Some(2),
        };

        let assessment = model.assess(&customer);
        assert_eq!(assessment.clv_score, 3000.0);
        assert_eq!(assessment.segment, Segment::High);
    }

    #[test]
    fn test_assess_missing_tenure() {
        let customer = AggregatedCustomer {
            customer_id: "C9".to_string(),
            total_purchases: 4,
            total_spent: 9000.0,
            years_active: None,
        };

        let assessment = ValueModel::default().assess(&customer);
        assert_eq!(assessment.clv_score, 0.0);
        assert_eq!(assessment.segment, Segment::Low);
    }

    #[test]
    fn test_segment_labels() {
        assert_eq!(Segment::High.to_string(), "High Value");
        assert_eq!(Segment::Medium.label(), "Medium Value");
        assert_eq!(Segment::Low.label(), "Low Value");
    }
}
