//! Descriptive statistics and correlation over scored customers

use crate::analysis::CustomerReport;
use ndarray::{Array1, Array2, Axis};

/// `describe`-style summary of one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: &'static str,
    /// Number of non-missing values
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (ddof = 1)
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    fn from_values(name: &'static str, values: Vec<f64>) -> Self {
        let column = Array1::from(values);
        let count = column.len();

        let mut sorted = column.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            name,
            count,
            mean: column.mean(),
            std: (count > 1).then(|| column.std(1.0)),
            min: sorted.first().copied(),
            q25: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            q75: percentile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Linear-interpolated percentile of sorted values, `q` in [0, 1]
fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Summary statistics for purchases, spend, tenure and CLV.
///
/// Customers with no tenure are left out of the `Years Active` column only.
pub fn describe(reports: &[CustomerReport]) -> Vec<ColumnSummary> {
    vec![
        ColumnSummary::from_values(
            "Total Purchase",
            reports.iter().map(|r| r.total_purchases as f64).collect(),
        ),
        ColumnSummary::from_values("Total Spent", reports.iter().map(|r| r.total_spent).collect()),
        ColumnSummary::from_values(
            "Years Active",
            reports
                .iter()
                .filter_map(|r| r.years_active.map(f64::from))
                .collect(),
        ),
        ColumnSummary::from_values("CLV", reports.iter().map(|r| r.clv_score).collect()),
    ]
}

/// Pearson correlation between a fixed set of columns
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<&'static str>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[[row, col]]
    }
}

/// Correlation of total purchases against total spent.
///
/// Entries are NaN when there are fewer than two customers or a column has
/// no variance.
pub fn correlation_matrix(reports: &[CustomerReport]) -> CorrelationMatrix {
    let labels = vec!["Total Purchase", "Total Spent"];
    let n_samples = reports.len();

    if n_samples < 2 {
        return CorrelationMatrix {
            labels,
            values: Array2::from_elem((2, 2), f64::NAN),
        };
    }

    let mut data = Array2::<f64>::zeros((n_samples, 2));
    for (mut row, report) in data.outer_iter_mut().zip(reports) {
        row[0] = report.total_purchases as f64;
        row[1] = report.total_spent;
    }

    let means = data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(2));
    let centered = &data - &means;
    let covariance = centered.t().dot(&centered) / (n_samples - 1) as f64;

    let values = Array2::from_shape_fn((2, 2), |(i, j)| {
        covariance[[i, j]] / (covariance[[i, i]] * covariance[[j, j]]).sqrt()
    });

    CorrelationMatrix { labels, values }
}
