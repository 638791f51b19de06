//! Source schemas and CSV ingestion of raw customer activity

use crate::error::{AnalysisError, AnalysisResult};
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Column layout of one activity source.
///
/// Every source carries the same four logical fields, but the since-year
/// column is named per source (`Customer Since` vs `Member Since`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    /// Source name used in logs and errors
    pub name: String,
    pub id_column: String,
    pub purchases_column: String,
    pub spent_column: String,
    /// One or more participation-start year columns
    pub since_columns: Vec<String>,
}

impl SourceSchema {
    pub fn new(
        name: impl Into<String>,
        id_column: impl Into<String>,
        purchases_column: impl Into<String>,
        spent_column: impl Into<String>,
        since_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id_column: id_column.into(),
            purchases_column: purchases_column.into(),
            spent_column: spent_column.into(),
            since_columns: vec![since_column.into()],
        }
    }

    /// Add another since-year column read from the same rows
    pub fn with_since_column(mut self, column: impl Into<String>) -> Self {
        self.since_columns.push(column.into());
        self
    }

    /// Layout of the `Customers` sheet export
    pub fn customers() -> Self {
        Self::new(
            "Customers",
            "Customer Id",
            "Total Purchase",
            "Total Spent",
            "Customer Since",
        )
    }

    /// Layout of the `Members` sheet export
    pub fn members() -> Self {
        Self::new(
            "Members",
            "Customer Id",
            "Total Purchase",
            "Total Spent",
            "Member Since",
        )
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.since_columns.is_empty() {
            return Err(AnalysisError::NoSinceColumn(self.name.clone()));
        }
        Ok(())
    }

    /// Locate every required column in a header row
    fn resolve(&self, headers: &StringRecord) -> AnalysisResult<ColumnIndices> {
        self.validate()?;

        let find = |column: &str| -> AnalysisResult<usize> {
            headers
                .iter()
                .position(|header| header.trim() == column)
                .ok_or_else(|| AnalysisError::MissingColumn {
                    source_name: self.name.clone(),
                    column: column.to_string(),
                })
        };

        Ok(ColumnIndices {
            id: find(&self.id_column)?,
            purchases: find(&self.purchases_column)?,
            spent: find(&self.spent_column)?,
            since: self
                .since_columns
                .iter()
                .map(|column| find(column))
                .collect::<AnalysisResult<Vec<_>>>()?,
        })
    }
}

struct ColumnIndices {
    id: usize,
    purchases: usize,
    spent: usize,
    since: Vec<usize>,
}

/// One row of activity from a single source
#[derive(Debug, Clone, PartialEq)]
pub struct RawActivityRecord {
    pub customer_id: String,
    pub purchase_count: u64,
    pub amount_spent: f64,
    /// One entry per since-year column of the source; `None` when missing
    pub since_years: Vec<Option<i32>>,
}

impl RawActivityRecord {
    pub fn new(
        customer_id: impl Into<String>,
        purchase_count: u64,
        amount_spent: f64,
        since_year: Option<i32>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            purchase_count,
            amount_spent,
            since_years: vec![since_year],
        }
    }

    /// Earliest participation year of this row, ignoring missing values
    pub fn earliest_since(&self) -> Option<i32> {
        self.since_years.iter().flatten().min().copied()
    }
}

/// A named collection of records from one source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub name: String,
    pub records: Vec<RawActivityRecord>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, records: Vec<RawActivityRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Coerce a since-year cell to a year.
///
/// Blank and non-numeric text is missing. Spreadsheet exports often write
/// integral floats (`2015.0`), which are accepted.
pub fn coerce_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }

    let value: f64 = trimmed.parse().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

fn coerce_count(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if let Ok(count) = trimmed.parse::<u64>() {
        return Some(count);
    }

    let value: f64 = trimmed.parse().ok()?;
    // u64::MAX as f64 rounds up to 2^64, which does not fit
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

fn coerce_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Read one source from any CSV reader
pub fn read_source<R: Read>(reader: R, schema: &SourceSchema) -> AnalysisResult<SourceTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = schema.resolve(&headers)?;

    let mut records = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let row = result?;
        let line = index + 2;
        let cell = |position: usize| row.get(position).unwrap_or("");

        // Ids are grouped as written; only an empty cell counts as missing
        let customer_id = cell(columns.id);
        if customer_id.is_empty() {
            // Rows without an id cannot be grouped
            debug!(source = %schema.name, line, "skipping row without customer id");
            continue;
        }

        let purchase_count = coerce_count(cell(columns.purchases)).unwrap_or_else(|| {
            debug!(source = %schema.name, line, value = cell(columns.purchases), "non-numeric purchase count");
            0
        });
        let amount_spent = coerce_amount(cell(columns.spent)).unwrap_or_else(|| {
            debug!(source = %schema.name, line, value = cell(columns.spent), "non-numeric amount spent");
            0.0
        });
        let since_years = columns
            .since
            .iter()
            .map(|&position| coerce_year(cell(position)))
            .collect();

        records.push(RawActivityRecord {
            customer_id: customer_id.to_string(),
            purchase_count,
            amount_spent,
            since_years,
        });
    }

    Ok(SourceTable::new(schema.name.clone(), records))
}

/// Load one source from a CSV file on disk
pub fn load_source(path: impl AsRef<Path>, schema: &SourceSchema) -> AnalysisResult<SourceTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let table = read_source(file, schema)?;

    info!(
        source = %schema.name,
        path = %path.display(),
        rows = table.records.len(),
        "loaded source"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOMERS_CSV: &str = "\
Customer Id,Total Purchase,Total Spent,Customer Since,Region
C1,5,1000,2020,North
C2,2,300.50,n/a,South
,4,80,2018,East
C3,1.0,45,2015.0,West
";

    #[test]
    fn test_coerce_year() {
        assert_eq!(coerce_year("2015"), Some(2015));
        assert_eq!(coerce_year(" 2015.0 "), Some(2015));
        assert_eq!(coerce_year(""), None);
        assert_eq!(coerce_year("unknown"), None);
        assert_eq!(coerce_year("2015.5"), None);
        assert_eq!(coerce_year("NaN"), None);
    }

    #[test]
    fn test_read_source() {
        let table = read_source(CUSTOMERS_CSV.as_bytes(), &SourceSchema::customers()).unwrap();

        assert_eq!(table.name, "Customers");
        // The row without an id is dropped
        assert_eq!(table.records.len(), 3);

        assert_eq!(table.records[0], RawActivityRecord::new("C1", 5, 1000.0, Some(2020)));
        assert_eq!(table.records[1].since_years, vec![None]);
        assert_eq!(table.records[1].amount_spent, 300.5);
        assert_eq!(table.records[2].purchase_count, 1);
        assert_eq!(table.records[2].earliest_since(), Some(2015));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let result = read_source(CUSTOMERS_CSV.as_bytes(), &SourceSchema::members());

        match result {
            Err(AnalysisError::MissingColumn { source_name, column }) => {
                assert_eq!(source_name, "Members");
                assert_eq!(column, "Member Since");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_without_since_column() {
        let mut schema = SourceSchema::customers();
        schema.since_columns.clear();

        let result = read_source(CUSTOMERS_CSV.as_bytes(), &schema);
        assert!(matches!(result, Err(AnalysisError::NoSinceColumn(_))));
    }

    #[test]
    fn test_non_numeric_totals_become_zero() {
        let csv = "Customer Id,Total Purchase,Total Spent,Member Since\nM1,lots,free,2019\n";
        let table = read_source(csv.as_bytes(), &SourceSchema::members()).unwrap();

        assert_eq!(table.records[0].purchase_count, 0);
        assert_eq!(table.records[0].amount_spent, 0.0);
        assert_eq!(table.records[0].since_years, vec![Some(2019)]);
    }

    #[test]
    fn test_unrepresentable_purchase_count_becomes_zero() {
        let csv = "Customer Id,Total Purchase,Total Spent,Member Since\nM1,1e30,10,2019\nM2,4.0,10,2019\n";
        let table = read_source(csv.as_bytes(), &SourceSchema::members()).unwrap();

        assert_eq!(table.records[0].purchase_count, 0);
        assert_eq!(table.records[1].purchase_count, 4);
    }

    #[test]
    fn test_customer_ids_are_not_trimmed() {
        let csv = "Customer Id,Total Purchase,Total Spent,Member Since\nC1,1,10,2019\nC1 ,2,20,2019\n";
        let table = read_source(csv.as_bytes(), &SourceSchema::members()).unwrap();

        let ids: Vec<_> = table.records.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C1 "]);
    }

    #[test]
    fn test_earliest_since_across_columns() {
        let csv = "\
Customer Id,Total Purchase,Total Spent,Customer Since,Member Since
C1,3,90,2019,2016
C2,1,10,,2021
C3,1,10,bad,
";
        let schema = SourceSchema::customers().with_since_column("Member Since");
        let table = read_source(csv.as_bytes(), &schema).unwrap();

        let earliest: Vec<_> = table.records.iter().map(|r| r.earliest_since()).collect();
        assert_eq!(earliest, vec![Some(2016), Some(2021), None]);
    }
}
