//! Charts with Plotters and console reporting of segmentation results

use crate::analysis::{filter_by_segment, AnalysisSummary, CustomerReport};
use crate::model::Segment;
use crate::stats::{correlation_matrix, ColumnSummary, CorrelationMatrix};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::info;

/// Colour used for a segment in every chart
pub fn segment_color(segment: Segment) -> RGBColor {
    match segment {
        Segment::High => GREEN,
        Segment::Medium => BLUE,
        Segment::Low => RED,
    }
}

/// Path next to `base` with `suffix` appended to the file stem.
///
/// `out/segments.png` with `_spent` becomes `out/segments_spent.png`.
pub fn sibling_path(base: &str, suffix: &str) -> String {
    let path = Path::new(base);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());

    path.with_file_name(format!("{}{}.{}", stem, suffix, extension))
        .to_string_lossy()
        .into_owned()
}

fn centered_text(size: u32) -> TextStyle<'static> {
    ("sans-serif", size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

fn draw_centered(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    text: &str,
    style: &TextStyle<'_>,
) -> crate::Result<()> {
    let (width, height) = area.dim_in_pixel();
    area.draw_text(text, style, (width as i32 / 2, height as i32 / 2))?;
    Ok(())
}

/// Donut chart with one slice per segment
fn draw_segment_donut(values: &[(Segment, f64)], title: &str, output_path: &str) -> crate::Result<()> {
    let root = BitMapBackend::new(output_path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 26))?;

    // Slice angles are shares of the total, so empty segments are left out
    let slices: Vec<(Segment, f64)> = values.iter().copied().filter(|(_, v)| *v > 0.0).collect();

    if slices.is_empty() {
        draw_centered(&area, "No customers", &centered_text(20))?;
    } else {
        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.38;
        let sizes: Vec<f64> = slices.iter().map(|(_, v)| *v).collect();
        let colors: Vec<RGBColor> = slices.iter().map(|(s, _)| segment_color(*s)).collect();
        let labels: Vec<&str> = slices.iter().map(|(s, _)| s.label()).collect();

        let mut donut = Pie::new(&center, &radius, &sizes, &colors, &labels);
        donut.donut_hole(radius * 0.4);
        donut.label_style(("sans-serif", 16).into_font().color(&BLACK));
        donut.percentages(("sans-serif", 14).into_font().color(&WHITE));
        area.draw(&donut)?;
    }

    root.present()?;
    info!(path = output_path, title, "chart saved");
    Ok(())
}

/// Customer count, spend and purchases per segment, one chart each
pub fn create_segment_charts(summary: &AnalysisSummary, base_output_path: &str) -> crate::Result<()> {
    let counts: Vec<(Segment, f64)> = summary
        .segments
        .iter()
        .map(|b| (b.segment, b.customers as f64))
        .collect();
    draw_segment_donut(
        &counts,
        "Total Customers by Customer Segment",
        &sibling_path(base_output_path, "_count"),
    )?;

    let spent: Vec<(Segment, f64)> = summary
        .segments
        .iter()
        .map(|b| (b.segment, b.total_spent))
        .collect();
    draw_segment_donut(
        &spent,
        "Total Spent by Customer Segment",
        &sibling_path(base_output_path, "_spent"),
    )?;

    let purchases: Vec<(Segment, f64)> = summary
        .segments
        .iter()
        .map(|b| (b.segment, b.total_purchases as f64))
        .collect();
    draw_segment_donut(
        &purchases,
        "Total Purchases by Customer Segment",
        &sibling_path(base_output_path, "_purchases"),
    )
}

/// Scatter plot of total purchases against total spent, coloured by segment
pub fn create_spend_scatter(reports: &[CustomerReport], output_path: &str) -> crate::Result<()> {
    let max_purchases = reports
        .iter()
        .map(|r| r.total_purchases as f64)
        .fold(0.0, f64::max)
        .max(1.0);
    let max_spent = reports
        .iter()
        .map(|r| r.total_spent)
        .fold(0.0, f64::max)
        .max(1.0);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Purchase vs Total Spent", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..(max_purchases * 1.1), 0f64..(max_spent * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Total Purchase")
        .y_desc("Total Spent")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for segment in Segment::ALL {
        let color = segment_color(segment);
        chart
            .draw_series(
                reports
                    .iter()
                    .filter(|r| r.segment == segment)
                    .map(|r| Circle::new((r.total_purchases as f64, r.total_spent), 4, color.filled())),
            )?
            .label(segment.label())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!(path = output_path, points = reports.len(), "scatter plot saved");
    Ok(())
}

const COOL: RGBColor = RGBColor(59, 76, 192);
const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
const WARM: RGBColor = RGBColor(180, 4, 38);

/// Blue-grey-red colour for a correlation in [-1, 1]; NaN is light grey
pub fn correlation_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return RGBColor(240, 240, 240);
    }

    let value = value.clamp(-1.0, 1.0);
    let (from, to, weight) = if value < 0.0 {
        (COOL, NEUTRAL, value + 1.0)
    } else {
        (NEUTRAL, WARM, value)
    };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * weight).round() as u8;

    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Annotated heatmap of a correlation matrix
pub fn create_correlation_heatmap(matrix: &CorrelationMatrix, output_path: &str) -> crate::Result<()> {
    let n = matrix.labels.len();

    let root = BitMapBackend::new(output_path, (600, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root
        .titled("Purchase vs Spent - Correlation Matrix Heatmap", ("sans-serif", 22))?
        .margin(10, 10, 10, 10);

    let (row_labels, body) = area.split_horizontally(140);
    let (_, row_labels) = row_labels.split_vertically(40);
    let (column_labels, grid) = body.split_vertically(40);

    let label_style = centered_text(15);
    for (cell, label) in column_labels.split_evenly((1, n)).iter().zip(&matrix.labels) {
        draw_centered(cell, label, &label_style)?;
    }
    for (cell, label) in row_labels.split_evenly((n, 1)).iter().zip(&matrix.labels) {
        draw_centered(cell, label, &label_style)?;
    }

    let value_style = centered_text(20);
    for (index, cell) in grid.split_evenly((n, n)).iter().enumerate() {
        let value = matrix.get(index / n, index % n);
        cell.fill(&correlation_color(value))?;
        draw_centered(cell, &format!("{:.2}", value), &value_style)?;
    }

    root.present()?;
    info!(path = output_path, "correlation heatmap saved");
    Ok(())
}

/// Render every chart, restricted to one segment when a filter is given
pub fn generate_visualization_report(
    reports: &[CustomerReport],
    base_output_path: &str,
    segment_filter: Option<Segment>,
) -> crate::Result<()> {
    let shown = filter_by_segment(reports, segment_filter);
    let summary = AnalysisSummary::from_reports(&shown);

    create_spend_scatter(&shown, base_output_path)?;
    create_segment_charts(&summary, base_output_path)?;

    // Correlation always covers every customer
    create_correlation_heatmap(
        &correlation_matrix(reports),
        &sibling_path(base_output_path, "_correlation"),
    )?;

    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.2}", v))
}

/// Print one line per customer
pub fn print_customer_reports(reports: &[CustomerReport]) {
    println!("CLV & Customer Segment for each Customer ID\n");
    for report in reports {
        let years = report
            .years_active
            .map_or_else(|| "NaN".to_string(), |y| y.to_string());
        println!(
            "Customer ID: {}, CLV: {:.2}, Customer Segment: {}, Years Active: {}",
            report.customer_id, report.clv_score, report.segment, years
        );
    }
}

/// Print per-segment counts and totals
pub fn print_segment_summary(summary: &AnalysisSummary) {
    println!("\n=== Segment Summary ===");
    println!("Total customers: {}", summary.total_customers);
    println!("  Segment      | Customers |     Share | Total Spent | Purchases");
    println!("  -------------|-----------|-----------|-------------|----------");
    for breakdown in &summary.segments {
        println!(
            "  {:12} | {:9} | {:8.1}% | {:11.2} | {:9}",
            breakdown.segment.label(),
            breakdown.customers,
            summary.percentage(breakdown.segment),
            breakdown.total_spent,
            breakdown.total_purchases
        );
    }
}

/// Print `describe`-style statistics, one row per column
pub fn print_summary_statistics(columns: &[ColumnSummary]) {
    println!("\n=== Summary Statistics ===");
    println!(
        "  {:14} | {:>5} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
        "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for column in columns {
        println!(
            "  {:14} | {:>5} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
            column.name,
            column.count,
            format_optional(column.mean),
            format_optional(column.std),
            format_optional(column.min),
            format_optional(column.q25),
            format_optional(column.median),
            format_optional(column.q75),
            format_optional(column.max),
        );
    }
}

/// Print the purchase vs spent correlation table
pub fn print_correlation_matrix(matrix: &CorrelationMatrix) {
    println!("\nPurchase vs Spent - Correlation Matrix Table:");
    print!("  {:14}", "");
    for label in &matrix.labels {
        print!(" | {:>14}", label);
    }
    println!();
    for (i, label) in matrix.labels.iter().enumerate() {
        print!("  {:14}", label);
        for j in 0..matrix.labels.len() {
            print!(" | {:>14.2}", matrix.get(i, j));
        }
        println!();
    }
}
