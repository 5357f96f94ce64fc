//! Semicolon-separated yearly report
//!
//! Every row is `year;age;expenses` followed by the manager's columns for
//! that year. The header is taken from the same column list, so header and
//! rows line up by construction.

use crate::model::{SimulationResult, YearSnapshot};

pub const SEPARATOR: char = ';';

/// Format a currency value with thousands separators, e.g. `$1,234.50`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }

    let total_cents = (value.abs() * 100.0).round() as i64;
    let dollars = total_cents / 100;
    let cents = total_cents % 100;

    let dollars_str = dollars.to_string();
    let mut result = String::new();
    for (i, c) in dollars_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let dollars_formatted: String = result.chars().rev().collect();

    if value < 0.0 && total_cents > 0 {
        format!("-${dollars_formatted}.{cents:02}")
    } else {
        format!("${dollars_formatted}.{cents:02}")
    }
}

pub struct Report<'a> {
    result: &'a SimulationResult,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a SimulationResult) -> Self {
        Self { result }
    }

    pub fn header(&self) -> String {
        let mut fields = vec!["year".to_string(), "age".to_string(), "expenses".to_string()];
        if let Some(first) = self.result.years.first() {
            fields.extend(first.columns.iter().map(|c| c.name.clone()));
        }
        fields.join(&SEPARATOR.to_string())
    }

    pub fn row(snapshot: &YearSnapshot) -> String {
        let mut fields = vec![
            snapshot.year.to_string(),
            snapshot.age.to_string(),
            format_currency(snapshot.expenses),
        ];
        fields.extend(snapshot.columns.iter().map(|c| format_currency(c.value)));
        fields.join(&SEPARATOR.to_string())
    }

    /// Header line followed by one line per simulated year
    pub fn render(&self) -> String {
        let mut out = self.header();
        out.push('\n');
        for snapshot in &self.result.years {
            out.push_str(&Self::row(snapshot));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReportColumn, YearlyTaxes};

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.125), "-$42.13");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(f64::INFINITY), "$inf");
    }

    #[test]
    fn test_header_and_rows_align() {
        let snapshot = |year| YearSnapshot {
            year,
            age: year - 1960,
            expenses: 50_000.0,
            taxes: YearlyTaxes::default(),
            columns: vec![
                ReportColumn::new("Brokerage", 10.0),
                ReportColumn::new("Brokerage-pay", 2.5),
            ],
        };
        let result = SimulationResult {
            start_year: 2025,
            end_year: 2026,
            years: vec![snapshot(2025), snapshot(2026)],
            final_balances: vec![],
        };
        let report = Report::new(&result);
        let rendered = report.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "year;age;expenses;Brokerage;Brokerage-pay");
        assert_eq!(lines[1], "2025;65;$50,000.00;$10.00;$2.50");
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.split(';').count() == 5));
    }

    #[test]
    fn test_render_is_header_then_rows() {
        let empty = SimulationResult {
            start_year: 2025,
            end_year: 2025,
            years: vec![],
            final_balances: vec![],
        };
        assert_eq!(Report::new(&empty).render(), "year;age;expenses\n");

        let result = SimulationResult {
            years: vec![YearSnapshot {
                year: 2025,
                age: 65,
                expenses: 1.0,
                taxes: YearlyTaxes::default(),
                columns: vec![ReportColumn::new("total-tax", 0.5)],
            }],
            ..empty
        };
        assert_eq!(
            Report::new(&result).render(),
            "year;age;expenses;total-tax\n2025;65;$1.00;$0.50\n"
        );
    }
}
