//! Tabular representation of fetched BDM observations.
//!
//! A [`SeriesTable`] is the only output of the series fetcher. It is
//! vendor-format agnostic: rows carry the idbank, the period label as sent by
//! the API (`2024`, `2024-03`, `2024-Q1`, ...) and the numeric value, which may
//! be missing.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::models::query::SeriesQuery;

/// A single observation of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Identifier of the series this observation belongs to.
    pub idbank: String,
    /// Period label, kept verbatim.
    pub date: String,
    /// Observed value. `None` when the API reports no value for the period.
    pub value: Option<f64>,
}

/// Rows produced by one successful fetch, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    rows: Vec<Observation>,
    /// Number of series the producing query asked for. Zero when unknown.
    #[serde(default)]
    requested_series: usize,
}

impl SeriesTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self {
            rows,
            requested_series: 0,
        }
    }

    /// Rows fetched for `query`; the layout follows what was requested.
    pub fn for_query(rows: Vec<Observation>, query: &SeriesQuery) -> Self {
        Self {
            rows,
            requested_series: query.idbanks().len(),
        }
    }

    pub fn requested_series(&self) -> usize {
        self.requested_series
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct idbanks present in the table, in order of first appearance.
    pub fn idbanks(&self) -> IndexSet<&str> {
        self.rows.iter().map(|r| r.idbank.as_str()).collect()
    }

    /// True when several series were requested, or several are present.
    pub fn is_multi_series(&self) -> bool {
        self.requested_series > 1 || self.idbanks().len() > 1
    }

    /// Column names. `idbank` is only listed for multi-series tables.
    pub fn columns(&self) -> &'static [&'static str] {
        if self.is_multi_series() {
            &["idbank", "date", "value"]
        } else {
            &["date", "value"]
        }
    }

    /// Observations of a single series, in table order.
    pub fn series<'a>(&'a self, idbank: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.rows.iter().filter(move |r| r.idbank == idbank)
    }

    /// Requested idbanks for which the table holds no row.
    pub fn missing_idbanks<'q>(&self, query: &'q SeriesQuery) -> Vec<&'q str> {
        let present = self.idbanks();
        query
            .idbanks()
            .iter()
            .map(String::as_str)
            .filter(|id| !present.contains(id))
            .collect()
    }

    /// Renders the table as aligned text, limited to the first `max_rows` rows.
    pub fn render(&self, max_rows: Option<usize>) -> String {
        let columns = self.columns();
        let shown = max_rows.unwrap_or(self.rows.len()).min(self.rows.len());

        let cells: Vec<Vec<String>> = self.rows[..shown]
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| match *col {
                        "idbank" => row.idbank.clone(),
                        "date" => row.date.clone(),
                        _ => format_value(row.value),
                    })
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|r| r[i].len())
                    .chain(std::iter::once(col.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        push_line(&mut out, columns.iter().copied(), &widths, columns);
        for row in &cells {
            push_line(&mut out, row.iter().map(String::as_str), &widths, columns);
        }
        if shown < self.rows.len() {
            out.push_str(&format!("... {} more rows\n", self.rows.len() - shown));
        }
        out
    }
}

impl fmt::Display for SeriesTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NaN".to_string(),
    }
}

fn push_line<'a>(
    out: &mut String,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
    columns: &[&str],
) {
    let line: Vec<String> = cells
        .zip(widths)
        .zip(columns)
        .map(|((cell, &w), col)| {
            // numbers read better right-aligned
            if *col == "value" {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(idbank: &str, date: &str, value: Option<f64>) -> Observation {
        Observation {
            idbank: idbank.into(),
            date: date.into(),
            value,
        }
    }

    #[test]
    fn single_series_has_two_columns() {
        let t = SeriesTable::new(vec![
            obs("001688406", "2024-02", Some(118.3)),
            obs("001688406", "2024-01", Some(117.9)),
        ]);
        assert_eq!(t.columns(), ["date", "value"]);
        assert!(!t.is_multi_series());
        assert_eq!(
            t.render(None),
            "date     value\n2024-02  118.3\n2024-01  117.9\n"
        );
    }

    #[test]
    fn multi_series_adds_idbank_column() {
        let t = SeriesTable::new(vec![
            obs("001688406", "2024-01", Some(1.0)),
            obs("001688407", "2024-01", None),
        ]);
        assert_eq!(t.columns(), ["idbank", "date", "value"]);
        let text = t.render(None);
        assert!(text.starts_with("idbank     date     value\n"));
        assert!(text.contains("001688407  2024-01    NaN"));
    }

    #[test]
    fn render_truncates_and_reports_remaining_rows() {
        let rows = (1..=7)
            .map(|m| obs("001688406", &format!("2024-0{m}"), Some(m as f64)))
            .collect();
        let t = SeriesTable::new(rows);
        let text = t.render(Some(5));
        assert_eq!(text.lines().count(), 7);
        assert!(text.ends_with("... 2 more rows\n"));
    }

    #[test]
    fn missing_idbanks_lists_absent_series() {
        let q = SeriesQuery::builder(["001688406", "001688407", "010565692"])
            .build()
            .unwrap();
        let t = SeriesTable::new(vec![obs("001688407", "2024", Some(2.0))]);
        assert_eq!(t.missing_idbanks(&q), vec!["001688406", "010565692"]);
        assert_eq!(t.series("001688407").count(), 1);
    }

    #[test]
    fn requested_series_keep_the_idbank_column() {
        let q = SeriesQuery::builder(["001688406", "001688407"]).build().unwrap();
        let t = SeriesTable::for_query(vec![obs("001688406", "2024", Some(1.0))], &q);

        assert_eq!(t.requested_series(), 2);
        assert_eq!(t.columns(), ["idbank", "date", "value"]);
        assert_eq!(t.missing_idbanks(&q), vec!["001688407"]);
        assert_eq!(t.render(None), "idbank     date  value\n001688406  2024      1\n");
    }

    #[test]
    fn empty_table_renders_header_only() {
        let t = SeriesTable::default();
        assert!(t.is_empty());
        assert_eq!(t.to_string(), "date  value\n");
    }
}
