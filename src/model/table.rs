//! Tabular view of result rows, shared by the CSV and spreadsheet exports

use std::fmt;

use chrono::NaiveDate;

/// A single exported value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Empty => Ok(()),
        }
    }
}

/// A record that can be laid out as one row under fixed column headers
pub trait TabularRow {
    fn headers() -> &'static [&'static str];

    /// One cell per header, in header order
    fn cells(&self) -> Vec<Cell>;
}
