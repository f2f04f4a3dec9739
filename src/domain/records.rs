//! Order, forecast and item records.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// A calendar month, parsed from `MM-YYYY` labels such as `01-2018`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Short display label, e.g. `Jan-18`.
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(d) => d.format("%b-%y").to_string(),
            None => self.to_string(),
        }
    }
}

impl FromStr for MonthBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(&format!("01-{}", s.trim()), "%d-%m-%Y")
            .map_err(|e| format!("invalid month '{}': {}", s, e))?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.month, self.year)
    }
}

/// Time bucket that aligns order and forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Day(u32),
    Month(MonthBucket),
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Day(d) => write!(f, "{}", d),
            Bucket::Month(m) => write!(f, "{}", m.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub item_id: u32,
    pub bucket: Bucket,
    pub order: f64,
    pub sales_price: f64,
}

/// Orders of all items in one bucket.
///
/// `mean_sales_price` is the mean over the underlying orders, not over items.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketTotal {
    pub bucket: Bucket,
    pub order: f64,
    pub mean_sales_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub item_id: u32,
    pub day_of_year: u32,
    pub pred: f64,
    pub truth: f64,
}

/// Item metadata joined from the info and item tables.
///
/// `manufacturer` is `None` and the retail price and rating are NaN when the
/// item has pricing info but no catalogue row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub item_id: u32,
    pub manufacturer: Option<u32>,
    pub simulation_price: f64,
    pub retail_price: f64,
    pub customer_rating: f64,
}

/// Splits forecast rows into index-aligned `(truth, pred)` sequences.
pub fn forecast_series(records: &[ForecastRecord]) -> (Vec<f64>, Vec<f64>) {
    records.iter().map(|r| (r.truth, r.pred)).unzip()
}
