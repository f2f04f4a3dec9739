//! CSV table adapter.
//!
//! Loads every table once into memory; lookups afterwards are plain filters
//! over immutable vectors.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::domain::error::DemandError;
use crate::domain::records::{
    Bucket, BucketTotal, ForecastRecord, ItemRecord, MonthBucket, OrderRecord,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, Granularity};

pub const INFOS_FILE: &str = "infos.csv";
pub const ITEMS_FILE: &str = "items.csv";
pub const DAILY_ORDERS_FILE: &str = "agg_orders_day.csv";
pub const MONTHLY_ORDERS_FILE: &str = "agg_orders_month.csv";
pub const RESULT_FILE: &str = "result.csv";
pub const DAILY_TOTALS_FILE: &str = "orders_day.csv";
pub const MONTHLY_TOTALS_FILE: &str = "orders_month.csv";

pub const DEFAULT_FIRST_DAY: u32 = 145;

/// Where the tables live and how they are delimited.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub dir: PathBuf,
    pub item_delimiter: u8,
    pub order_delimiter: u8,
    /// First day bucket assigned to forecast rows when `result.csv` has no
    /// `day_of_year` column.
    pub first_day: u32,
}

impl DataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            item_delimiter: b'|',
            order_delimiter: b',',
            first_day: DEFAULT_FIRST_DAY,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, DemandError> {
        let dir = config
            .get_string("data", "dir")
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| DemandError::ConfigMissing {
                section: "data".into(),
                key: "dir".into(),
            })?;

        let first_day = config.get_int("forecast", "first_day", DEFAULT_FIRST_DAY as i64);
        let first_day = u32::try_from(first_day)
            .ok()
            .filter(|d| (1..=366).contains(d))
            .ok_or_else(|| DemandError::ConfigInvalid {
                section: "forecast".into(),
                key: "first_day".into(),
                reason: format!("{} is not a day of year (1-366)", first_day),
            })?;

        Ok(Self {
            dir: PathBuf::from(dir.trim()),
            item_delimiter: delimiter(config, "item_delimiter", b'|')?,
            order_delimiter: delimiter(config, "order_delimiter", b',')?,
            first_day,
        })
    }
}

fn delimiter(config: &dyn ConfigPort, key: &str, default: u8) -> Result<u8, DemandError> {
    match config.get_string("data", key) {
        None => Ok(default),
        Some(value) => match value.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(DemandError::ConfigInvalid {
                section: "data".into(),
                key: key.into(),
                reason: format!("expected a single ASCII character, got '{}'", value),
            }),
        },
    }
}

#[derive(Debug, Deserialize)]
struct InfoRow {
    #[serde(rename = "itemID")]
    item_id: u32,
    #[serde(rename = "simulationPrice")]
    simulation_price: f64,
}

#[derive(Debug, Deserialize)]
struct ItemRow {
    #[serde(rename = "itemID")]
    item_id: u32,
    manufacturer: u32,
    #[serde(rename = "customerRating")]
    customer_rating: f64,
    #[serde(rename = "recommendedRetailPrice")]
    retail_price: f64,
}

#[derive(Debug, Deserialize)]
struct DailyOrderRow {
    #[serde(rename = "itemID")]
    item_id: u32,
    day_of_year: u32,
    order: f64,
    #[serde(rename = "salesPrice")]
    sales_price: f64,
}

#[derive(Debug, Deserialize)]
struct MonthlyOrderRow {
    #[serde(rename = "itemID")]
    item_id: u32,
    #[serde(deserialize_with = "month_label")]
    month: MonthBucket,
    order: f64,
    #[serde(rename = "salesPrice")]
    sales_price: f64,
}

#[derive(Debug, Deserialize)]
struct DailyTotalRow {
    day_of_year: u32,
    order: f64,
    #[serde(rename = "salesPrice")]
    sales_price: f64,
}

#[derive(Debug, Deserialize)]
struct MonthlyTotalRow {
    #[serde(deserialize_with = "month_label")]
    month: MonthBucket,
    order: f64,
    #[serde(rename = "salesPrice")]
    sales_price: f64,
}

fn month_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MonthBucket, D::Error> {
    let label = String::deserialize(deserializer)?;
    label.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    #[serde(rename = "itemID")]
    item_id: u32,
    #[serde(rename = "Truth")]
    truth: f64,
    #[serde(rename = "Pred")]
    pred: f64,
    #[serde(default)]
    day_of_year: Option<u32>,
}

pub struct CsvAdapter {
    items: BTreeMap<u32, ItemRecord>,
    forecasts: Vec<ForecastRecord>,
    daily: Vec<OrderRecord>,
    monthly: Vec<OrderRecord>,
    daily_totals: Option<Vec<BucketTotal>>,
    monthly_totals: Option<Vec<BucketTotal>>,
}

impl CsvAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, DemandError> {
        Self::load(&DataSource::from_config(config)?)
    }

    pub fn load(source: &DataSource) -> Result<Self, DemandError> {
        info!(dir = %source.dir.display(), "loading tables");

        let infos: Vec<InfoRow> = read_rows(&source.dir.join(INFOS_FILE), source.item_delimiter)?;
        let catalogue: HashMap<u32, ItemRow> =
            read_rows::<ItemRow>(&source.dir.join(ITEMS_FILE), source.item_delimiter)?
                .into_iter()
                .map(|row| (row.item_id, row))
                .collect();
        let items = join_items(infos, &catalogue);

        let daily = read_rows::<DailyOrderRow>(
            &source.dir.join(DAILY_ORDERS_FILE),
            source.order_delimiter,
        )?
        .into_iter()
        .map(|row| OrderRecord {
            item_id: row.item_id,
            bucket: Bucket::Day(row.day_of_year),
            order: row.order,
            sales_price: row.sales_price,
        })
        .collect::<Vec<_>>();

        let monthly = read_rows::<MonthlyOrderRow>(
            &source.dir.join(MONTHLY_ORDERS_FILE),
            source.order_delimiter,
        )?
        .into_iter()
        .map(|row| OrderRecord {
            item_id: row.item_id,
            bucket: Bucket::Month(row.month),
            order: row.order,
            sales_price: row.sales_price,
        })
        .collect::<Vec<_>>();

        let daily_totals = read_optional_rows::<DailyTotalRow>(
            &source.dir.join(DAILY_TOTALS_FILE),
            source.order_delimiter,
        )?
        .map(|rows| {
            rows.into_iter()
                .map(|row| BucketTotal {
                    bucket: Bucket::Day(row.day_of_year),
                    order: row.order,
                    mean_sales_price: row.sales_price,
                })
                .collect::<Vec<_>>()
        });
        let monthly_totals = read_optional_rows::<MonthlyTotalRow>(
            &source.dir.join(MONTHLY_TOTALS_FILE),
            source.order_delimiter,
        )?
        .map(|rows| {
            rows.into_iter()
                .map(|row| BucketTotal {
                    bucket: Bucket::Month(row.month),
                    order: row.order,
                    mean_sales_price: row.sales_price,
                })
                .collect::<Vec<_>>()
        });

        let results: Vec<ResultRow> =
            read_rows(&source.dir.join(RESULT_FILE), source.order_delimiter)?;
        let forecasts = assign_days(results, source.first_day);

        info!(
            items = items.len(),
            daily_orders = daily.len(),
            monthly_orders = monthly.len(),
            forecasts = forecasts.len(),
            daily_totals = daily_totals.is_some(),
            monthly_totals = monthly_totals.is_some(),
            "tables loaded"
        );

        Ok(Self {
            items,
            forecasts,
            daily,
            monthly,
            daily_totals,
            monthly_totals,
        })
    }

    fn series(&self, granularity: Granularity) -> &[OrderRecord] {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Monthly => &self.monthly,
        }
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path, delimiter: u8) -> Result<Vec<T>, DemandError> {
    let file = path.display().to_string();
    debug!(file = %file, "reading table");

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DemandError::DataRead {
            file: file.clone(),
            reason: e.to_string(),
        })?;

    rdr.deserialize()
        .map(|row| {
            row.map_err(|e| DemandError::DataParse {
                file: file.clone(),
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Like `read_rows`, but an absent file is `None` rather than an error.
fn read_optional_rows<T: DeserializeOwned>(
    path: &Path,
    delimiter: u8,
) -> Result<Option<Vec<T>>, DemandError> {
    if !path.is_file() {
        debug!(file = %path.display(), "optional table absent");
        return Ok(None);
    }
    read_rows(path, delimiter).map(Some)
}

/// Left join of pricing info onto the item catalogue.
fn join_items(infos: Vec<InfoRow>, catalogue: &HashMap<u32, ItemRow>) -> BTreeMap<u32, ItemRecord> {
    infos
        .into_iter()
        .map(|info| {
            let row = catalogue.get(&info.item_id);
            let record = ItemRecord {
                item_id: info.item_id,
                manufacturer: row.map(|r| r.manufacturer),
                simulation_price: info.simulation_price,
                retail_price: row.map_or(f64::NAN, |r| r.retail_price),
                customer_rating: row.map_or(f64::NAN, |r| r.customer_rating),
            };
            (info.item_id, record)
        })
        .collect()
}

fn assign_days(rows: Vec<ResultRow>, first_day: u32) -> Vec<ForecastRecord> {
    let mut next_day: HashMap<u32, u32> = HashMap::new();
    rows.into_iter()
        .map(|row| {
            let counter = next_day.entry(row.item_id).or_insert(first_day);
            let day_of_year = row.day_of_year.unwrap_or(*counter);
            *counter = counter.saturating_add(1);
            ForecastRecord {
                item_id: row.item_id,
                day_of_year,
                pred: row.pred,
                truth: row.truth,
            }
        })
        .collect()
}

impl DataPort for CsvAdapter {
    fn item(&self, item_id: u32) -> Result<Option<ItemRecord>, DemandError> {
        Ok(self.items.get(&item_id).cloned())
    }

    fn items(&self) -> Result<Vec<ItemRecord>, DemandError> {
        Ok(self.items.values().cloned().collect())
    }

    fn forecasts(&self, item_id: u32) -> Result<Vec<ForecastRecord>, DemandError> {
        Ok(self
            .forecasts
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect())
    }

    fn all_forecasts(&self) -> Result<Vec<ForecastRecord>, DemandError> {
        Ok(self.forecasts.clone())
    }

    fn orders(
        &self,
        item_id: u32,
        granularity: Granularity,
    ) -> Result<Vec<OrderRecord>, DemandError> {
        let mut rows: Vec<OrderRecord> = self
            .series(granularity)
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.bucket);
        Ok(rows)
    }

    fn all_orders(&self, granularity: Granularity) -> Result<Vec<OrderRecord>, DemandError> {
        Ok(self.series(granularity).to_vec())
    }

    fn totals(&self, granularity: Granularity) -> Result<Option<Vec<BucketTotal>>, DemandError> {
        Ok(match granularity {
            Granularity::Daily => self.daily_totals.clone(),
            Granularity::Monthly => self.monthly_totals.clone(),
        })
    }
}
