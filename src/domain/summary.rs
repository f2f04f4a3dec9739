//! Item cards, rating listings, price distributions and order aggregates.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::error::DemandError;
use super::records::{Bucket, BucketTotal, ItemRecord, OrderRecord};
use crate::ports::data_port::{DataPort, Granularity};

/// The per-item figures shown next to the order charts.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCard {
    pub item_id: u32,
    pub mean_sales_price: f64,
    pub simulation_price: f64,
    pub retail_price: f64,
    pub customer_rating: f64,
    pub manufacturer: Option<u32>,
}

pub fn item_card(data: &dyn DataPort, item_id: u32) -> Result<ItemCard, DemandError> {
    let item = data
        .item(item_id)?
        .ok_or(DemandError::UnknownItem { item_id })?;
    let daily = data.orders(item_id, Granularity::Daily)?;
    let prices: Vec<f64> = daily.iter().map(|r| r.sales_price).collect();

    Ok(ItemCard {
        item_id,
        mean_sales_price: mean(&prices),
        simulation_price: item.simulation_price,
        retail_price: item.retail_price,
        customer_rating: item.customer_rating,
        manufacturer: item.manufacturer,
    })
}

/// `(item_id, rating)` for every item of a manufacturer, by item id.
pub fn manufacturer_ratings(
    data: &dyn DataPort,
    manufacturer: u32,
) -> Result<Vec<(u32, f64)>, DemandError> {
    let mut ratings: Vec<(u32, f64)> = data
        .items()?
        .into_iter()
        .filter(|i| i.manufacturer == Some(manufacturer))
        .map(|i| (i.item_id, i.customer_rating))
        .collect();
    ratings.sort_by_key(|&(id, _)| id);
    Ok(ratings)
}

pub fn list_items(data: &dyn DataPort) -> Result<Vec<u32>, DemandError> {
    let ids: BTreeSet<u32> = data.items()?.into_iter().map(|i| i.item_id).collect();
    Ok(ids.into_iter().collect())
}

pub fn list_manufacturers(data: &dyn DataPort) -> Result<Vec<u32>, DemandError> {
    let ids: BTreeSet<u32> = data
        .items()?
        .into_iter()
        .filter_map(|i| i.manufacturer)
        .collect();
    Ok(ids.into_iter().collect())
}

/// Which item price a distribution is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Simulation,
    Retail,
}

impl PriceKind {
    fn of(self, item: &ItemRecord) -> f64 {
        match self {
            PriceKind::Simulation => item.simulation_price,
            PriceKind::Retail => item.retail_price,
        }
    }
}

impl FromStr for PriceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulation" => Ok(PriceKind::Simulation),
            "retail" => Ok(PriceKind::Retail),
            other => Err(format!(
                "unknown price kind '{}', expected simulation or retail",
                other
            )),
        }
    }
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceKind::Simulation => write!(f, "simulation"),
            PriceKind::Retail => write!(f, "retail"),
        }
    }
}

/// Items whose price falls in `[lower, upper)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceDistribution {
    pub kind: PriceKind,
    /// Non-empty bins in ascending price order.
    pub bins: Vec<PriceBin>,
    /// Items with no price of this kind (NaN).
    pub missing: usize,
}

/// Histogram of one price kind over all items, in fixed-width bins.
pub fn price_distribution(
    data: &dyn DataPort,
    kind: PriceKind,
    bin_width: f64,
) -> Result<PriceDistribution, DemandError> {
    if !(bin_width.is_finite() && bin_width > 0.0) {
        return Err(DemandError::InvalidBinWidth { width: bin_width });
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut missing = 0;
    for item in data.items()? {
        let price = kind.of(&item);
        if !price.is_finite() {
            missing += 1;
            continue;
        }
        *counts.entry((price / bin_width).floor() as i64).or_default() += 1;
    }

    let bins = counts
        .into_iter()
        .map(|(idx, count)| PriceBin {
            lower: idx as f64 * bin_width,
            upper: (idx + 1) as f64 * bin_width,
            count,
        })
        .collect();
    Ok(PriceDistribution {
        kind,
        bins,
        missing,
    })
}

/// Order totals for the whole catalogue.
///
/// Uses the precomputed totals when the source has them, otherwise
/// aggregates the per-item series.
pub fn order_totals(
    data: &dyn DataPort,
    granularity: Granularity,
) -> Result<Vec<BucketTotal>, DemandError> {
    match data.totals(granularity)? {
        Some(mut totals) => {
            totals.sort_by_key(|t| t.bucket);
            Ok(totals)
        }
        None => {
            warn!(
                ?granularity,
                "no order totals table, averaging per-item sales prices"
            );
            Ok(aggregate_orders(&data.all_orders(granularity)?))
        }
    }
}

/// Total units and mean sales price per bucket, in bucket order.
pub fn aggregate_orders(records: &[OrderRecord]) -> Vec<BucketTotal> {
    let mut groups: BTreeMap<Bucket, (f64, Vec<f64>)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(r.bucket).or_default();
        entry.0 += r.order;
        entry.1.push(r.sales_price);
    }
    groups
        .into_iter()
        .map(|(bucket, (order, prices))| BucketTotal {
            bucket,
            order,
            mean_sales_price: mean(&prices),
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
