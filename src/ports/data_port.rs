//! Read-only tabular data port.

use crate::domain::error::DemandError;
use crate::domain::records::{BucketTotal, ForecastRecord, ItemRecord, OrderRecord};

/// Bucket size of an order series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Monthly,
}

/// Rows filtered by entity key. An unknown key yields an empty result.
pub trait DataPort {
    fn item(&self, item_id: u32) -> Result<Option<ItemRecord>, DemandError>;

    fn items(&self) -> Result<Vec<ItemRecord>, DemandError>;

    fn forecasts(&self, item_id: u32) -> Result<Vec<ForecastRecord>, DemandError>;

    fn all_forecasts(&self) -> Result<Vec<ForecastRecord>, DemandError>;

    fn orders(
        &self,
        item_id: u32,
        granularity: Granularity,
    ) -> Result<Vec<OrderRecord>, DemandError>;

    fn all_orders(&self, granularity: Granularity) -> Result<Vec<OrderRecord>, DemandError>;

    /// Precomputed totals over all orders, if the source has them.
    fn totals(&self, granularity: Granularity) -> Result<Option<Vec<BucketTotal>>, DemandError>;
}
