#![allow(dead_code)]

use demandboard::domain::error::DemandError;
use demandboard::domain::records::{Bucket, BucketTotal, ForecastRecord, ItemRecord, OrderRecord};
use demandboard::ports::data_port::{DataPort, Granularity};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub items: Vec<ItemRecord>,
    pub forecasts: Vec<ForecastRecord>,
    pub daily: Vec<OrderRecord>,
    pub monthly: Vec<OrderRecord>,
    pub daily_totals: Option<Vec<BucketTotal>>,
    pub errors: HashMap<u32, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            forecasts: Vec::new(),
            daily: Vec::new(),
            monthly: Vec::new(),
            daily_totals: None,
            errors: HashMap::new(),
        }
    }

    pub fn with_item(mut self, item_id: u32, manufacturer: u32, price: f64, rating: f64) -> Self {
        self.items.push(ItemRecord {
            item_id,
            manufacturer: Some(manufacturer),
            simulation_price: price,
            retail_price: price * 1.2,
            customer_rating: rating,
        });
        self
    }

    /// Forecast rows for consecutive days starting at 145.
    pub fn with_forecasts(mut self, item_id: u32, truth: &[f64], pred: &[f64]) -> Self {
        for (i, (&t, &p)) in truth.iter().zip(pred).enumerate() {
            self.forecasts.push(ForecastRecord {
                item_id,
                day_of_year: 145 + i as u32,
                pred: p,
                truth: t,
            });
        }
        self
    }

    pub fn with_daily_order(mut self, item_id: u32, day: u32, order: f64, price: f64) -> Self {
        self.daily.push(OrderRecord {
            item_id,
            bucket: Bucket::Day(day),
            order,
            sales_price: price,
        });
        self
    }

    pub fn with_daily_total(mut self, day: u32, order: f64, mean_price: f64) -> Self {
        self.daily_totals.get_or_insert_with(Vec::new).push(BucketTotal {
            bucket: Bucket::Day(day),
            order,
            mean_sales_price: mean_price,
        });
        self
    }

    pub fn with_error(mut self, item_id: u32, reason: &str) -> Self {
        self.errors.insert(item_id, reason.to_string());
        self
    }

    fn check(&self, item_id: u32) -> Result<(), DemandError> {
        match self.errors.get(&item_id) {
            Some(reason) => Err(DemandError::DataRead {
                file: "mock".into(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn series(&self, granularity: Granularity) -> &[OrderRecord] {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Monthly => &self.monthly,
        }
    }
}

impl DataPort for MockDataPort {
    fn item(&self, item_id: u32) -> Result<Option<ItemRecord>, DemandError> {
        self.check(item_id)?;
        Ok(self.items.iter().find(|i| i.item_id == item_id).cloned())
    }

    fn items(&self) -> Result<Vec<ItemRecord>, DemandError> {
        Ok(self.items.clone())
    }

    fn forecasts(&self, item_id: u32) -> Result<Vec<ForecastRecord>, DemandError> {
        self.check(item_id)?;
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
        self.check(item_id)?;
        Ok(self
            .series(granularity)
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect())
    }

    fn all_orders(&self, granularity: Granularity) -> Result<Vec<OrderRecord>, DemandError> {
        Ok(self.series(granularity).to_vec())
    }

    fn totals(&self, granularity: Granularity) -> Result<Option<Vec<BucketTotal>>, DemandError> {
        Ok(match granularity {
            Granularity::Daily => self.daily_totals.clone(),
            Granularity::Monthly => None,
        })
    }
}

/// Writes a small but complete set of tables into `dir`.
pub fn write_tables(dir: &Path) {
    fs::write(
        dir.join("infos.csv"),
        "itemID|simulationPrice|promotion\n1|5.0|\n2|10.0|\n",
    )
    .unwrap();
    fs::write(
        dir.join("items.csv"),
        "itemID|brand|manufacturer|customerRating|category1|category2|category3|recommendedRetailPrice\n\
         1|0|1|4.38|1|1|1|8.84\n\
         2|0|1|0.0|1|2|1|16.92\n",
    )
    .unwrap();
    fs::write(
        dir.join("agg_orders_day.csv"),
        "itemID,day_of_year,order,salesPrice\n\
         1,1,1200,4.0\n\
         1,2,1300,6.0\n\
         2,1,5,10.0\n",
    )
    .unwrap();
    fs::write(
        dir.join("orders_day.csv"),
        "day_of_year,order,salesPrice\n1,1205,5.2\n2,1300,6.0\n",
    )
    .unwrap();
    fs::write(
        dir.join("agg_orders_month.csv"),
        "itemID,month,order,salesPrice\n\
         1,01-2018,2500,5.0\n\
         2,01-2018,5,10.0\n",
    )
    .unwrap();
    fs::write(
        dir.join("result.csv"),
        "itemID,Truth,Pred\n1,10,8\n1,20,25\n2,0,-3\n",
    )
    .unwrap();
}

pub fn write_config(dir: &Path, data_dir: &Path) -> std::path::PathBuf {
    let path = dir.join("demandboard.ini");
    fs::write(
        &path,
        format!(
            "[data]\ndir = {}\n\n[logging]\nlevel = warn\nansi = false\n",
            data_dir.display()
        ),
    )
    .unwrap();
    path
}
