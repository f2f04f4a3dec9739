//! Forecast quality and profit metrics.
//!
//! Profit follows a fixed business rule: units sold earn the unit price,
//! units overstocked cost [`HOLDING_COST_RATE`] of it. RMSE is measured on
//! the raw model output, profit on the adjusted (rounded, non-negative)
//! quantity.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::error::DemandError;
use super::records::forecast_series;
use crate::ports::data_port::DataPort;

/// Share of the unit price charged for every overstocked unit.
pub const HOLDING_COST_RATE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastMetrics {
    pub rmse: f64,
    pub profit: f64,
}

/// Per-bucket view of the profit rule, kept for export and inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitBreakdown {
    pub pred_adj: Vec<f64>,
    pub sold: Vec<f64>,
    pub overstock: Vec<f64>,
    pub revenue: f64,
    pub holding_cost: f64,
    pub profit: f64,
}

impl ProfitBreakdown {
    pub fn compute(truth: &[f64], pred: &[f64], unit_price: f64) -> Result<Self, DemandError> {
        check_lengths(truth, pred)?;

        let pred_adj: Vec<f64> = pred.iter().map(|&p| adjust_prediction(p)).collect();
        let sold: Vec<f64> = truth
            .iter()
            .zip(&pred_adj)
            .map(|(&t, &a)| nan_min(t, a))
            .collect();
        let overstock: Vec<f64> = truth
            .iter()
            .zip(&pred_adj)
            .map(|(&t, &a)| {
                let excess = a - t;
                if excess < 0.0 { 0.0 } else { excess }
            })
            .collect();

        let revenue: f64 = sold.iter().map(|s| s * unit_price).sum();
        let holding_cost: f64 = overstock
            .iter()
            .map(|o| o * unit_price * HOLDING_COST_RATE)
            .sum();

        Ok(Self {
            pred_adj,
            sold,
            overstock,
            revenue,
            holding_cost,
            profit: revenue - holding_cost,
        })
    }
}

/// Predictions become whole, non-negative units. Rounds half to even.
pub fn adjust_prediction(pred: f64) -> f64 {
    if pred > 0.0 {
        pred.round_ties_even()
    } else {
        0.0
    }
}

/// Root-mean-squared error between two aligned series. NaN when empty.
pub fn rmse(truth: &[f64], pred: &[f64]) -> Result<f64, DemandError> {
    check_lengths(truth, pred)?;
    let n = truth.len() as f64;
    let sse: f64 = truth
        .iter()
        .zip(pred)
        .map(|(t, p)| (p - t).powi(2))
        .sum();
    Ok((sse / n).sqrt())
}

pub fn compute_metrics(
    truth: &[f64],
    pred: &[f64],
    unit_price: f64,
) -> Result<ForecastMetrics, DemandError> {
    let breakdown = ProfitBreakdown::compute(truth, pred, unit_price)?;
    Ok(ForecastMetrics {
        rmse: rmse(truth, pred)?,
        profit: breakdown.profit,
    })
}

/// Metrics for one item, priced at its simulation price.
pub fn item_forecast_metrics(
    data: &dyn DataPort,
    item_id: u32,
) -> Result<ForecastMetrics, DemandError> {
    let item = data
        .item(item_id)?
        .ok_or(DemandError::UnknownItem { item_id })?;
    let records = data.forecasts(item_id)?;
    let (truth, pred) = forecast_series(&records);
    debug!(
        item_id,
        buckets = records.len(),
        price = item.simulation_price,
        "computing item metrics"
    );
    compute_metrics(&truth, &pred, item.simulation_price)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetrics {
    pub rmse: f64,
    pub profit: f64,
    pub items: usize,
    pub skipped_items: usize,
}

/// Whole-model metrics: RMSE over every forecast row, profit summed per item.
pub fn model_metrics(data: &dyn DataPort) -> Result<ModelMetrics, DemandError> {
    let forecasts = data.all_forecasts()?;
    let (truth, pred) = forecast_series(&forecasts);
    let rmse = rmse(&truth, &pred)?;

    let prices: BTreeMap<u32, f64> = data
        .items()?
        .into_iter()
        .map(|i| (i.item_id, i.simulation_price))
        .collect();

    let mut by_item: BTreeMap<u32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in &forecasts {
        let entry = by_item.entry(r.item_id).or_default();
        entry.0.push(r.truth);
        entry.1.push(r.pred);
    }

    let mut profit = 0.0;
    let mut items = 0usize;
    let mut skipped_items = 0usize;
    for (item_id, (truth, pred)) in &by_item {
        match prices.get(item_id) {
            Some(&price) => {
                profit += ProfitBreakdown::compute(truth, pred, price)?.profit;
                items += 1;
            }
            None => {
                warn!(item_id, "forecast rows without item price, skipping");
                skipped_items += 1;
            }
        }
    }

    Ok(ModelMetrics {
        rmse,
        profit,
        items,
        skipped_items,
    })
}

fn check_lengths(truth: &[f64], pred: &[f64]) -> Result<(), DemandError> {
    if truth.len() != pred.len() {
        return Err(DemandError::InvalidInput {
            truth_len: truth.len(),
            pred_len: pred.len(),
        });
    }
    Ok(())
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}
