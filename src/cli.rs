//! CLI definition and dispatch.
//!
//! Every subcommand is one stateless recompute over the tables loaded at
//! start-up. Results go to stdout, diagnostics to the log on stderr.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::DemandError;
use crate::domain::format::{format_grouped, format_money, format_rmse};
use crate::domain::metrics::{self, ProfitBreakdown};
use crate::domain::records::forecast_series;
use crate::domain::summary::{self, PriceKind};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, Granularity};

#[derive(Parser, Debug)]
#[command(name = "demandboard", about = "Demand forecasting metrics and order summaries")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true, default_value = "demandboard.ini")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List item ids
    Items,
    /// List manufacturer ids
    Manufacturers,
    /// Show the price, rating and manufacturer card of an item
    Card {
        #[arg(long)]
        item: u32,
    },
    /// Show the order series of an item
    Orders {
        #[arg(long)]
        item: u32,
        #[arg(long)]
        monthly: bool,
    },
    /// Show orders aggregated over all items
    Totals {
        #[arg(long)]
        monthly: bool,
    },
    /// Show the distribution of item prices
    Prices {
        /// Price to histogram; repeat for both
        #[arg(long = "kind", default_values_t = [PriceKind::Simulation, PriceKind::Retail])]
        kinds: Vec<PriceKind>,
        #[arg(long, default_value_t = 10.0)]
        bin_width: f64,
    },
    /// Show customer ratings of a manufacturer's items
    Ratings {
        #[arg(long)]
        manufacturer: u32,
    },
    /// Show RMSE and profit of the forecast for an item
    Forecast {
        #[arg(long)]
        item: u32,
    },
    /// Show RMSE and profit of the forecast over all items
    Model,
    /// Export the per-day forecast breakdown of an item as CSV
    Breakdown {
        #[arg(long)]
        item: u32,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let config = load_config(&cli.config);

    let (level, ansi) = match &config {
        Ok(c) => (
            c.get_string("logging", "level")
                .unwrap_or_else(|| logging::DEFAULT_LEVEL.to_string()),
            c.get_bool("logging", "ansi", true),
        ),
        Err(_) => (logging::DEFAULT_LEVEL.to_string(), true),
    };
    logging::init(&level, ansi);

    let result = config
        .and_then(|c| run_with_config(&cli.command, &c, &mut io::stdout().lock()));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, DemandError> {
    FileConfigAdapter::from_file(path).map_err(|e| DemandError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn run_with_config(
    command: &Command,
    config: &dyn ConfigPort,
    out: &mut dyn Write,
) -> Result<(), DemandError> {
    let data = CsvAdapter::from_config(config)?;
    execute(command, &data, out)
}

pub fn execute(command: &Command, data: &dyn DataPort, out: &mut dyn Write) -> Result<(), DemandError> {
    info!(?command, "running");
    match command {
        Command::Items => {
            for id in summary::list_items(data)? {
                writeln!(out, "{id}")?;
            }
        }
        Command::Manufacturers => {
            for id in summary::list_manufacturers(data)? {
                writeln!(out, "{id}")?;
            }
        }
        Command::Card { item } => write_card(data, *item, out)?,
        Command::Orders { item, monthly } => {
            let rows = data.orders(*item, granularity(*monthly))?;
            if rows.is_empty() {
                info!(item, "no orders for item");
            }
            writeln!(out, "{:<8} {:>10} {:>12}", "bucket", "order", "sales_price")?;
            for r in &rows {
                writeln!(
                    out,
                    "{:<8} {:>10} {:>12}",
                    r.bucket.to_string(),
                    format_grouped(r.order, 0),
                    format_money(r.sales_price)
                )?;
            }
        }
        Command::Totals { monthly } => {
            let totals = summary::order_totals(data, granularity(*monthly))?;
            writeln!(out, "{:<8} {:>12} {:>16}", "bucket", "total_order", "avg_sales_price")?;
            for t in &totals {
                writeln!(
                    out,
                    "{:<8} {:>12} {:>16}",
                    t.bucket.to_string(),
                    format_grouped(t.order, 0),
                    format_money(t.mean_sales_price)
                )?;
            }
        }
        Command::Prices { kinds, bin_width } => write_prices(data, kinds, *bin_width, out)?,
        Command::Ratings { manufacturer } => {
            let ratings = summary::manufacturer_ratings(data, *manufacturer)?;
            if ratings.is_empty() {
                info!(manufacturer, "no items for manufacturer");
            }
            writeln!(out, "{:<8} {:>6}", "item", "rating")?;
            for (item, rating) in ratings {
                writeln!(out, "{:<8} {:>6}", item, rating)?;
            }
        }
        Command::Forecast { item } => {
            let m = metrics::item_forecast_metrics(data, *item)?;
            writeln!(out, "Item RMSE:    {}", format_rmse(m.rmse))?;
            writeln!(out, "Item Profit:  {}", format_money(m.profit))?;
        }
        Command::Model => {
            let m = metrics::model_metrics(data)?;
            writeln!(out, "Model RMSE:   {}", format_rmse(m.rmse))?;
            writeln!(out, "Model Profit: {}", format_money(m.profit))?;
            writeln!(out, "Items:        {} ({} skipped)", m.items, m.skipped_items)?;
        }
        Command::Breakdown { item } => write_breakdown(data, *item, out)?,
    }
    Ok(())
}

fn granularity(monthly: bool) -> Granularity {
    if monthly {
        Granularity::Monthly
    } else {
        Granularity::Daily
    }
}

fn write_card(data: &dyn DataPort, item: u32, out: &mut dyn Write) -> Result<(), DemandError> {
    let card = summary::item_card(data, item)?;
    let manufacturer = card
        .manufacturer
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string());

    writeln!(out, "Item:              {}", card.item_id)?;
    writeln!(out, "Avg. Sales Price:  {}", format_money(card.mean_sales_price))?;
    writeln!(out, "Promotion Price:   {}", card.simulation_price)?;
    writeln!(out, "Retail Price:      {}", card.retail_price)?;
    writeln!(out, "Customer Rating:   {}", card.customer_rating)?;
    writeln!(out, "Manufacturer:      {}", manufacturer)?;
    Ok(())
}

fn write_prices(
    data: &dyn DataPort,
    kinds: &[PriceKind],
    bin_width: f64,
    out: &mut dyn Write,
) -> Result<(), DemandError> {
    writeln!(out, "{:<10} {:>10} {:>10} {:>6}", "kind", "from", "to", "items")?;
    for &kind in kinds {
        let dist = summary::price_distribution(data, kind, bin_width)?;
        if dist.missing > 0 {
            info!(%kind, missing = dist.missing, "items without price");
        }
        for bin in &dist.bins {
            writeln!(
                out,
                "{:<10} {:>10} {:>10} {:>6}",
                kind.to_string(),
                format_money(bin.lower),
                format_money(bin.upper),
                bin.count
            )?;
        }
    }
    Ok(())
}

fn write_breakdown(data: &dyn DataPort, item: u32, out: &mut dyn Write) -> Result<(), DemandError> {
    let price = data
        .item(item)?
        .ok_or(DemandError::UnknownItem { item_id: item })?
        .simulation_price;
    let records = data.forecasts(item)?;
    let (truth, pred) = forecast_series(&records);
    let b = ProfitBreakdown::compute(&truth, &pred, price)?;

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["day", "truth", "pred", "pred_adj", "sold", "overstock"])
        .map_err(csv_error)?;
    for (i, r) in records.iter().enumerate() {
        wtr.write_record([
            r.day_of_year.to_string(),
            r.truth.to_string(),
            r.pred.to_string(),
            b.pred_adj[i].to_string(),
            b.sold[i].to_string(),
            b.overstock[i].to_string(),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;

    info!(
        item,
        revenue = b.revenue,
        holding_cost = b.holding_cost,
        profit = b.profit,
        "breakdown written"
    );
    Ok(())
}

fn csv_error(e: csv::Error) -> DemandError {
    DemandError::Io(io::Error::other(e))
}
