//! Stock Sync - vendor feed to marketplace stock & price sync
//!
//! Loads the vendor stock feed once, then syncs each selected marketplace in
//! turn. A seller failure does not stop the marketplace campaigns, but the
//! first failing campaign stops the ones after it. The process exits with
//! the code of the first failure.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqwest::Client;
use stock_sync::config::{require, DEFAULT_TIMEOUT};
use stock_sync::feed::VENDOR_SHEET_SKIP_ROWS;
use stock_sync::pipeline::sync_market_campaigns;
use stock_sync::{
    http_client, BatchLimits, CsvFeed, FeedLocation, FeedRecord, FeedSource, MarketCampaign,
    MarketConfig, Marketplace, SellerClient, SellerConfig, SyncError, SyncPipeline, SyncSummary,
    ZipSheetFeed,
};

/// Marketplaces to sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Seller,
    Market,
    All,
}

/// Vendor stock feed sync - pushes stock and prices to marketplaces
#[derive(Parser, Debug)]
#[command(name = "stock_sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Which marketplaces to sync
    #[arg(long, value_enum, default_value_t = Target::All)]
    target: Target,

    /// Stock feed: path or http(s) URL of a zipped workbook (.zip) or CSV export
    #[arg(long, env = "FEED_SOURCE")]
    feed: String,

    /// Rows above the feed header row [default: 17 for .zip feeds, 0 for CSV]
    #[arg(long, env = "FEED_SKIP_ROWS")]
    feed_skip_rows: Option<usize>,

    /// Seller platform API key
    #[arg(long, env = "SELLER_TOKEN", hide_env_values = true)]
    seller_token: Option<String>,

    /// Seller platform client id
    #[arg(long, env = "CLIENT_ID")]
    client_id: Option<String>,

    /// Marketplace platform OAuth token
    #[arg(long, env = "MARKET_TOKEN", hide_env_values = true)]
    market_token: Option<String>,

    /// FBS campaign id
    #[arg(long, env = "FBS_ID")]
    fbs_id: Option<String>,

    /// DBS campaign id
    #[arg(long, env = "DBS_ID")]
    dbs_id: Option<String>,

    /// Warehouse of the FBS campaign
    #[arg(long, env = "WAREHOUSE_FBS_ID")]
    warehouse_fbs_id: Option<String>,

    /// Warehouse of the DBS campaign
    #[arg(long, env = "WAREHOUSE_DBS_ID")]
    warehouse_dbs_id: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SYNC_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Override the seller stock batch size
    #[arg(long)]
    seller_stock_batch: Option<usize>,

    /// Override the seller price batch size
    #[arg(long)]
    seller_price_batch: Option<usize>,

    /// Override the marketplace stock batch size
    #[arg(long)]
    market_stock_batch: Option<usize>,

    /// Override the marketplace price batch size
    #[arg(long)]
    market_price_batch: Option<usize>,

    /// Build batches and log them without pushing anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl Args {
    fn syncs_seller(&self) -> bool {
        matches!(self.target, Target::Seller | Target::All)
    }

    fn syncs_market(&self) -> bool {
        matches!(self.target, Target::Market | Target::All)
    }

    fn seller_config(&self) -> Result<SellerConfig, SyncError> {
        Ok(SellerConfig {
            client_id: require("CLIENT_ID", self.client_id.clone())?,
            api_key: require("SELLER_TOKEN", self.seller_token.clone())?,
        })
    }

    fn market_config(&self) -> Result<MarketConfig, SyncError> {
        let token = require("MARKET_TOKEN", self.market_token.clone())?;
        MarketConfig::new(
            token,
            vec![
                MarketCampaign::from_settings(
                    "FBS",
                    self.fbs_id.clone(),
                    self.warehouse_fbs_id.clone(),
                )?,
                MarketCampaign::from_settings(
                    "DBS",
                    self.dbs_id.clone(),
                    self.warehouse_dbs_id.clone(),
                )?,
            ],
        )
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match dotenvy::dotenv() {
        Ok(path) => log::info!("Loaded .env from: {}", path.display()),
        Err(e) => log::debug!("No .env file loaded: {}", e),
    }

    let args = Args::parse();
    log::info!("Starting stock_sync (target: {:?})...", args.target);
    if args.dry_run {
        log::info!("Dry run: no updates will be pushed");
    }

    if let Err(e) = run(&args).await {
        let category = e.category();
        log::error!("{}: {}", category.describe(), e);
        std::process::exit(category.exit_code());
    }

    log::info!("Sync completed successfully.");
}

/// Validates configuration, loads the feed and syncs every selected target
async fn run(args: &Args) -> Result<(), SyncError> {
    // Resolve configuration up front so a typo fails before any request
    let seller = if args.syncs_seller() {
        let limits = BatchLimits::SELLER
            .with_overrides(args.seller_stock_batch, args.seller_price_batch)?;
        Some((args.seller_config()?, limits))
    } else {
        None
    };
    let market = if args.syncs_market() {
        let limits = BatchLimits::MARKET
            .with_overrides(args.market_stock_batch, args.market_price_batch)?;
        Some((args.market_config()?, limits))
    } else {
        None
    };

    let client = http_client(Duration::from_secs(args.timeout_secs))?;
    let feed = load_feed(args, &client).await?;

    let mut first_error: Option<SyncError> = None;

    if let Some((config, limits)) = seller {
        let seller = SellerClient::new(client.clone(), &config).with_limits(limits);
        let name = seller.name().to_string();
        let result = SyncPipeline::new(seller).dry_run(args.dry_run).run(&feed).await;
        record(&mut first_error, report(&name, result.map(|s| vec![s])));
    }

    if let Some((config, limits)) = market {
        let result = sync_market_campaigns(&client, &config, limits, &feed, args.dry_run).await;
        record(&mut first_error, report("market", result));
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Zip archives are read as the vendor workbook, anything else as CSV
async fn load_feed(args: &Args, client: &Client) -> Result<Vec<FeedRecord>, SyncError> {
    let location = FeedLocation::parse(&args.feed);
    if location.is_archive() {
        let skip_rows = args.feed_skip_rows.unwrap_or(VENDOR_SHEET_SKIP_ROWS);
        ZipSheetFeed::new(location, skip_rows, client.clone()).fetch().await
    } else {
        let skip_rows = args.feed_skip_rows.unwrap_or(0);
        CsvFeed::new(location, skip_rows, client.clone()).fetch().await
    }
}

/// Logs the outcome of one target
fn report(name: &str, result: Result<Vec<SyncSummary>, SyncError>) -> Result<(), SyncError> {
    match result {
        Ok(summaries) => {
            for summary in summaries {
                log::info!(
                    "{}: {} offers, {} stock updates ({} non-empty), {} prices",
                    summary.marketplace,
                    summary.offers,
                    summary.stock.stocks.len(),
                    summary.stock.non_empty.len(),
                    summary.prices.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            log::error!("{}: {} ({})", name, e.category().describe(), e);
            Err(e)
        }
    }
}

fn record(first_error: &mut Option<SyncError>, result: Result<(), SyncError>) {
    if let Err(e) = result {
        first_error.get_or_insert(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_to_library_constant() {
        let args = Args::try_parse_from(["stock_sync", "--feed", "ostatki.zip"]).unwrap();
        assert_eq!(args.timeout_secs, DEFAULT_TIMEOUT.as_secs());
        assert_eq!(args.feed_skip_rows, None);
        assert_eq!(args.target, Target::All);
    }

    #[test]
    fn explicit_timeout_wins() {
        let args =
            Args::try_parse_from(["stock_sync", "--feed", "x.csv", "--timeout-secs", "5"]).unwrap();
        assert_eq!(args.timeout_secs, 5);
    }
}
