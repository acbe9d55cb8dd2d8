//! Stock Sync - vendor feed to marketplace stock & price sync
//!
//! Reads the vendor stock feed, reconciles it against the offers each
//! marketplace lists and pushes stock levels and prices in batches.

pub mod batch;
pub mod config;
pub mod error;
pub mod feed;
pub mod marketplace;
pub mod models;
pub mod normalize;
pub mod paginate;
pub mod pipeline;
pub mod reconcile;

pub use config::{BatchLimits, MarketCampaign, MarketConfig, SellerConfig};
pub use error::{ErrorCategory, Result, SyncError};
pub use feed::{CsvFeed, FeedLocation, FeedSource, ZipSheetFeed};
pub use marketplace::{http_client, MarketClient, Marketplace, SellerClient};
pub use models::{
    Currency, FeedRecord, OfferId, PriceUpdate, StockReport, StockUpdate, SyncSummary,
};
pub use pipeline::{sync_market_campaigns, SyncPipeline};
