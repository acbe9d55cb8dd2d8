//! Marketplace API clients.
//!
//! Each client holds its credentials and base URL and exposes typed
//! list/update calls. The sync pipeline only sees the [`Marketplace`] trait.

mod market;
mod seller;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::BatchLimits;
use crate::error::{Result, SyncError};
use crate::models::{Currency, PriceUpdate, StockUpdate};
use crate::paginate::OfferListing;

pub use market::{MarketClient, MARKET_BASE_URL, MARKET_PAGE_LIMIT};
pub use seller::{SellerClient, SELLER_BASE_URL, SELLER_PAGE_LIMIT};

const USER_AGENT: &str = "stock_sync/1.0";

/// A marketplace target the sync pipeline can push to
#[async_trait]
pub trait Marketplace: OfferListing + Sync {
    /// Label used in logs and summaries
    fn name(&self) -> &str;

    /// Batch sizes accepted by the update endpoints
    fn limits(&self) -> BatchLimits;

    /// Currency prices are published in
    fn currency(&self) -> Currency;

    /// Warehouse stock updates are attributed to, if the platform has one
    fn warehouse_id(&self) -> Option<&str> {
        None
    }

    /// Pushes one batch of stock levels
    async fn update_stocks(&self, batch: &[StockUpdate]) -> Result<()>;

    /// Pushes one batch of prices
    async fn update_prices(&self, batch: &[PriceUpdate]) -> Result<()>;
}

/// Builds the HTTP client shared by all marketplace clients
pub fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Checks the status and decodes the JSON body of a response.
///
/// Non-2xx responses become `HttpStatus` carrying the body text; bodies that
/// are not the expected JSON become `Parse`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        log::error!("Request failed with status {status}: {body}");
        return Err(SyncError::HttpStatus { status, body });
    }

    log::debug!("Response ({status}): {body}");
    Ok(serde_json::from_str(&body)?)
}
