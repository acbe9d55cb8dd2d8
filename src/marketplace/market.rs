//! Marketplace platform client, scoped to one campaign

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{read_json, Marketplace};
use crate::config::{BatchLimits, MarketCampaign};
use crate::error::{Result, SyncError};
use crate::models::{Currency, PriceUpdate, StockUpdate};
use crate::paginate::{OfferListing, OfferPage};

pub const MARKET_BASE_URL: &str = "https://api.partner.market.yandex.ru";
/// Offer mappings requested per listing page
pub const MARKET_PAGE_LIMIT: u32 = 200;

/// Stock type for goods available to ship
const STOCK_TYPE_FIT: &str = "FIT";

#[derive(Debug, Deserialize)]
struct OfferMappingResponse {
    result: OfferMappingResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferMappingResult {
    #[serde(default)]
    paging: Paging,
    #[serde(default)]
    offer_mapping_entries: Vec<OfferMappingEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paging {
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OfferMappingEntry {
    offer: MappedOffer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappedOffer {
    shop_sku: String,
}

#[derive(Debug, Serialize)]
struct StocksRequest<'a> {
    skus: Vec<SkuStock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkuStock<'a> {
    sku: &'a str,
    warehouse_id: &'a str,
    items: [StockItem<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockItem<'a> {
    count: u32,
    #[serde(rename = "type")]
    kind: &'static str,
    updated_at: &'a str,
}

#[derive(Debug, Serialize)]
struct PricesRequest<'a> {
    offers: Vec<OfferPrice<'a>>,
}

#[derive(Debug, Serialize)]
struct OfferPrice<'a> {
    id: &'a str,
    price: PriceValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceValue {
    value: u64,
    currency_id: Currency,
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    status: Option<String>,
}

/// Marketplace platform API client for a single campaign
pub struct MarketClient {
    client: Client,
    base_url: String,
    token: String,
    campaign: MarketCampaign,
    name: String,
    limits: BatchLimits,
}

impl MarketClient {
    pub fn new(client: Client, token: &str, campaign: MarketCampaign) -> Self {
        log::debug!(
            "Creating market client for campaign {} ({})",
            campaign.campaign_id,
            campaign.label
        );
        Self {
            client,
            base_url: MARKET_BASE_URL.to_string(),
            token: token.to_string(),
            name: format!("market/{}", campaign.label),
            campaign,
            limits: BatchLimits::MARKET,
        }
    }

    /// Points the client at another host (mock servers, sandboxes)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn campaign(&self) -> &MarketCampaign {
        &self.campaign
    }

    fn campaign_url(&self, endpoint: &str) -> String {
        format!(
            "{}/campaigns/{}/{}",
            self.base_url,
            urlencoding::encode(&self.campaign.campaign_id),
            endpoint
        )
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        let url = self.campaign_url(endpoint);
        log::debug!("{method} {url}");
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    /// A 2xx reply still fails the batch when its body status is not "OK"
    async fn expect_ok(&self, response: reqwest::Response, what: &str) -> Result<()> {
        let ack: Ack = read_json(response).await?;
        match ack.status {
            None => Ok(()),
            Some(status) if status == "OK" => Ok(()),
            Some(status) => {
                log::error!("{}: {} update answered with status {}", self.name, what, status);
                Err(SyncError::Rejected {
                    marketplace: self.name.clone(),
                    what: what.to_string(),
                    status,
                })
            }
        }
    }
}

#[async_trait]
impl OfferListing for MarketClient {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<OfferPage> {
        let limit = MARKET_PAGE_LIMIT.to_string();
        let response = self
            .request(reqwest::Method::GET, "offer-mapping-entries")
            .query(&[("page_token", cursor.unwrap_or_default()), ("limit", limit.as_str())])
            .send()
            .await?;
        let body: OfferMappingResponse = read_json(response).await?;

        Ok(OfferPage {
            offer_ids: body
                .result
                .offer_mapping_entries
                .into_iter()
                .map(|entry| entry.offer.shop_sku)
                .collect(),
            next_cursor: body.result.paging.next_page_token,
            total: None,
        })
    }
}

#[async_trait]
impl Marketplace for MarketClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> BatchLimits {
        self.limits
    }

    fn currency(&self) -> Currency {
        Currency::Rur
    }

    fn warehouse_id(&self) -> Option<&str> {
        Some(&self.campaign.warehouse_id)
    }

    async fn update_stocks(&self, batch: &[StockUpdate]) -> Result<()> {
        let updated_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let request = StocksRequest {
            skus: batch
                .iter()
                .map(|s| SkuStock {
                    sku: &s.offer_id,
                    warehouse_id: s
                        .warehouse_id
                        .as_deref()
                        .unwrap_or(&self.campaign.warehouse_id),
                    items: [StockItem {
                        count: s.quantity,
                        kind: STOCK_TYPE_FIT,
                        updated_at: &updated_at,
                    }],
                })
                .collect(),
        };
        let response = self
            .request(reqwest::Method::PUT, "offers/stocks")
            .json(&request)
            .send()
            .await?;
        self.expect_ok(response, "stock").await
    }

    async fn update_prices(&self, batch: &[PriceUpdate]) -> Result<()> {
        let request = PricesRequest {
            offers: batch
                .iter()
                .map(|p| OfferPrice {
                    id: &p.offer_id,
                    price: PriceValue {
                        value: p.amount,
                        currency_id: p.currency,
                    },
                })
                .collect(),
        };
        let response = self
            .request(reqwest::Method::POST, "offer-prices/updates")
            .json(&request)
            .send()
            .await?;
        self.expect_ok(response, "price").await
    }
}

#[cfg(test)]
#[path = "market_tests.rs"]
mod tests;
