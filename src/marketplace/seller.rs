//! Seller platform client (product list + import endpoints)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{read_json, Marketplace};
use crate::config::{BatchLimits, SellerConfig};
use crate::error::Result;
use crate::models::{Currency, PriceUpdate, StockUpdate};
use crate::paginate::{OfferListing, OfferPage};

pub const SELLER_BASE_URL: &str = "https://api-seller.ozon.ru";
/// Products requested per listing page
pub const SELLER_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Serialize)]
struct ProductListRequest<'a> {
    filter: ProductFilter,
    last_id: &'a str,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct ProductFilter {
    visibility: &'static str,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    result: ProductListResult,
}

#[derive(Debug, Deserialize)]
struct ProductListResult {
    #[serde(default)]
    items: Vec<ProductItem>,
    total: usize,
    #[serde(default)]
    last_id: String,
}

#[derive(Debug, Deserialize)]
struct ProductItem {
    offer_id: String,
}

#[derive(Debug, Serialize)]
struct StocksRequest<'a> {
    stocks: Vec<SellerStock<'a>>,
}

#[derive(Debug, Serialize)]
struct SellerStock<'a> {
    offer_id: &'a str,
    stock: u32,
}

#[derive(Debug, Serialize)]
struct PricesRequest<'a> {
    prices: Vec<SellerPrice<'a>>,
}

#[derive(Debug, Serialize)]
struct SellerPrice<'a> {
    auto_action_enabled: &'static str,
    currency_code: Currency,
    offer_id: &'a str,
    old_price: &'static str,
    price: String,
}

/// Per-offer outcome reported by the import endpoints
#[derive(Debug, Deserialize)]
struct ImportResponse {
    #[serde(default)]
    result: Vec<ImportResult>,
}

#[derive(Debug, Deserialize)]
struct ImportResult {
    offer_id: String,
    #[serde(default)]
    updated: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Seller platform API client
pub struct SellerClient {
    client: Client,
    base_url: String,
    client_id: String,
    api_key: String,
    limits: BatchLimits,
}

impl SellerClient {
    pub fn new(client: Client, config: &SellerConfig) -> Self {
        log::debug!("Creating seller client for client id {}", config.client_id);
        Self {
            client,
            base_url: SELLER_BASE_URL.to_string(),
            client_id: config.client_id.clone(),
            api_key: config.api_key.clone(),
            limits: BatchLimits::SELLER,
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

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {url}");
        self.client
            .post(url)
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
    }

    async fn list_products(&self, last_id: &str) -> Result<ProductListResult> {
        let request = ProductListRequest {
            filter: ProductFilter { visibility: "ALL" },
            last_id,
            limit: SELLER_PAGE_LIMIT,
        };
        let response = self.post("/v2/product/list").json(&request).send().await?;
        let body: ProductListResponse = read_json(response).await?;
        Ok(body.result)
    }

    fn report_rejected(&self, what: &str, response: ImportResponse) {
        for item in response.result.iter().filter(|r| !r.updated) {
            log::warn!(
                "Seller platform rejected {} for {}: {:?}",
                what,
                item.offer_id,
                item.errors
            );
        }
    }
}

#[async_trait]
impl OfferListing for SellerClient {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<OfferPage> {
        let result = self.list_products(cursor.unwrap_or_default()).await?;
        Ok(OfferPage {
            offer_ids: result.items.into_iter().map(|item| item.offer_id).collect(),
            next_cursor: Some(result.last_id),
            total: Some(result.total),
        })
    }
}

#[async_trait]
impl Marketplace for SellerClient {
    fn name(&self) -> &str {
        "seller"
    }

    fn limits(&self) -> BatchLimits {
        self.limits
    }

    fn currency(&self) -> Currency {
        Currency::Rub
    }

    async fn update_stocks(&self, batch: &[StockUpdate]) -> Result<()> {
        let request = StocksRequest {
            stocks: batch
                .iter()
                .map(|s| SellerStock {
                    offer_id: &s.offer_id,
                    stock: s.quantity,
                })
                .collect(),
        };
        let response = self
            .post("/v1/product/import/stocks")
            .json(&request)
            .send()
            .await?;
        let body: ImportResponse = read_json(response).await?;
        self.report_rejected("stock", body);
        Ok(())
    }

    async fn update_prices(&self, batch: &[PriceUpdate]) -> Result<()> {
        let request = PricesRequest {
            prices: batch
                .iter()
                .map(|p| SellerPrice {
                    auto_action_enabled: "UNKNOWN",
                    currency_code: p.currency,
                    offer_id: &p.offer_id,
                    old_price: "0",
                    price: p.amount.to_string(),
                })
                .collect(),
        };
        let response = self
            .post("/v1/product/import/prices")
            .json(&request)
            .send()
            .await?;
        let body: ImportResponse = read_json(response).await?;
        self.report_rejected("price", body);
        Ok(())
    }
}

#[cfg(test)]
#[path = "seller_tests.rs"]
mod tests;
