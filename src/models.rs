//! Shared data types for feed rows and marketplace updates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace-side catalog identifier, joined against `FeedRecord::code`
pub type OfferId = String;

/// One row of the vendor stock feed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedRecord {
    #[serde(rename = "Код", alias = "code")]
    pub code: String,
    #[serde(rename = "Количество", alias = "quantity", default)]
    pub quantity: String,
    #[serde(rename = "Цена", alias = "price", default)]
    pub price: String,
}

impl FeedRecord {
    pub fn new(code: &str, quantity: &str, price: &str) -> Self {
        Self {
            code: code.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
        }
    }
}

/// Stock level for one offer after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdate {
    pub offer_id: OfferId,
    pub quantity: u32,
    pub warehouse_id: Option<String>,
}

/// Price for one offer after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub offer_id: OfferId,
    pub amount: u64,
    pub currency: Currency,
}

/// Currency code as each platform spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Currency {
    /// ISO 4217 rouble, used by the seller platform
    #[serde(rename = "RUB")]
    Rub,
    /// Legacy rouble code, used by the marketplace platform
    #[serde(rename = "RUR")]
    Rur,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Rur => "RUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of a stock sync: every update pushed plus the non-zero subset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockReport {
    pub stocks: Vec<StockUpdate>,
    /// Reporting only
    pub non_empty: Vec<StockUpdate>,
}

impl StockReport {
    pub fn new(stocks: Vec<StockUpdate>) -> Self {
        let non_empty = stocks
            .iter()
            .filter(|stock| stock.quantity != 0)
            .cloned()
            .collect();
        Self { stocks, non_empty }
    }
}

/// Outcome of a full run against one marketplace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub marketplace: String,
    pub offers: usize,
    pub stock: StockReport,
    pub prices: Vec<PriceUpdate>,
}
