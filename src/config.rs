//! Typed configuration for marketplace clients

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::{Result, SyncError};
use crate::marketplace::MARKET_BASE_URL;

/// Default per-request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum entries per update call, dictated by each endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub stocks: NonZeroUsize,
    pub prices: NonZeroUsize,
}

impl BatchLimits {
    /// Seller platform: 100 stocks, 1000 prices per request
    pub const SELLER: BatchLimits = BatchLimits {
        stocks: nonzero(100),
        prices: nonzero(1000),
    };

    /// Marketplace platform: 2000 stocks, 500 prices per request
    pub const MARKET: BatchLimits = BatchLimits {
        stocks: nonzero(2000),
        prices: nonzero(500),
    };

    /// Replaces the limits that are given, keeping the rest
    pub fn with_overrides(self, stocks: Option<usize>, prices: Option<usize>) -> Result<Self> {
        Ok(Self {
            stocks: override_limit("stock batch size", self.stocks, stocks)?,
            prices: override_limit("price batch size", self.prices, prices)?,
        })
    }
}

const fn nonzero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("batch limit must be non-zero"),
    }
}

fn override_limit(
    what: &str,
    current: NonZeroUsize,
    value: Option<usize>,
) -> Result<NonZeroUsize> {
    match value {
        None => Ok(current),
        Some(n) => NonZeroUsize::new(n)
            .ok_or_else(|| SyncError::Config(format!("{what} must be greater than zero"))),
    }
}

/// Seller platform credentials
#[derive(Debug, Clone)]
pub struct SellerConfig {
    pub client_id: String,
    pub api_key: String,
}

/// One marketplace-platform campaign (storefront) and the warehouse it ships from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCampaign {
    /// Label used in logs, e.g. "FBS"
    pub label: String,
    pub campaign_id: String,
    pub warehouse_id: String,
}

impl MarketCampaign {
    /// Builds a campaign from optional settings.
    ///
    /// An unset campaign id means the campaign is not synced; a set campaign
    /// id without a warehouse is a configuration error.
    pub fn from_settings(
        label: &str,
        campaign_id: Option<String>,
        warehouse_id: Option<String>,
    ) -> Result<Option<Self>> {
        let Some(campaign_id) = campaign_id.filter(|id| !id.trim().is_empty()) else {
            return Ok(None);
        };
        let warehouse_id = require(&format!("WAREHOUSE_{label}_ID"), warehouse_id)?;
        Ok(Some(Self {
            label: label.to_string(),
            campaign_id,
            warehouse_id,
        }))
    }
}

/// Marketplace platform credentials and campaigns
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub token: String,
    pub campaigns: Vec<MarketCampaign>,
    pub base_url: String,
}

impl MarketConfig {
    pub fn new(token: String, campaigns: Vec<Option<MarketCampaign>>) -> Result<Self> {
        let campaigns: Vec<MarketCampaign> = campaigns.into_iter().flatten().collect();
        if campaigns.is_empty() {
            return Err(SyncError::Config(
                "no marketplace campaign configured (FBS_ID / DBS_ID)".to_string(),
            ));
        }
        Ok(Self {
            token,
            campaigns,
            base_url: MARKET_BASE_URL.to_string(),
        })
    }

    /// Points every campaign client at another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Returns the value or a configuration error naming the missing variable
pub fn require(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SyncError::Config(format!("{name} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        assert_eq!(BatchLimits::SELLER.stocks.get(), 100);
        assert_eq!(BatchLimits::SELLER.prices.get(), 1000);
        assert_eq!(BatchLimits::MARKET.stocks.get(), 2000);
        assert_eq!(BatchLimits::MARKET.prices.get(), 500);
    }

    #[test]
    fn overrides_replace_only_given_limits() {
        let limits = BatchLimits::SELLER.with_overrides(None, Some(900)).unwrap();
        assert_eq!(limits.stocks.get(), 100);
        assert_eq!(limits.prices.get(), 900);
    }

    #[test]
    fn zero_override_is_rejected() {
        let err = BatchLimits::MARKET.with_overrides(Some(0), None).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn campaign_from_settings() {
        let campaign =
            MarketCampaign::from_settings("FBS", Some("1001".to_string()), Some("55".to_string()))
                .unwrap()
                .unwrap();
        assert_eq!(campaign.label, "FBS");
        assert_eq!(campaign.campaign_id, "1001");
        assert_eq!(campaign.warehouse_id, "55");
    }

    #[test]
    fn unset_campaign_is_skipped() {
        assert!(MarketCampaign::from_settings("DBS", None, Some("55".to_string()))
            .unwrap()
            .is_none());
    }

    #[test]
    fn campaign_without_warehouse_is_rejected() {
        let err = MarketCampaign::from_settings("DBS", Some("2002".to_string()), None).unwrap_err();
        assert!(err.to_string().contains("WAREHOUSE_DBS_ID"));
    }

    #[test]
    fn market_config_needs_a_campaign() {
        assert!(MarketConfig::new("t".to_string(), vec![None, None]).is_err());
        let campaign = MarketCampaign {
            label: "FBS".to_string(),
            campaign_id: "1".to_string(),
            warehouse_id: "2".to_string(),
        };
        let config = MarketConfig::new("t".to_string(), vec![Some(campaign), None]).unwrap();
        assert_eq!(config.campaigns.len(), 1);
        assert_eq!(config.base_url, MARKET_BASE_URL);
    }

    #[test]
    fn require_rejects_missing_and_blank() {
        assert_eq!(require("X", Some("v".to_string())).unwrap(), "v");
        assert!(require("SELLER_TOKEN", None)
            .unwrap_err()
            .to_string()
            .contains("SELLER_TOKEN"));
        assert!(require("X", Some("  ".to_string())).is_err());
    }
}
