//! Sync pipeline: listing -> reconciliation -> batching -> updates.
//!
//! One pipeline type serves every marketplace; the differences (batch
//! sizes, currency, warehouse, payload shapes) live in the
//! [`Marketplace`] implementation. Batches go out strictly one after the
//! other and the first failure aborts the remaining ones.

use reqwest::Client;

use crate::batch::{batch_count, batches};
use crate::config::{BatchLimits, MarketConfig};
use crate::error::Result;
use crate::marketplace::{MarketClient, Marketplace};
use crate::models::{FeedRecord, OfferId, PriceUpdate, StockReport, SyncSummary};
use crate::paginate::collect_offer_ids;
use crate::reconcile::{build_prices, build_stocks};

/// Pushes feed data to a single marketplace
pub struct SyncPipeline<M> {
    marketplace: M,
    dry_run: bool,
}

impl<M: Marketplace> SyncPipeline<M> {
    pub fn new(marketplace: M) -> Self {
        Self {
            marketplace,
            dry_run: false,
        }
    }

    /// Build and log batches without calling the update endpoints
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn marketplace(&self) -> &M {
        &self.marketplace
    }

    /// Lists every offer currently known to the marketplace
    pub async fn fetch_offer_ids(&self) -> Result<Vec<OfferId>> {
        log::info!("{}: listing offers", self.marketplace.name());
        collect_offer_ids(&self.marketplace).await
    }

    /// Lists offers, then pushes reconciled stock levels
    pub async fn sync_stocks(&self, feed: &[FeedRecord]) -> Result<StockReport> {
        let offer_ids = self.fetch_offer_ids().await?;
        self.push_stocks(feed, &offer_ids).await
    }

    /// Lists offers, then pushes prices for offers present in the feed
    pub async fn sync_prices(&self, feed: &[FeedRecord]) -> Result<Vec<PriceUpdate>> {
        let offer_ids = self.fetch_offer_ids().await?;
        self.push_prices(feed, &offer_ids).await
    }

    /// Full run: one listing shared by the stock and price steps
    pub async fn run(&self, feed: &[FeedRecord]) -> Result<SyncSummary> {
        let offer_ids = self.fetch_offer_ids().await?;
        let stock = self.push_stocks(feed, &offer_ids).await?;
        let prices = self.push_prices(feed, &offer_ids).await?;

        log::info!(
            "{}: synced {} offers ({} in stock), {} prices",
            self.marketplace.name(),
            offer_ids.len(),
            stock.non_empty.len(),
            prices.len()
        );

        Ok(SyncSummary {
            marketplace: self.marketplace.name().to_string(),
            offers: offer_ids.len(),
            stock,
            prices,
        })
    }

    /// Reconciles `feed` against `offer_ids` and pushes the stock batches
    pub async fn push_stocks(
        &self,
        feed: &[FeedRecord],
        offer_ids: &[OfferId],
    ) -> Result<StockReport> {
        let name = self.marketplace.name();
        let limit = self.marketplace.limits().stocks;
        let stocks = build_stocks(feed, offer_ids, self.marketplace.warehouse_id())?;
        let total = batch_count(stocks.len(), limit);

        for (index, batch) in batches(&stocks, limit).enumerate() {
            if self.dry_run {
                log::info!(
                    "{}: [dry run] would push stock batch {}/{} ({} offers)",
                    name,
                    index + 1,
                    total,
                    batch.len()
                );
                continue;
            }
            self.marketplace.update_stocks(batch).await?;
            log::info!(
                "{}: pushed stock batch {}/{} ({} offers)",
                name,
                index + 1,
                total,
                batch.len()
            );
        }

        let report = StockReport::new(stocks);
        log::info!(
            "{}: {} stock updates, {} non-empty",
            name,
            report.stocks.len(),
            report.non_empty.len()
        );
        Ok(report)
    }

    /// Builds prices for known offers in `feed` and pushes the batches
    pub async fn push_prices(
        &self,
        feed: &[FeedRecord],
        offer_ids: &[OfferId],
    ) -> Result<Vec<PriceUpdate>> {
        let name = self.marketplace.name();
        let limit = self.marketplace.limits().prices;
        let prices = build_prices(feed, offer_ids, self.marketplace.currency())?;
        let total = batch_count(prices.len(), limit);

        for (index, batch) in batches(&prices, limit).enumerate() {
            if self.dry_run {
                log::info!(
                    "{}: [dry run] would push price batch {}/{} ({} offers)",
                    name,
                    index + 1,
                    total,
                    batch.len()
                );
                continue;
            }
            self.marketplace.update_prices(batch).await?;
            log::info!(
                "{}: pushed price batch {}/{} ({} offers)",
                name,
                index + 1,
                total,
                batch.len()
            );
        }

        Ok(prices)
    }
}

/// Syncs the marketplace campaigns in configuration order.
///
/// The first failing campaign stops the run, so later campaigns see no
/// requests at all.
pub async fn sync_market_campaigns(
    client: &Client,
    config: &MarketConfig,
    limits: BatchLimits,
    feed: &[FeedRecord],
    dry_run: bool,
) -> Result<Vec<SyncSummary>> {
    let mut summaries = Vec::with_capacity(config.campaigns.len());
    for campaign in &config.campaigns {
        let market = MarketClient::new(client.clone(), &config.token, campaign.clone())
            .with_base_url(&config.base_url)
            .with_limits(limits);
        let summary = SyncPipeline::new(market).dry_run(dry_run).run(feed).await?;
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
