//! Joins feed rows against the offers a marketplace already lists.
//!
//! Stocks cover every known offer: offers missing from the feed are zeroed so
//! delisted vendor products do not stay purchasable. Prices cover only offers
//! present in the feed.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Currency, FeedRecord, OfferId, PriceUpdate, StockUpdate};
use crate::normalize::{normalize_quantity, parse_price_amount};

/// Builds one stock update per known offer.
///
/// Offers found in the feed come first, in feed order, with their normalized
/// quantity (first matching row wins). Known offers absent from the feed
/// follow in listing order with quantity 0.
pub fn build_stocks(
    feed: &[FeedRecord],
    known_offer_ids: &[OfferId],
    warehouse_id: Option<&str>,
) -> Result<Vec<StockUpdate>> {
    let known = unique_ids(known_offer_ids);
    let warehouse_id = warehouse_id.map(str::to_string);

    let mut matched: HashSet<&str> = HashSet::with_capacity(known.len());
    let mut stocks = Vec::with_capacity(known.len());

    for record in feed {
        let code = record.code.as_str();
        if !known.contains(code) || !matched.insert(code) {
            continue;
        }
        stocks.push(StockUpdate {
            offer_id: record.code.clone(),
            quantity: normalize_quantity(code, &record.quantity)?,
            warehouse_id: warehouse_id.clone(),
        });
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(known.len());
    let unmatched: Vec<&OfferId> = known_offer_ids
        .iter()
        .filter(|&id| !matched.contains(id.as_str()) && seen.insert(id.as_str()))
        .collect();

    log::debug!(
        "Reconciled {} offers: {} from feed, {} zeroed",
        known.len(),
        matched.len(),
        unmatched.len()
    );

    stocks.extend(unmatched.into_iter().map(|id| StockUpdate {
        offer_id: id.clone(),
        quantity: 0,
        warehouse_id: warehouse_id.clone(),
    }));

    Ok(stocks)
}

/// Builds price updates for feed rows whose code is a known offer.
///
/// Known offers missing from the feed get no entry. Duplicate feed rows for
/// the same offer are ignored after the first.
pub fn build_prices(
    feed: &[FeedRecord],
    known_offer_ids: &[OfferId],
    currency: Currency,
) -> Result<Vec<PriceUpdate>> {
    let known = unique_ids(known_offer_ids);
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut prices = Vec::new();

    for record in feed {
        let code = record.code.as_str();
        if !known.contains(code) || !emitted.insert(code) {
            continue;
        }
        prices.push(PriceUpdate {
            offer_id: record.code.clone(),
            amount: parse_price_amount(&record.price)?,
            currency,
        });
    }

    log::debug!("Built {} prices for {} known offers", prices.len(), known.len());
    Ok(prices)
}

fn unique_ids(ids: &[OfferId]) -> HashSet<&str> {
    ids.iter().map(String::as_str).collect()
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
