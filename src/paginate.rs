//! Exhaustive listing of marketplace offers across pages

use async_trait::async_trait;

use crate::error::{Result, SyncError};
use crate::models::OfferId;

/// Upper bound on pages fetched in one listing, far above any real catalog
pub const MAX_PAGES: usize = 10_000;

/// One page of a listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferPage {
    pub offer_ids: Vec<OfferId>,
    /// Continuation token for the next page; `None` or empty when exhausted
    pub next_cursor: Option<String>,
    /// Catalog size, for endpoints that signal the end by count
    pub total: Option<usize>,
}

/// A listing endpoint that can be walked with a continuation cursor
#[async_trait]
pub trait OfferListing {
    /// Fetches the page following `cursor` (`None` for the first page)
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<OfferPage>;
}

/// Walks `listing` from the first page until it is exhausted.
///
/// Pages reporting a `total` end once that many offers were collected;
/// otherwise the listing ends when no further cursor is returned. A page that
/// neither ends the listing nor contributes offers is treated as a protocol
/// violation instead of being retried forever.
pub async fn collect_offer_ids<L>(listing: &L) -> Result<Vec<OfferId>>
where
    L: OfferListing + Sync + ?Sized,
{
    let mut offer_ids: Vec<OfferId> = Vec::new();
    let mut cursor: Option<String> = None;

    for page_number in 1..=MAX_PAGES {
        let page = listing.fetch_page(cursor.as_deref()).await?;
        let received = page.offer_ids.len();
        offer_ids.extend(page.offer_ids);

        let next_cursor = page.next_cursor.filter(|c| !c.is_empty());

        log::debug!(
            "Page {}: {} offers (collected {}, total {:?})",
            page_number,
            received,
            offer_ids.len(),
            page.total
        );

        let finished = match page.total {
            Some(total) => offer_ids.len() >= total,
            None => next_cursor.is_none(),
        };
        if finished {
            log::info!(
                "Listed {} offers in {} page(s)",
                offer_ids.len(),
                page_number
            );
            return Ok(offer_ids);
        }

        let stalled = |reason: &str| SyncError::PaginationStalled {
            pages: page_number,
            collected: offer_ids.len(),
            reason: reason.to_string(),
        };
        if received == 0 {
            return Err(stalled("page returned no offers but listing is not exhausted"));
        }
        match next_cursor {
            Some(next) => cursor = Some(next),
            None => return Err(stalled("listing short of reported total but no cursor")),
        }
    }

    Err(SyncError::PaginationStalled {
        pages: MAX_PAGES,
        collected: offer_ids.len(),
        reason: "page limit reached".to_string(),
    })
}

#[cfg(test)]
#[path = "paginate_tests.rs"]
mod tests;
