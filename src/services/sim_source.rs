//! Simulated paged source
//!
//! Deterministic in-memory dataset of coin performance records, served in
//! pages with a small artificial latency. Record `i` always has the same
//! values, so runs are reproducible.

use crate::constants::sim::{
    BASE_LATENCY_MS, LATENCY_STEP_MS, MAX_PAGE_SIZE, PAGE_ROUTE, TOTAL_RECORDS,
};
use crate::error::Result;
use crate::models::{CoinPerformance, Page, PageLinks};
use crate::services::PagedSource;
use crate::utils::round2;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Linear congruential value in `[0, 1)` for 1-based record index `i`
fn prng(i: u64) -> f64 {
    ((i * 9301 + 49297) % 233280) as f64 / 233280.0
}

/// Build the record at 1-based index `i`
pub fn generate_record(i: u64) -> CoinPerformance {
    let swing = prng(i) * 2.0 - 1.0;
    CoinPerformance {
        cryptocurrency: format!("Coin_{}", i),
        perf_24h: round2(swing * 20.0),
        perf_7d: round2(swing * 40.0),
        perf_30d: round2(swing * 100.0),
        perf_90d: round2(swing * 200.0),
    }
}

fn page_link(page: u32, size: u32) -> String {
    format!("{}?page={}&size={}", PAGE_ROUTE, page, size)
}

/// In-memory paged source with deterministic content
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    dataset: Arc<Vec<CoinPerformance>>,
    simulate_latency: bool,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new(TOTAL_RECORDS)
    }
}

impl SimulatedSource {
    /// Create a source over `total` generated records (built once)
    pub fn new(total: usize) -> Self {
        let dataset: Vec<CoinPerformance> = (1..=total as u64).map(generate_record).collect();
        Self::from_records(dataset)
    }

    /// Serve an explicit set of records
    pub fn from_records(records: Vec<CoinPerformance>) -> Self {
        Self {
            dataset: Arc::new(records),
            simulate_latency: true,
        }
    }

    /// Disable the per-page artificial latency
    pub fn without_latency(mut self) -> Self {
        self.simulate_latency = false;
        self
    }

    /// Full backing dataset in source order
    pub fn dataset(&self) -> &[CoinPerformance] {
        &self.dataset
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Latency applied to a served page: `30 + (page % 5) * 10` ms
    pub fn latency_for(page: u32) -> Duration {
        Duration::from_millis(BASE_LATENCY_MS + (page % 5) as u64 * LATENCY_STEP_MS)
    }

    /// Slice a page synchronously
    ///
    /// `size` is clamped to `[1, MAX_PAGE_SIZE]` and `page` to `[1, pages]`.
    pub fn build_page(&self, page: u32, size: u32) -> Page {
        let safe_size = size.clamp(1, MAX_PAGE_SIZE);
        let total = self.dataset.len();
        let pages = (total.div_ceil(safe_size as usize)).max(1) as u32;
        let safe_page = page.clamp(1, pages);

        let start = ((safe_page - 1) as usize * safe_size as usize).min(total);
        let end = (start + safe_size as usize).min(total);
        let items = self.dataset[start..end].to_vec();

        let links = PageLinks {
            first: Some(page_link(1, safe_size)),
            last: Some(page_link(pages, safe_size)),
            self_link: Some(page_link(safe_page, safe_size)),
            next: (safe_page < pages).then(|| page_link(safe_page + 1, safe_size)),
            prev: (safe_page > 1).then(|| page_link(safe_page - 1, safe_size)),
        };

        Page {
            items,
            total,
            page: safe_page,
            size: safe_size,
            pages,
            links,
        }
    }
}

#[async_trait]
impl PagedSource for SimulatedSource {
    async fn get_page(&self, page: u32, size: u32) -> Result<Page> {
        let built = self.build_page(page, size);
        if self.simulate_latency {
            sleep(Self::latency_for(built.page)).await;
        }
        debug!(page = built.page, items = built.items.len(), "Served simulated page");
        Ok(built)
    }
}
