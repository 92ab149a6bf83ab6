//! Concurrent paginated fetcher
//!
//! Pulls every page of a [`PagedSource`] into one collection:
//!
//! 1. Page 1 is fetched first to learn the page count
//! 2. A bounded pool of workers claims the remaining pages from a shared
//!    atomic counter, so each page index is fetched by exactly one worker
//! 3. Every page fetch goes through [`with_retry`]
//! 4. Results are either concatenated in completion order (default) or
//!    reassembled in page order (`keep_order`)
//!
//! The first page that still fails after its retries fails the whole run;
//! the remaining workers are aborted and their partial work discarded.

use crate::error::{AppError, Result};
use crate::models::{CoinPerformance, FetchConfig, Page};
use crate::services::retry::with_retry;
use crate::services::PagedSource;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Items fetched by one worker, tagged with their page number
type WorkerBatch = Vec<(u32, Vec<CoinPerformance>)>;

/// Fetch a single page through the retry wrapper
async fn fetch_page<S: PagedSource + ?Sized>(source: &S, page: u32, config: &FetchConfig) -> Result<Page> {
    let size = config.page_size;
    with_retry(|| source.get_page(page, size), config.max_retries, config.base_delay).await
}

/// Claim pages until the counter passes `total_pages`
async fn run_worker<S: PagedSource + ?Sized>(
    worker_id: usize,
    source: Arc<S>,
    next_page: Arc<AtomicU32>,
    total_pages: u32,
    config: FetchConfig,
) -> Result<WorkerBatch> {
    let mut batch = WorkerBatch::new();

    loop {
        let page = next_page.fetch_add(1, Ordering::Relaxed);
        if page > total_pages {
            break;
        }

        let fetched = fetch_page(source.as_ref(), page, &config).await?;
        debug!(worker_id, page, items = fetched.items.len(), "Page fetched");
        batch.push((page, fetched.items));

        if !config.throttle.is_zero() {
            sleep(config.throttle).await;
        }
    }

    debug!(worker_id, pages = batch.len(), "Worker finished");
    Ok(batch)
}

/// Reject first pages whose `pages` does not follow from `total` and `size`
///
/// The page count sizes the claim range and the ordered buckets, so it must
/// not be taken from a remote source unchecked.
fn check_page_count(first: &Page) -> Result<()> {
    if first.size == 0 {
        return Err(AppError::Parse("First page reports size 0".to_string()));
    }
    let expected = first.total.div_ceil(first.size as usize).max(1);
    if first.pages as usize != expected {
        return Err(AppError::Parse(format!(
            "First page reports {} pages, but total {} at size {} gives {}",
            first.pages, first.total, first.size, expected
        )));
    }
    Ok(())
}

/// Accumulates worker output in either completion or page order
enum PageCollector {
    Unordered(Vec<CoinPerformance>),
    Ordered(Vec<Vec<CoinPerformance>>),
}

impl PageCollector {
    fn new(keep_order: bool, total_pages: u32, first_page: Vec<CoinPerformance>) -> Self {
        if keep_order {
            let mut buckets = vec![Vec::new(); total_pages.max(1) as usize];
            buckets[0] = first_page;
            PageCollector::Ordered(buckets)
        } else {
            PageCollector::Unordered(first_page)
        }
    }

    fn absorb(&mut self, batch: WorkerBatch) {
        match self {
            PageCollector::Unordered(records) => {
                for (_, items) in batch {
                    records.extend(items);
                }
            }
            PageCollector::Ordered(buckets) => {
                for (page, items) in batch {
                    // Workers only claim pages in [2, total_pages]
                    if let Some(bucket) = buckets.get_mut(page as usize - 1) {
                        *bucket = items;
                    }
                }
            }
        }
    }

    fn finish(self) -> Vec<CoinPerformance> {
        match self {
            PageCollector::Unordered(records) => records,
            PageCollector::Ordered(buckets) => buckets.into_iter().flatten().collect(),
        }
    }
}

/// Fetches complete datasets from a paged source
pub struct PageFetcher<S: ?Sized> {
    source: Arc<S>,
}

impl<S: PagedSource + 'static> PageFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl<S: PagedSource + ?Sized + 'static> PageFetcher<S> {
    /// Share an already-wrapped source (e.g. with an HTTP handler)
    pub fn from_shared(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Fetch every page and return the combined records
    #[instrument(skip(self, config), fields(page_size = config.page_size, concurrency = config.concurrency, keep_order = config.keep_order))]
    pub async fn fetch_all(&self, config: &FetchConfig) -> Result<Vec<CoinPerformance>> {
        config.validate()?;
        let started = Instant::now();

        let first = fetch_page(self.source.as_ref(), 1, config).await?;
        check_page_count(&first)?;
        let total_pages = first.pages;
        let reported_total = first.total;
        let worker_count = config.worker_count(total_pages);

        debug!(total_pages, reported_total, worker_count, "First page fetched");

        let next_page = Arc::new(AtomicU32::new(2));
        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&self.source),
                Arc::clone(&next_page),
                total_pages,
                config.clone(),
            ));
        }

        let mut collector = PageCollector::new(config.keep_order, total_pages, first.items);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(batch)) => collector.absorb(batch),
                Ok(Err(e)) => {
                    workers.abort_all();
                    error!(error = %e, "Page fetch failed after retries, aborting remaining workers");
                    return Err(e);
                }
                Err(join_err) => {
                    workers.abort_all();
                    error!(error = %join_err, "Fetch worker crashed, aborting remaining workers");
                    return Err(join_err.into());
                }
            }
        }

        let records = collector.finish();

        if records.len() != reported_total {
            warn!(
                fetched = records.len(),
                reported_total,
                "Fetched record count differs from source total"
            );
        }

        info!(
            records = records.len(),
            pages = total_pages,
            workers = worker_count,
            duration_ms = started.elapsed().as_millis() as u64,
            "Fetched all pages"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::SimulatedSource;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Wraps the simulated source, counting calls and injecting failures/delays
    struct ScriptedSource {
        inner: SimulatedSource,
        calls: Mutex<HashMap<u32, u32>>,
        /// page -> number of leading failures (u32::MAX = always fail)
        failures: HashMap<u32, u32>,
        delay: Duration,
        random_delay_ms: u64,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(total: usize) -> Self {
            Self {
                inner: SimulatedSource::new(total).without_latency(),
                calls: Mutex::new(HashMap::new()),
                failures: HashMap::new(),
                delay: Duration::ZERO,
                random_delay_ms: 0,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn failing(mut self, page: u32, times: u32) -> Self {
            self.failures.insert(page, times);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn with_random_delay(mut self, max_ms: u64) -> Self {
            self.random_delay_ms = max_ms;
            self
        }

        fn calls_for(&self, page: u32) -> u32 {
            self.calls.lock().unwrap().get(&page).copied().unwrap_or(0)
        }

        fn call_counts(&self) -> HashMap<u32, u32> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PagedSource for ScriptedSource {
        async fn get_page(&self, page: u32, size: u32) -> Result<Page> {
            let attempt = {
                let mut calls = self.calls.lock().unwrap();
                let entry = calls.entry(page).or_insert(0);
                *entry += 1;
                *entry
            };

            // Injected failures are immediate
            if let Some(&times) = self.failures.get(&page) {
                if attempt <= times {
                    return Err(AppError::PageFetch {
                        page,
                        message: format!("injected failure #{}", attempt),
                    });
                }
            }

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let mut delay = self.delay;
            if self.random_delay_ms > 0 {
                delay += Duration::from_millis(rand::random::<u64>() % self.random_delay_ms);
            }
            if !delay.is_zero() {
                sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.inner.get_page(page, size).await
        }
    }

    fn names(records: &[CoinPerformance]) -> Vec<String> {
        records.iter().map(|r| r.cryptocurrency.clone()).collect()
    }

    fn fast_retries(config: FetchConfig) -> FetchConfig {
        config.with_retries(2, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_fetch_all_is_complete() {
        let source = SimulatedSource::default().without_latency();
        let expected: HashSet<String> = names(source.dataset()).into_iter().collect();
        let fetcher = PageFetcher::new(source);

        let records = fetcher.fetch_all(&FetchConfig::default()).await.unwrap();

        assert_eq!(records.len(), 5000);
        let fetched: HashSet<String> = names(&records).into_iter().collect();
        assert_eq!(fetched.len(), 5000, "duplicate names in combined collection");
        assert_eq!(fetched, expected);
    }

    #[tokio::test]
    async fn test_keep_order_matches_source_order() {
        let source = SimulatedSource::default().without_latency();
        let expected = source.dataset().to_vec();
        let fetcher = PageFetcher::new(source);

        let config = FetchConfig::default().with_keep_order(true);
        let records = fetcher.fetch_all(&config).await.unwrap();

        assert_eq!(records, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_order_deterministic_under_random_delays() {
        let config = FetchConfig::default()
            .with_page_size(50)
            .with_concurrency(6)
            .with_keep_order(true);

        let first_run = PageFetcher::new(ScriptedSource::new(1000).with_random_delay(40))
            .fetch_all(&config)
            .await
            .unwrap();
        let second_run = PageFetcher::new(ScriptedSource::new(1000).with_random_delay(40))
            .fetch_all(&config)
            .await
            .unwrap();

        assert_eq!(first_run, second_run);
        assert_eq!(first_run, SimulatedSource::new(1000).dataset().to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unordered_is_permutation() {
        let config = FetchConfig::default().with_page_size(50).with_concurrency(6);
        let records = PageFetcher::new(ScriptedSource::new(1000).with_random_delay(40))
            .fetch_all(&config)
            .await
            .unwrap();

        let mut fetched = names(&records);
        let mut expected = names(SimulatedSource::new(1000).dataset());
        fetched.sort();
        expected.sort();
        assert_eq!(fetched, expected);

        // Page 1 is harvested before any worker runs
        assert_eq!(records[0].cryptocurrency, "Coin_1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_page_claimed_exactly_once() {
        let fetcher = PageFetcher::new(ScriptedSource::new(2000).with_random_delay(20));
        let config = FetchConfig::default().with_page_size(100).with_concurrency(8);

        fetcher.fetch_all(&config).await.unwrap();

        let counts = fetcher.source().call_counts();
        assert_eq!(counts.len(), 20);
        for page in 1..=20u32 {
            assert_eq!(counts.get(&page), Some(&1), "page {} requested {:?} times", page, counts.get(&page));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_bounded_by_concurrency() {
        let fetcher = PageFetcher::new(ScriptedSource::new(5000).with_delay(Duration::from_millis(10)));
        let config = FetchConfig::default().with_concurrency(3);

        fetcher.fetch_all(&config).await.unwrap();

        assert_eq!(fetcher.source().max_in_flight.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_workers_never_exceed_remaining_pages() {
        // 3 pages -> 2 workers even with a budget of 8
        let fetcher = PageFetcher::new(ScriptedSource::new(250).with_delay(Duration::from_millis(10)));
        let records = fetcher.fetch_all(&FetchConfig::default()).await.unwrap();

        assert_eq!(records.len(), 250);
        assert_eq!(fetcher.source().max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let source = ScriptedSource::new(1000).failing(1, 1).failing(4, 2).failing(9, 1);
        let fetcher = PageFetcher::new(source);
        let config = fast_retries(FetchConfig::default().with_keep_order(true));

        let records = fetcher.fetch_all(&config).await.unwrap();

        assert_eq!(records, SimulatedSource::new(1000).dataset().to_vec());
        assert_eq!(fetcher.source().calls_for(1), 2);
        assert_eq!(fetcher.source().calls_for(4), 3);
        assert_eq!(fetcher.source().calls_for(9), 2);
        assert_eq!(fetcher.source().calls_for(5), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_failure_fails_whole_fetch() {
        let fetcher = PageFetcher::new(ScriptedSource::new(1000).failing(7, u32::MAX));
        let config = fast_retries(FetchConfig::default());

        let result = fetcher.fetch_all(&config).await;

        match result {
            Err(AppError::PageFetch { page, message }) => {
                assert_eq!(page, 7);
                assert_eq!(message, "injected failure #3");
            }
            other => panic!("expected page 7 failure, got {:?}", other.map(|r| r.len())),
        }
        assert_eq!(fetcher.source().calls_for(7), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_page_failure_spawns_no_workers() {
        let fetcher = PageFetcher::new(ScriptedSource::new(1000).failing(1, u32::MAX));
        let config = fast_retries(FetchConfig::default());

        let result = fetcher.fetch_all(&config).await;

        assert!(matches!(result, Err(AppError::PageFetch { page: 1, .. })));
        assert_eq!(fetcher.source().call_counts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_aborts_sibling_workers() {
        // Every page takes 10s; page 2 fails instantly
        let fetcher = PageFetcher::new(
            ScriptedSource::new(1000)
                .with_delay(Duration::from_secs(10))
                .failing(2, u32::MAX),
        );
        let config = FetchConfig::default()
            .with_concurrency(2)
            .with_retries(0, Duration::from_millis(1));

        let start = tokio::time::Instant::now();
        let result = fetcher.fetch_all(&config).await;

        assert!(matches!(result, Err(AppError::PageFetch { page: 2, .. })));
        // Only page 1 (10s) completes; the sibling stuck on page 3 is aborted
        assert!(start.elapsed() < Duration::from_secs(15), "elapsed {:?}", start.elapsed());
        assert_eq!(fetcher.source().calls_for(4), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_is_per_worker() {
        let fetcher = PageFetcher::new(ScriptedSource::new(400));
        let config = FetchConfig::default()
            .with_concurrency(1)
            .with_throttle(Duration::from_millis(100));

        let start = tokio::time::Instant::now();
        let records = fetcher.fetch_all(&config).await.unwrap();

        assert_eq!(records.len(), 400);
        // One worker, pages 2..=4, each followed by a 100ms pause
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(400), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_single_page_dataset() {
        let fetcher = PageFetcher::new(ScriptedSource::new(40));
        let records = fetcher.fetch_all(&FetchConfig::default().with_keep_order(true)).await.unwrap();

        assert_eq!(records.len(), 40);
        assert_eq!(fetcher.source().call_counts().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_dataset() {
        let fetcher = PageFetcher::new(ScriptedSource::new(0));
        let records = fetcher.fetch_all(&FetchConfig::default()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_issues_no_requests() {
        let fetcher = PageFetcher::new(ScriptedSource::new(100));
        let result = fetcher.fetch_all(&FetchConfig::default().with_concurrency(0)).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert!(fetcher.source().call_counts().is_empty());
    }

    /// Serves real pages but overrides the reported page count
    struct MiscountedSource {
        inner: SimulatedSource,
        pages: u32,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PagedSource for MiscountedSource {
        async fn get_page(&self, page: u32, size: u32) -> Result<Page> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut built = self.inner.get_page(page, size).await?;
            built.pages = self.pages;
            Ok(built)
        }
    }

    #[tokio::test]
    async fn test_inconsistent_page_count_rejected() {
        for pages in [u32::MAX, 0, 3] {
            let fetcher = PageFetcher::new(MiscountedSource {
                inner: SimulatedSource::new(500).without_latency(),
                pages,
                calls: AtomicUsize::new(0),
            });

            let config = FetchConfig::default().with_keep_order(true).with_retries(0, Duration::ZERO);
            let result = fetcher.fetch_all(&config).await;

            assert!(matches!(result, Err(AppError::Parse(_))), "pages = {}", pages);
            // Nothing beyond page 1 is requested
            assert_eq!(fetcher.source().calls.load(Ordering::SeqCst), 1);
        }
    }
}
