//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the worker pool that coordinates all aspects of a
//! crawl run, including:
//! - Seeding the work queue
//! - Reserving fetch slots against the check cap
//! - Fetching, classifying and expanding pages
//! - Cancellation and the whole-run timeout
//! - Building the final report

use crate::config::CrawlJob;
use crate::crawler::fetcher::{BrokenReason, FetchOutcome, FetchedPage, HttpFetcher, PageFetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::{QueuedUrl, Scheduler};
use crate::output::{BrokenLinks, CrawlReport, CrawlStatus};
use crate::state::{VisitState, VisitedSet};
use crate::url::DomainFilter;
use crate::CrawlError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Progress is logged every this many fetches
const PROGRESS_INTERVAL: usize = 25;

/// Lifecycle of a crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started
    Pending,

    /// Workers are running
    Running,

    /// The run ended on its own
    Completed,

    /// The run was cancelled
    Cancelled,
}

/// Stop signals of one run
#[derive(Clone)]
struct RunSignals {
    /// Caller cancellation: in-flight fetches are abandoned
    cancel: CancellationToken,

    /// No new fetches are started; fired by caller cancellation or the job timeout
    stop: CancellationToken,
}

/// State shared by every worker of one run
struct CrawlContext {
    job: CrawlJob,
    fetcher: Arc<dyn PageFetcher>,
    filter: DomainFilter,
    visited: VisitedSet,
    scheduler: Scheduler,
    broken: BrokenLinks,
    checked: AtomicUsize,
}

impl CrawlContext {
    /// Reserves one fetch against the cap
    ///
    /// The compare-and-swap guarantees the number of reservations never
    /// exceeds `max_checked`, however many workers race here.
    fn reserve_fetch(&self) -> Option<usize> {
        self.checked
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                self.job.allows_another_fetch(n).then_some(n + 1)
            })
            .ok()
            .map(|previous| previous + 1)
    }

    fn cap_reached(&self) -> bool {
        !self.job.allows_another_fetch(self.checked.load(Ordering::SeqCst))
    }

    /// Processes one leased URL
    async fn process(&self, queued: &QueuedUrl, signals: &RunSignals) {
        let url = &queued.url;

        if signals.stop.is_cancelled() {
            tracing::debug!("Run is stopping, discarding {}", url);
            self.visited.mark_skipped(url);
            return;
        }

        let Some(count) = self.reserve_fetch() else {
            tracing::debug!("Check cap reached, discarding {}", url);
            self.visited.mark_skipped(url);
            return;
        };

        tracing::debug!("Checking [depth {}]: {}", queued.depth, url);

        let page = tokio::select! {
            _ = signals.cancel.cancelled() => {
                tracing::debug!("Fetch of {} abandoned by cancellation", url);
                return;
            }
            page = tokio::time::timeout(self.job.fetch_timeout, self.fetcher.fetch(url, self.job.fetch_timeout)) => {
                page.unwrap_or_else(|_| FetchedPage::broken(BrokenReason::Timeout))
            }
        };

        self.visited.mark_checked(url);

        match &page.outcome {
            FetchOutcome::Healthy { status } => {
                tracing::trace!("{} is healthy ({})", url, status);
            }
            FetchOutcome::Broken(reason) => {
                tracing::warn!("Broken link {}: {}", url, reason);
                self.broken.record(url.clone(), reason.clone());
            }
        }

        if count % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} checked, {} queued, {} broken",
                count,
                self.scheduler.pending_len(),
                self.broken.len()
            );
        }

        self.expand(queued, page, &signals.stop);
    }

    /// Queues the unclaimed in-scope links of a fetched page
    fn expand(&self, queued: &QueuedUrl, page: FetchedPage, stop: &CancellationToken) {
        let Some(body) = page.body else {
            return;
        };

        if !self.job.expands_depth(queued.depth) || self.cap_reached() || stop.is_cancelled() {
            return;
        }

        // Redirects may have moved us off the seed's host
        let base: Url = page.final_url.unwrap_or_else(|| queued.url.clone());
        if !self.filter.is_in_scope(&base) {
            tracing::debug!("Not expanding {}: redirected out of scope to {}", queued.url, base);
            return;
        }

        let mut queued_links = 0;
        for link in extract_links(&body, &base) {
            if !self.filter.is_in_scope(&link) {
                tracing::trace!("Out of scope: {}", link);
                continue;
            }

            if self.visited.try_claim(&link) {
                let next = QueuedUrl {
                    url: link,
                    depth: queued.depth + 1,
                };
                if !self.scheduler.push(next) {
                    break;
                }
                queued_links += 1;
            }
        }

        tracing::debug!("Queued {} new links from {}", queued_links, base);
    }
}

/// Worker loop: pull, process, repeat until the queue ends or the run stops
async fn worker_loop(ctx: Arc<CrawlContext>, worker_id: usize, signals: RunSignals) {
    tracing::trace!("Worker {} started", worker_id);

    loop {
        let lease = tokio::select! {
            biased;
            _ = signals.stop.cancelled() => None,
            lease = ctx.scheduler.next() => lease,
        };

        let Some(lease) = lease else {
            break;
        };

        ctx.process(lease.item(), &signals).await;
    }

    tracing::trace!("Worker {} finished", worker_id);
}

/// Main crawler structure
///
/// A crawler runs exactly one job. Its visited set stays readable after the
/// run for inspection.
pub struct Crawler {
    ctx: Arc<CrawlContext>,
    state: Mutex<RunState>,
}

impl Crawler {
    /// Creates a crawler for a job using the given fetcher
    pub fn new(job: CrawlJob, fetcher: Arc<dyn PageFetcher>) -> Self {
        let filter = DomainFilter::new(&job.seed, job.domain_restricted);

        let ctx = CrawlContext {
            job,
            fetcher,
            filter,
            visited: VisitedSet::new(),
            scheduler: Scheduler::new(Vec::new()),
            broken: BrokenLinks::new(),
            checked: AtomicUsize::new(0),
        };

        Self {
            ctx: Arc::new(ctx),
            state: Mutex::new(RunState::Pending),
        }
    }

    /// Creates a crawler that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlError::HttpClient)` - The HTTP client could not be built
    pub fn with_http(job: CrawlJob) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&job.user_agent)?;
        Ok(Self::new(job, Arc::new(fetcher)))
    }

    /// The job this crawler runs
    pub fn job(&self) -> &CrawlJob {
        &self.ctx.job
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// URLs claimed so far
    pub fn visited(&self) -> &VisitedSet {
        &self.ctx.visited
    }

    /// Number of fetches started so far
    pub fn checked(&self) -> usize {
        self.ctx.checked.load(Ordering::SeqCst)
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return false;
        }
        *state = to;
        true
    }

    /// Runs the crawl to completion
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        self.run_with_cancellation(CancellationToken::new()).await
    }

    /// Runs the crawl until it completes or `cancel` fires
    ///
    /// This method:
    /// 1. Validates the job and claims the seed
    /// 2. Spawns the worker pool
    /// 3. Arms the whole-run timeout, if any
    /// 4. Waits for every worker to finish
    /// 5. Builds the report (partial if cancelled)
    ///
    /// Cancelling `cancel` abandons in-flight fetches. The job timeout only
    /// stops new fetches from starting; fetches already running finish under
    /// their own timeout and are reported. The job timeout never cancels
    /// `cancel` itself, so one token can be shared by concurrent crawlers.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run executed; the report may be partial
    /// * `Err(CrawlError)` - The job was invalid or a worker died
    pub async fn run_with_cancellation(
        &self,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let job = &self.ctx.job;
        job.validate()?;

        if !self.transition(RunState::Pending, RunState::Running) {
            return Err(CrawlError::AlreadyStarted);
        }

        let start_time = Instant::now();
        tracing::info!(
            "Starting crawl of {} ({} workers, cap {:?}, depth {:?}, restricted: {})",
            job.seed,
            job.workers,
            job.max_checked,
            job.max_depth,
            job.domain_restricted
        );

        if self.ctx.visited.try_claim(&job.seed) {
            self.ctx.scheduler.push(QueuedUrl::seed(job.seed.clone()));
        }

        let cancel = cancel.child_token();
        let signals = RunSignals {
            stop: cancel.child_token(),
            cancel,
        };

        let deadline = job.job_timeout.map(|timeout| {
            let stop = signals.stop.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::warn!("Job timeout of {:?} reached, no new fetches will start", timeout);
                stop.cancel();
            })
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..job.workers {
            workers.spawn(worker_loop(
                Arc::clone(&self.ctx),
                worker_id,
                signals.clone(),
            ));
        }

        let mut failure = None;
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
                failure.get_or_insert(e);
            }
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        let cancelled = signals.stop.is_cancelled();
        if cancelled {
            self.ctx.scheduler.close();
        }

        let status = if cancelled {
            CrawlStatus::Cancelled
        } else {
            CrawlStatus::Completed
        };
        self.transition(
            RunState::Running,
            if cancelled {
                RunState::Cancelled
            } else {
                RunState::Completed
            },
        );

        if let Some(e) = failure {
            return Err(e.into());
        }

        let report = CrawlReport {
            seed: job.seed.to_string(),
            broken: self.ctx.broken.snapshot(),
            checked: self.checked(),
            discovered: self.ctx.visited.len(),
            skipped: self.ctx.visited.count_in_state(VisitState::Skipped),
            status,
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Crawl {}: {} URLs checked, {} broken, in {:?}",
            report.status,
            report.checked,
            report.broken.len(),
            report.elapsed
        );

        Ok(report)
    }
}

/// Runs a crawl job over HTTP
///
/// # Example
///
/// ```no_run
/// use link_sweep::config::CrawlJob;
/// use link_sweep::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let job = CrawlJob::new("https://example.com/")?.with_domain_restricted(true);
/// let report = run_crawl(job).await?;
/// for url in report.broken_urls() {
///     println!("{}", url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(job: CrawlJob) -> Result<CrawlReport, CrawlError> {
    Crawler::with_http(job)?.run().await
}

/// Runs a crawl job over HTTP until it completes or `cancel` fires
pub async fn run_crawl_with_cancellation(
    job: CrawlJob,
    cancel: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    Crawler::with_http(job)?.run_with_cancellation(cancel).await
}

/// Crawls from `seed` and returns the broken URLs
///
/// The seed is validated before any work starts. Individual fetch failures
/// never produce an error; they are the result.
pub async fn find_broken_links(
    seed: &str,
    max_checked: Option<usize>,
    domain_restricted: bool,
    workers: usize,
    fetch_timeout: std::time::Duration,
) -> Result<Vec<String>, CrawlError> {
    let job = CrawlJob::new(seed)?
        .with_max_checked(max_checked)
        .with_domain_restricted(domain_restricted)
        .with_workers(workers)
        .with_fetch_timeout(fetch_timeout);

    let report = run_crawl(job).await?;
    Ok(report.broken_urls())
}
