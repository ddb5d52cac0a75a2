//! Recursive crawler over a pluggable [`Fetcher`].
//!
//! The crawl proceeds one depth level at a time. Every URL of a level is fetched
//! concurrently, at most `max_concurrency` at once, and each URL is fetched at most once per
//! crawl. Because levels are visited in order, a URL is always expanded from the shallowest
//! path that reaches it, so deduplication never hides pages the depth bound would allow.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default number of fetches allowed in flight.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// A fetched page: its body and the links it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page body text.
    pub body: String,
    /// URLs linked from the page, in document order.
    pub links: Vec<String>,
}

/// Errors returned by a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No page exists at the URL.
    #[error("not found: {0}")]
    NotFound(String),
    /// The fetch panicked or was cancelled before returning.
    #[error("fetch failed for {url}: {reason}")]
    Failed {
        /// URL whose fetch did not complete.
        url: String,
        /// Task failure as reported by the runtime.
        reason: String,
    },
}

/// Source of pages for the crawler.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the page at `url`.
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

/// Fetcher answering from a fixed in-memory URL graph.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    pages: HashMap<String, Page>,
}

impl InMemoryFetcher {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the page at `url`.
    pub fn with_page(mut self, url: &str, body: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            Page {
                body: body.to_string(),
                links: links.iter().map(|link| link.to_string()).collect(),
            },
        );
        self
    }

    /// The four-page Go documentation graph used by the `crawl` demo.
    ///
    /// `https://golang.org/cmd/` is linked but absent, so crawls report one missing page.
    pub fn golang_sample() -> Self {
        Self::new()
            .with_page(
                "https://golang.org/",
                "The Go Programming Language",
                &["https://golang.org/pkg/", "https://golang.org/cmd/"],
            )
            .with_page(
                "https://golang.org/pkg/",
                "Packages",
                &[
                    "https://golang.org/",
                    "https://golang.org/cmd/",
                    "https://golang.org/pkg/fmt/",
                    "https://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "https://golang.org/pkg/fmt/",
                "Package fmt",
                &["https://golang.org/", "https://golang.org/pkg/"],
            )
            .with_page(
                "https://golang.org/pkg/os/",
                "Package os",
                &["https://golang.org/", "https://golang.org/pkg/"],
            )
    }
}

#[async_trait]
impl Fetcher for InMemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

/// A page retrieved during a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPage {
    /// URL the page was fetched from.
    pub url: String,
    /// Page body.
    pub body: String,
}

/// A URL the fetcher could not serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPage {
    /// URL that failed.
    pub url: String,
    /// Reason reported by the fetcher.
    pub error: FetchError,
}

/// Outcome of a crawl, in fetch-completion order within each level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages fetched successfully.
    pub found: Vec<FoundPage>,
    /// URLs that could not be fetched.
    pub missing: Vec<MissingPage>,
}

impl CrawlReport {
    /// Number of fetches attempted.
    pub fn visited(&self) -> usize {
        self.found.len() + self.missing.len()
    }
}

/// Depth-bounded crawler with a fixed fetch concurrency.
pub struct Crawler<F> {
    fetcher: Arc<F>,
    max_concurrency: usize,
}

impl<F: Fetcher + 'static> Crawler<F> {
    /// Create a crawler allowing up to `max_concurrency` fetches at once (at least one).
    pub fn new(fetcher: F, max_concurrency: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Crawl from `root`, following links up to `depth` levels.
    ///
    /// A depth of zero fetches nothing; a depth of one fetches only `root`.
    pub async fn crawl(&self, root: &str, depth: usize) -> CrawlReport {
        let mut report = CrawlReport::default();
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut visited = HashSet::from([root.to_string()]);
        let mut frontier = if depth > 0 {
            vec![root.to_string()]
        } else {
            Vec::new()
        };

        for level in 0..depth {
            if frontier.is_empty() {
                break;
            }
            tracing::debug!(level, urls = frontier.len(), "Crawling level");

            let pages = self.fetch_level(frontier, &permits).await;
            let expand = level + 1 < depth;
            let mut next = Vec::new();
            for (url, outcome) in pages {
                match outcome {
                    Ok(page) => {
                        if expand {
                            next.extend(
                                page.links
                                    .into_iter()
                                    .filter(|link| visited.insert(link.clone())),
                            );
                        }
                        report.found.push(FoundPage {
                            url,
                            body: page.body,
                        });
                    }
                    Err(error) => {
                        tracing::debug!(url = %url, error = %error, "Fetch failed");
                        report.missing.push(MissingPage { url, error });
                    }
                }
            }
            frontier = next;
        }

        tracing::info!(
            found = report.found.len(),
            missing = report.missing.len(),
            "Crawl finished"
        );
        report
    }

    async fn fetch_level(
        &self,
        urls: Vec<String>,
        permits: &Arc<Semaphore>,
    ) -> Vec<(String, Result<Page, FetchError>)> {
        let mut in_flight = JoinSet::new();
        for url in urls {
            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(permits);
            in_flight.spawn(async move {
                // The semaphore is never closed, so acquisition only waits.
                let _permit = permits.acquire_owned().await.ok();
                let target = url.clone();
                let fetch = tokio::spawn(async move { fetcher.fetch(&target).await });
                let outcome = fetch.await.unwrap_or_else(|err| {
                    Err(FetchError::Failed {
                        url: url.clone(),
                        reason: err.to_string(),
                    })
                });
                (url, outcome)
            });
        }

        let mut pages = Vec::new();
        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(page) => pages.push(page),
                // Fetch panics are caught inside the task; this only fires on runtime shutdown.
                Err(err) => tracing::error!(error = %err, "Crawl task failed"),
            }
        }
        pages
    }
}
