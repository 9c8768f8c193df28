//! Discovering where a page's icons are.
//!
//! A scan starts with the page itself. Scanning a page may turn up other documents describing
//! icons (a web app manifest, a `browserconfig.xml`), which are scanned in turn, breadth first.
//! The well-known `/favicon.ico` is always suggested last.

mod manifest;
mod page;
mod tile_config;

use crate::address;
use crate::size::Dimension;
use crate::source::ResourceSource;
use futures::{Stream, StreamExt};
use std::collections::{HashSet, VecDeque};
use tokio_util::sync::CancellationToken;
use url::Url;

pub use manifest::parse_manifest;
pub use page::parse_page;
pub use tile_config::parse_tile_config;

/// The most scan tasks a single scan executes, however many get suggested.
pub const DEFAULT_MAX_SCANS: usize = 4;

/// A possible icon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Absolute address of the icon.
    pub location: Url,
    /// The size the referring document says the icon has, or a guess.
    pub expected_size: Dimension,
}

/// One document to scan for icon references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScanTask {
    /// An html page: `<link rel=icon>` tags, plus suggestions for the documents below.
    Page(Url),
    /// A web app manifest (json) with an `icons` list.
    Manifest(Url),
    /// A `browserconfig.xml` declaring tile images.
    TileConfig(Url),
    /// `/favicon.ico` on the host of the given address. Needs no downloading.
    Fallback(Url),
}

/// What a single scan task found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanOutput {
    pub results: Vec<Candidate>,
    pub suggestions: Vec<ScanTask>,
}

impl ScanTask {
    pub fn target(&self) -> &Url {
        match self {
            ScanTask::Page(target)
            | ScanTask::Manifest(target)
            | ScanTask::TileConfig(target)
            | ScanTask::Fallback(target) => target,
        }
    }

    pub async fn execute<S>(&self, source: &S, cancel: &CancellationToken) -> ScanOutput
    where
        S: ResourceSource + ?Sized,
    {
        #[cfg(feature = "log")]
        log::debug!("scanning {self:?}");

        let output = match self {
            ScanTask::Page(target) => {
                let mut output = match source.fetch_text(target, cancel).await {
                    Some(text) => parse_page(target, &text),
                    None => ScanOutput::default(),
                };
                // the old standard, as the lowest priority.
                output.suggestions.push(ScanTask::Fallback(target.clone()));
                output
            }
            ScanTask::Manifest(target) => ScanOutput {
                results: match source.fetch_text(target, cancel).await {
                    Some(text) => parse_manifest(target, &text),
                    None => vec![],
                },
                suggestions: vec![],
            },
            ScanTask::TileConfig(target) => ScanOutput {
                results: match source.fetch_text(target, cancel).await {
                    Some(text) => parse_tile_config(target, &text),
                    None => vec![],
                },
                suggestions: vec![],
            },
            ScanTask::Fallback(target) => ScanOutput {
                results: address::resolve(target, "/favicon.ico")
                    .map(|location| Candidate {
                        location,
                        expected_size: Dimension::square(16),
                    })
                    .into_iter()
                    .collect(),
                suggestions: vec![],
            },
        };

        #[cfg(feature = "log")]
        log::debug!(
            "{} found {} candidates and suggested {} scans",
            self.target(),
            output.results.len(),
            output.suggestions.len()
        );

        output
    }
}

/// Scans web pages for references to icons.
///
/// # Example
///
/// ```
/// use favicon::{Candidate, Dimension, IconImage, ResourceSource, Scanner};
/// use favicon::{CancellationToken, Url};
///
/// struct Site;
///
/// #[async_trait::async_trait]
/// impl ResourceSource for Site {
///     async fn fetch_text(&self, _: &Url, _: &CancellationToken) -> Option<String> {
///         Some("<html><head><link rel=icon href=icon.png sizes=32x32></head></html>".into())
///     }
///
///     async fn fetch_images(&self, _: &Url, _: &CancellationToken) -> Vec<IconImage> {
///         vec![]
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let scanner = Scanner::new(Site);
/// let found = scanner.scan(Url::parse("https://example.com").unwrap()).await;
///
/// assert_eq!(found[0].location.as_str(), "https://example.com/icon.png");
/// assert_eq!(found[0].expected_size, Dimension::square(32));
/// assert_eq!(found[1].location.as_str(), "https://example.com/favicon.ico");
/// # });
/// ```
pub struct Scanner<S> {
    source: S,
    max_scans: usize,
}

impl<S: ResourceSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_scans: DEFAULT_MAX_SCANS,
        }
    }

    /// Changes how many scan tasks (the page itself included) a scan may execute.
    pub fn with_max_scans(mut self, max_scans: usize) -> Self {
        self.max_scans = max_scans;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scans `address` and every document it suggests, collecting all candidates.
    pub async fn scan(&self, address: Url) -> Vec<Candidate> {
        self.scan_with_cancel(address, &CancellationToken::new()).await
    }

    pub async fn scan_with_cancel(
        &self,
        address: Url,
        cancel: &CancellationToken,
    ) -> Vec<Candidate> {
        self.scan_stream(address, cancel).collect().await
    }

    /// Lazily scans `address`: documents are only downloaded once the candidates found so far
    /// have been consumed. Candidates may repeat, but no document is scanned twice.
    ///
    /// The stream ends early once `cancel` is cancelled.
    pub fn scan_stream<'a>(
        &'a self,
        address: Url,
        cancel: &'a CancellationToken,
    ) -> impl Stream<Item = Candidate> + 'a {
        let page = ScanTask::Page(address);
        let state = ScanState {
            source: &self.source,
            cancel,
            scheduled: HashSet::from([page.clone()]),
            queue: VecDeque::from([page]),
            ready: VecDeque::new(),
            remaining: self.max_scans,
        };

        futures::stream::unfold(state, |mut state| async move {
            let candidate = state.next().await?;
            Some((candidate, state))
        })
    }
}

struct ScanState<'a, S: ?Sized> {
    source: &'a S,
    cancel: &'a CancellationToken,
    /// Every task ever queued, executed or not.
    scheduled: HashSet<ScanTask>,
    queue: VecDeque<ScanTask>,
    ready: VecDeque<Candidate>,
    remaining: usize,
}

impl<S: ResourceSource + ?Sized> ScanState<'_, S> {
    async fn next(&mut self) -> Option<Candidate> {
        loop {
            if let Some(candidate) = self.ready.pop_front() {
                return Some(candidate);
            }

            if self.cancel.is_cancelled() {
                #[cfg(feature = "log")]
                log::debug!("scan cancelled with {} tasks left", self.queue.len());

                return None;
            }

            if self.remaining == 0 {
                #[cfg(feature = "log")]
                log::debug!("scan limit reached, {} tasks skipped", self.queue.len());

                return None;
            }

            let task = self.queue.pop_front()?;
            self.remaining -= 1;

            let output = task.execute(self.source, self.cancel).await;
            self.ready.extend(output.results);
            for suggestion in output.suggestions {
                if self.scheduled.insert(suggestion.clone()) {
                    self.queue.push_back(suggestion);
                } else {
                    #[cfg(feature = "log")]
                    log::trace!("already scheduled {suggestion:?}");
                }
            }
        }
    }
}
