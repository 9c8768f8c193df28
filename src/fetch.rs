use crate::icon::IconImage;
use crate::priority::PriorityQueue;
use crate::scanner::{Candidate, Scanner};
use crate::size::{Dimension, FetchOptions};
use crate::source::ResourceSource;
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How a fetch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Found(IconImage),
    /// Images were downloaded, but none of them satisfied the options.
    NoMatch,
    /// No image could be downloaded at all.
    NotFound,
    /// The fetch was cancelled before it could decide.
    Cancelled,
}

impl FetchResult {
    pub fn image(&self) -> Option<&IconImage> {
        match self {
            FetchResult::Found(image) => Some(image),
            _ => None,
        }
    }

    pub fn into_image(self) -> Option<IconImage> {
        match self {
            FetchResult::Found(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FetchResult::Found(_))
    }
}

/// Finds the icon of a page that best matches some [`FetchOptions`].
///
/// Candidates are downloaded one at a time, as few as possible: a candidate that claims to be
/// the perfect size is tried as soon as it is found, the rest are tried closest-first once the
/// scan is done. The first image of exactly the perfect size ends the search.
pub struct Fetcher<S> {
    scanner: Scanner<S>,
}

impl<S: ResourceSource> Fetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            scanner: Scanner::new(source),
        }
    }

    /// See [`Scanner::with_max_scans`].
    pub fn with_max_scans(self, max_scans: usize) -> Self {
        Self {
            scanner: self.scanner.with_max_scans(max_scans),
        }
    }

    pub fn source(&self) -> &S {
        self.scanner.source()
    }

    pub fn scanner(&self) -> &Scanner<S> {
        &self.scanner
    }

    pub async fn fetch(
        &self,
        address: Url,
        options: &FetchOptions,
        cancel: &CancellationToken,
    ) -> FetchResult {
        #[cfg(feature = "log")]
        log::debug!("fetching icon for {address} with {options:?}");

        let candidates = self.scanner.scan_stream(address, cancel);
        FetchJob::new(self.scanner.source(), options, cancel)
            .run(candidates)
            .await
    }

    /// The icon closest to `size`, of any size.
    pub async fn fetch_closest(&self, address: Url, size: Dimension) -> Option<IconImage> {
        self.fetch(address, &FetchOptions::closest(size), &CancellationToken::new())
            .await
            .into_image()
    }

    /// An icon of exactly `size`, if the page has one.
    pub async fn fetch_exact(&self, address: Url, size: Dimension) -> Option<IconImage> {
        self.fetch(address, &FetchOptions::exact(size), &CancellationToken::new())
            .await
            .into_image()
    }
}

/// The state of one fetch. Owned by that fetch alone.
struct FetchJob<'a, S: ?Sized> {
    source: &'a S,
    options: &'a FetchOptions,
    cancel: &'a CancellationToken,
    seen: HashSet<Url>,
    unverified: PriorityQueue<Candidate>,
    downloaded: PriorityQueue<IconImage>,
    images_seen: usize,
}

impl<'a, S: ResourceSource + ?Sized> FetchJob<'a, S> {
    fn new(source: &'a S, options: &'a FetchOptions, cancel: &'a CancellationToken) -> Self {
        Self {
            source,
            options,
            cancel,
            seen: HashSet::new(),
            unverified: PriorityQueue::new(),
            downloaded: PriorityQueue::new(),
            images_seen: 0,
        }
    }

    async fn run(mut self, candidates: impl Stream<Item = Candidate>) -> FetchResult {
        let mut candidates = std::pin::pin!(candidates);

        while let Some(candidate) = candidates.next().await {
            if !self.seen.insert(candidate.location.clone()) {
                continue;
            }

            if self.options.is_perfect(&candidate.expected_size) {
                if self.cancel.is_cancelled() {
                    break;
                }
                if let Some(image) = self.download(&candidate.location).await {
                    return FetchResult::Found(image);
                }
            } else {
                let distance = self.options.distance(&candidate.expected_size);
                self.unverified.push(distance, candidate);
            }
        }

        #[cfg(feature = "log")]
        log::trace!("scan done, {} candidates left to verify", self.unverified.len());

        while let Some(candidate) = self.unverified.pop() {
            if self.cancel.is_cancelled() {
                break;
            }
            if let Some(image) = self.download(&candidate.location).await {
                return FetchResult::Found(image);
            }
        }

        if self.cancel.is_cancelled() {
            #[cfg(feature = "log")]
            log::debug!("fetch cancelled, dropping {} images", self.downloaded.len());

            return FetchResult::Cancelled;
        }

        match self.downloaded.pop() {
            Some(image) => {
                #[cfg(feature = "log")]
                log::debug!("no perfect icon, settling for {}", image.size);

                FetchResult::Found(image)
            }
            None if self.images_seen > 0 => FetchResult::NoMatch,
            None => FetchResult::NotFound,
        }
    }

    /// Downloads `location`, returning an image of exactly the perfect size if there is one.
    /// Other images within range are kept for later.
    async fn download(&mut self, location: &Url) -> Option<IconImage> {
        let images = self.source.fetch_images(location, self.cancel).await;

        #[cfg(feature = "log")]
        log::debug!("downloaded {location}: {} images", images.len());

        self.images_seen += images.len();

        for mut image in images {
            if image.size.is_scalable() && self.options.perfect != Dimension::Empty {
                image.size = self.options.perfect;
            }

            if self.options.is_perfect(&image.size) {
                #[cfg(feature = "log")]
                log::debug!("{location} has a perfect {} icon", image.size);

                return Some(image);
            }

            if !self.options.in_range(&image.size) {
                #[cfg(feature = "log")]
                log::trace!("{location}: {} is out of range", image.size);

                continue;
            }

            let distance = self.options.distance(&image.size);
            self.downloaded.push(distance, image);
        }

        None
    }
}
