#![allow(dead_code)]

use favicon::{CancellationToken, Dimension, IconImage, ResourceSource, Url};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory site. Counts every request, including those for missing resources.
#[derive(Default)]
pub struct MockSource {
    texts: HashMap<Url, String>,
    images: HashMap<Url, Vec<IconImage>>,
    requests: AtomicUsize,
    cancel_after: Option<usize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text(mut self, address: &str, text: &str) -> Self {
        self.texts.insert(url(address), text.to_owned());
        self
    }

    /// Adds an image of `size` at `address`. Adding more than one makes a multi-image container.
    pub fn add_image(mut self, address: &str, size: Dimension) -> Self {
        let image = match size {
            Dimension::Scalable => IconImage::vector(b"<svg/>".to_vec()),
            size => IconImage::raster(size, vec![]),
        };
        self.images.entry(url(address)).or_default().push(image);
        self
    }

    /// Cancels the caller's token once `requests` requests have been served.
    pub fn cancel_after(mut self, requests: usize) -> Self {
        self.cancel_after = Some(requests);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ResourceSource for MockSource {
    async fn fetch_text(&self, address: &Url, cancel: &CancellationToken) -> Option<String> {
        self.count_request(cancel);
        self.texts.get(address).cloned()
    }

    async fn fetch_images(&self, address: &Url, cancel: &CancellationToken) -> Vec<IconImage> {
        self.count_request(cancel);
        self.images.get(address).cloned().unwrap_or_default()
    }
}

impl MockSource {
    fn count_request(&self, cancel: &CancellationToken) {
        let served = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if self.cancel_after.is_some_and(|limit| served >= limit) {
            cancel.cancel();
        }
    }
}

pub fn url(address: &str) -> Url {
    Url::parse(address).unwrap()
}

pub fn example() -> Url {
    url("http://www.example.com/")
}

pub fn page(head: &str) -> String {
    format!("<html><head>{head}</head><body></body></html>")
}
