use crate::codec::ImageCodec;
use crate::ico;
use crate::icon::{IconImage, ImageKind};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Where scanners and fetchers get their resources from.
///
/// Failing to retrieve something is not an error: a source returns `None` (or no images) and
/// the resource is treated as if it doesn't exist. Sources should stop as soon as possible once
/// `cancel` is cancelled.
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// Downloads a text resource, such as a page or a manifest.
    async fn fetch_text(&self, address: &Url, cancel: &CancellationToken) -> Option<String>;

    /// Downloads every image in a resource. Some formats hold more than one image.
    async fn fetch_images(&self, address: &Url, cancel: &CancellationToken) -> Vec<IconImage>;
}

#[async_trait]
impl<T: ResourceSource + ?Sized> ResourceSource for &T {
    async fn fetch_text(&self, address: &Url, cancel: &CancellationToken) -> Option<String> {
        (**self).fetch_text(address, cancel).await
    }

    async fn fetch_images(&self, address: &Url, cancel: &CancellationToken) -> Vec<IconImage> {
        (**self).fetch_images(address, cancel).await
    }
}

#[async_trait]
impl<T: ResourceSource + ?Sized> ResourceSource for Arc<T> {
    async fn fetch_text(&self, address: &Url, cancel: &CancellationToken) -> Option<String> {
        (**self).fetch_text(address, cancel).await
    }

    async fn fetch_images(&self, address: &Url, cancel: &CancellationToken) -> Vec<IconImage> {
        (**self).fetch_images(address, cancel).await
    }
}

/// A successful response from a [`Transport`].
#[derive(Debug, Clone)]
pub struct Response {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    /// The address the content was finally served from, after redirects.
    pub final_url: Url,
}

/// Raw downloads: HTTP, a cache, a test fixture...
///
/// Redirects, retries, proxies and compression are all up to the transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `None` for anything but a successful response.
    async fn get(&self, address: &Url, cancel: &CancellationToken) -> Option<Response>;
}

/// A [`ResourceSource`] that downloads with a [`Transport`] and decodes images with an
/// [`ImageCodec`].
///
/// Images served as ico are split into their embedded images. If that fails (sites lie about
/// ico), the content is decoded as a single image instead.
pub struct TransportSource<T, C> {
    transport: T,
    codec: C,
}

impl<T: Transport, C: ImageCodec> TransportSource<T, C> {
    pub fn new(transport: T, codec: C) -> Self {
        Self { transport, codec }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn decode_images(&self, address: &Url, response: &Response) -> Vec<IconImage> {
        let body = response.body.as_slice();

        let declared = response
            .content_type
            .as_deref()
            .and_then(ImageKind::from_content_type)
            .or_else(|| ImageKind::from_path_ext(Path::new(address.path())));
        let sniffed = ImageKind::sniff(body);

        if declared == Some(ImageKind::Ico) || sniffed == Some(ImageKind::Ico) {
            match ico::read_directory(body) {
                Ok(entries) => {
                    let images = entries
                        .iter()
                        .filter_map(|entry| self.codec.decode_entry(body, entry).ok())
                        .collect::<Vec<_>>();

                    if !images.is_empty() {
                        return images;
                    }
                }
                Err(_e) => {
                    #[cfg(feature = "log")]
                    log::debug!("{address} is not a usable ico ({_e}), decoding as a single image");
                }
            }
        }

        if sniffed == Some(ImageKind::Svg)
            || (declared == Some(ImageKind::Svg) && sniffed.is_none())
        {
            return vec![IconImage::vector(body.to_vec())];
        }

        match self.codec.decode(body) {
            Ok(image) => vec![image],
            Err(_e) => {
                #[cfg(feature = "log")]
                log::debug!("could not decode {address}: {_e}");

                vec![]
            }
        }
    }
}

/// If a request for an image was redirected to a page, the site probably sends unknown paths
/// to its front page. Try the same path once more on the host we were redirected to.
fn redirect_fallback(address: &Url, response: &Response) -> Option<Url> {
    if response.final_url == *address {
        return None;
    }

    let is_html = response
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.to_ascii_lowercase().contains("text/html"));
    if !is_html {
        return None;
    }

    let mut retry = response.final_url.clone();
    retry.set_path(address.path());
    retry.set_query(address.query());
    retry.set_fragment(None);

    (retry != *address).then_some(retry)
}

fn decode_text(body: &[u8]) -> String {
    let body = body.strip_prefix(b"\xef\xbb\xbf").unwrap_or(body);
    String::from_utf8_lossy(body).into_owned()
}

#[async_trait]
impl<T: Transport, C: ImageCodec> ResourceSource for TransportSource<T, C> {
    async fn fetch_text(&self, address: &Url, cancel: &CancellationToken) -> Option<String> {
        if cancel.is_cancelled() {
            return None;
        }

        let response = self.transport.get(address, cancel).await?;
        Some(decode_text(&response.body))
    }

    async fn fetch_images(&self, address: &Url, cancel: &CancellationToken) -> Vec<IconImage> {
        if cancel.is_cancelled() {
            return vec![];
        }

        let Some(mut response) = self.transport.get(address, cancel).await else {
            return vec![];
        };

        if let Some(retry) = redirect_fallback(address, &response) {
            #[cfg(feature = "log")]
            log::debug!("{address} redirected to a page, retrying at {retry}");

            if cancel.is_cancelled() {
                return vec![];
            }

            let Some(retried) = self.transport.get(&retry, cancel).await else {
                return vec![];
            };
            response = retried;
        }

        self.decode_images(address, &response)
    }
}
