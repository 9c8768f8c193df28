//! Finding the right icon for a web site is harder than fetching `/favicon.ico`.
//!
//! This crate, `favicon`, finds every icon a page declares (html `<link>` tags, web app
//! manifests, `browserconfig.xml` tiles, and the good old `/favicon.ico`) and downloads as few of
//! them as it can to return the one closest to the size you asked for.
//!
//! # Quick start
//!
//! Downloading is up to you: implement [`ResourceSource`] directly, or implement the much
//! simpler [`Transport`] and wrap it in a [`TransportSource`].
//!
//! ```
//! use favicon::{CancellationToken, Dimension, FetchOptions, Fetcher, IconImage, ResourceSource, Url};
//!
//! struct Site;
//!
//! #[async_trait::async_trait]
//! impl ResourceSource for Site {
//!     async fn fetch_text(&self, _: &Url, _: &CancellationToken) -> Option<String> {
//!         Some(r#"<html><head>
//!             <link rel="icon" href="/icon-32.png" sizes="32x32">
//!             <link rel="icon" href="/icon-16.png" sizes="16x16">
//!         </head></html>"#.into())
//!     }
//!
//!     async fn fetch_images(&self, address: &Url, _: &CancellationToken) -> Vec<IconImage> {
//!         match address.path() {
//!             "/icon-32.png" => vec![IconImage::raster(Dimension::square(32), vec![])],
//!             "/icon-16.png" => vec![IconImage::raster(Dimension::square(16), vec![])],
//!             _ => vec![],
//!         }
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let fetcher = Fetcher::new(Site);
//! let address = Url::parse("https://example.com/").unwrap();
//!
//! let icon = fetcher.fetch_closest(address.clone(), Dimension::square(16)).await;
//! assert_eq!(icon.unwrap().size, Dimension::square(16));
//!
//! let options = FetchOptions::closest(Dimension::square(64)).minimum(Dimension::square(24));
//! let result = fetcher.fetch(address, &options, &CancellationToken::new()).await;
//! assert_eq!(result.image().unwrap().size, Dimension::square(32));
//! # });
//! ```
//!
//! # High level design
//!
//! Fetching an icon is a multi-stage procedure, and depending on your use case, you might want
//! to stop at any one of them.
//!
//! 1.  *Scanning*:
//!
//!     The page is downloaded and its `<head>` searched for icon links, and for references to
//!     other documents that list icons. Those documents are scanned in turn, breadth first, up to
//!     a fixed number of scans.
//!
//!     [Scanner] handles this part. Its output is a list (or a lazy stream) of [Candidate]s:
//!     addresses with the size the page claims they have.
//!
//! 2.  *Fetching*:
//!
//!     Candidates are only hints: pages lie about sizes, and one `.ico` may hold many images.
//!     [Fetcher] downloads candidates closest-first, and stops as soon as it sees an image of
//!     exactly the size you asked for. Otherwise, the closest image within your [FetchOptions]
//!     wins.
//!
//! 3.  *Decoding*:
//!
//!     [TransportSource] turns raw responses into [IconImage]s, splitting `.ico` containers
//!     (see [ico]) and handing pixels to an [ImageCodec]. With the default `image` feature,
//!     [RasterCodec] decodes, resizes and saves the common raster formats.
//!
//! Cancellation is cooperative: pass a [CancellationToken] to [Fetcher::fetch] and no further
//! downloads are started once it is cancelled.

mod address;
pub mod codec;
mod fetch;
pub mod ico;
mod icon;
mod priority;
pub mod scanner;
mod size;
pub mod source;
pub mod text;

pub use address::{AddressError, resolve};
pub use codec::{CodecError, ImageCodec};
#[cfg(feature = "image")]
pub use codec::RasterCodec;
pub use fetch::{FetchResult, Fetcher};
pub use icon::*;
pub use scanner::{Candidate, ScanOutput, ScanTask, Scanner};
pub use size::{Dimension, FetchOptions};
pub use source::{ResourceSource, Response, Transport, TransportSource};

pub use tokio_util::sync::CancellationToken;
pub use url::Url;
