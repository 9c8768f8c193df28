use crate::size::Dimension;
use std::path::Path;

/// A downloaded icon.
///
/// Dropping an `IconImage` releases its pixel data. The fetch job drops every image it doesn't
/// return as soon as it is done with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub size: Dimension,
    pub data: ImageData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageData {
    /// Decoded pixels, 8-bit RGBA, row-major.
    Raster(Vec<u8>),
    /// The source of a vector image (svg). It has no pixels until rasterized by a codec.
    Vector(Vec<u8>),
}

impl IconImage {
    pub fn raster(size: Dimension, rgba: Vec<u8>) -> Self {
        IconImage {
            size,
            data: ImageData::Raster(rgba),
        }
    }

    /// A vector image. Its size is [`Dimension::Scalable`] until it is given a target size.
    pub fn vector(source: Vec<u8>) -> Self {
        IconImage {
            size: Dimension::Scalable,
            data: ImageData::Vector(source),
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.data, ImageData::Vector(_))
    }
}

/// What kind of image a downloaded resource is, as far as we can tell before decoding it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageKind {
    /// An ico container with possibly many images.
    Ico,
    Png,
    Svg,
    /// Some other raster format, left to the codec to figure out.
    Other,
}

impl ImageKind {
    /// Guess from a `Content-Type` header value, such as `image/png; charset=binary`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        const ICO_TYPES: [&str; 6] = [
            "image/x-icon",
            "image/vnd.microsoft.icon",
            "image/ico",
            "image/icon",
            "text/ico",
            "application/ico",
        ];

        let content_type = content_type.to_ascii_lowercase();

        if ICO_TYPES.iter().any(|ico| content_type.contains(ico)) {
            Some(ImageKind::Ico)
        } else if content_type.contains("image/svg+xml") {
            Some(ImageKind::Svg)
        } else if content_type.contains("image/png") {
            Some(ImageKind::Png)
        } else if content_type.contains("image/") {
            Some(ImageKind::Other)
        } else {
            None
        }
    }

    /// Guess from the extension of a path, such as the path of an address.
    pub fn from_path_ext(path: &Path) -> Option<Self> {
        let ext = path.extension()?;
        let ext = ext.to_str()?;

        if ext.eq_ignore_ascii_case("ico") || ext.eq_ignore_ascii_case("cur") {
            Some(ImageKind::Ico)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(ImageKind::Png)
        } else if ext.eq_ignore_ascii_case("svg") {
            Some(ImageKind::Svg)
        } else {
            None
        }
    }

    /// Guess from the first bytes of the content itself.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

        if crate::ico::looks_like_ico(bytes) {
            return Some(ImageKind::Ico);
        }
        if bytes.starts_with(&PNG_MAGIC) {
            return Some(ImageKind::Png);
        }

        let head = &bytes[..bytes.len().min(256)];
        let head = String::from_utf8_lossy(head);
        let head = head.trim_start_matches('\u{feff}').trim_start();
        if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
            return Some(ImageKind::Svg);
        }

        None
    }
}
