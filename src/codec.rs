use crate::ico::IconDirEntry;
use crate::icon::{IconImage, ImageData};
use crate::size::Dimension;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[cfg(feature = "image")]
    #[error("the image could not be decoded or encoded")]
    Image(#[from] image::ImageError),
    #[error("the image could not be written")]
    Io(#[from] std::io::Error),
    #[error("vector images must be rasterized first")]
    NotRaster,
    #[error("the pixel data doesn't match the image size")]
    BadPixelData,
    #[error("cannot resize an image to {0}")]
    BadSize(Dimension),
}

/// Turns bytes into [`IconImage`]s and back.
///
/// Decoding images is not this crate's business: sources only call into a codec.
/// With the `image` feature, [`RasterCodec`] handles the common raster formats.
pub trait ImageCodec: Send + Sync {
    /// Decodes a single image.
    fn decode(&self, bytes: &[u8]) -> Result<IconImage, CodecError>;

    /// Decodes one of the images in an ico container.
    fn decode_entry(&self, container: &[u8], entry: &IconDirEntry)
    -> Result<IconImage, CodecError>;

    fn resize(&self, image: &IconImage, size: Dimension) -> Result<IconImage, CodecError>;

    fn encode_png(&self, image: &IconImage) -> Result<Vec<u8>, CodecError>;

    /// Writes the image to a png file.
    fn save(&self, image: &IconImage, path: &Path) -> Result<(), CodecError> {
        let png = self.encode_png(image)?;
        std::fs::write(path, png)?;

        Ok(())
    }
}

#[cfg(feature = "image")]
pub use raster::RasterCodec;

#[cfg(feature = "image")]
mod raster {
    use super::*;
    use image::imageops::FilterType;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    /// An [`ImageCodec`] backed by the `image` crate. Vector images are not supported.
    #[derive(Debug, Default, Copy, Clone)]
    pub struct RasterCodec;

    impl RasterCodec {
        fn to_buffer(image: &IconImage) -> Result<RgbaImage, CodecError> {
            let ImageData::Raster(rgba) = &image.data else {
                return Err(CodecError::NotRaster);
            };
            let Dimension::Fixed { width, height } = image.size else {
                return Err(CodecError::BadPixelData);
            };

            RgbaImage::from_raw(width, height, rgba.clone()).ok_or(CodecError::BadPixelData)
        }

        fn from_buffer(buffer: RgbaImage) -> IconImage {
            let size = Dimension::new(buffer.width(), buffer.height());
            IconImage::raster(size, buffer.into_raw())
        }
    }

    impl ImageCodec for RasterCodec {
        fn decode(&self, bytes: &[u8]) -> Result<IconImage, CodecError> {
            let decoded = image::load_from_memory(bytes)?;
            Ok(Self::from_buffer(decoded.into_rgba8()))
        }

        fn decode_entry(
            &self,
            container: &[u8],
            entry: &IconDirEntry,
        ) -> Result<IconImage, CodecError> {
            // Entries holding a png decode on their own. Bare bitmap entries don't, so those
            // fall back to the container's best image scaled to the declared size.
            if let Some(image) = entry.data(container).and_then(|data| self.decode(data).ok()) {
                return Ok(image);
            }

            let decoded = image::load_from_memory_with_format(container, ImageFormat::Ico)?;
            let image = Self::from_buffer(decoded.into_rgba8());

            if image.size == entry.size {
                Ok(image)
            } else {
                self.resize(&image, entry.size)
            }
        }

        fn resize(&self, image: &IconImage, size: Dimension) -> Result<IconImage, CodecError> {
            let Dimension::Fixed { width, height } = size else {
                return Err(CodecError::BadSize(size));
            };
            if width == 0 || height == 0 {
                return Err(CodecError::BadSize(size));
            }

            let buffer = Self::to_buffer(image)?;
            let resized = image::imageops::resize(&buffer, width, height, FilterType::Lanczos3);

            Ok(Self::from_buffer(resized))
        }

        fn encode_png(&self, image: &IconImage) -> Result<Vec<u8>, CodecError> {
            let buffer = Self::to_buffer(image)?;

            let mut png = Vec::new();
            DynamicImage::ImageRgba8(buffer).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

            Ok(png)
        }
    }

}
