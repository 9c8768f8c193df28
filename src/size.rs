use std::fmt;

/// Guessed sizes above this are assumed to be unrelated numbers in a file name.
pub(crate) const MAX_GUESSED_SIZE: u32 = 4096;

/// The size of an icon, as declared by a page or as measured after downloading.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Unspecified. As a constraint, this means "no constraint".
    #[default]
    Empty,
    /// A vector image without an intrinsic raster size. It can be rendered at any size.
    Scalable,
    /// A raster size in pixels.
    Fixed { width: u32, height: u32 },
}

impl Dimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Dimension::Fixed { width, height }
    }

    pub const fn square(size: u32) -> Self {
        Dimension::new(size, size)
    }

    /// Parses a single `WxH` token, such as `32x32` or `310X150`.
    ///
    /// Anything else (`any`, `16`, `axb`, an empty string) yields `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split(['x', 'X']);
        let width = parts.next()?.trim().parse().ok()?;
        let height = parts.next()?.trim().parse().ok()?;

        if parts.next().is_some() {
            return None;
        }

        Some(Dimension::new(width, height))
    }

    /// Parses a space-separated `sizes` list, skipping tokens that aren't `WxH`.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split_ascii_whitespace()
            .filter_map(Dimension::parse)
            .collect()
    }

    /// Guesses a square size from the last run of digits in a file name or address,
    /// e.g. `favicon_48x48.png` gives 48×48.
    ///
    /// Runs of zeroes don't count, and neither do runs above [`MAX_GUESSED_SIZE`].
    pub fn guess_from_digits(text: &str) -> Option<Self> {
        let mut guessed = None;
        let mut run: Option<u32> = None;

        // a trailing None commits the last run.
        for digit in text.chars().map(|c| c.to_digit(10)).chain([None]) {
            match (digit, run) {
                (Some(digit), _) => {
                    run = Some(run.unwrap_or(0).saturating_mul(10).saturating_add(digit));
                }
                (None, Some(finished)) => {
                    if finished > 0 && finished <= MAX_GUESSED_SIZE {
                        guessed = Some(finished);
                    }
                    run = None;
                }
                (None, None) => {}
            }
        }

        guessed.map(Dimension::square)
    }

    pub fn width(&self) -> Option<u32> {
        match *self {
            Dimension::Fixed { width, .. } => Some(width),
            _ => None,
        }
    }

    pub fn height(&self) -> Option<u32> {
        match *self {
            Dimension::Fixed { height, .. } => Some(height),
            _ => None,
        }
    }

    pub fn is_scalable(&self) -> bool {
        matches!(self, Dimension::Scalable)
    }

    pub fn is_square(&self) -> bool {
        match *self {
            Dimension::Fixed { width, height } => width == height,
            _ => true,
        }
    }

    /// Width and height as a point, treating `Empty` as the origin.
    fn as_point(&self) -> Option<(f64, f64)> {
        match *self {
            Dimension::Empty => Some((0.0, 0.0)),
            Dimension::Scalable => None,
            Dimension::Fixed { width, height } => Some((width as f64, height as f64)),
        }
    }

    /// Euclidean distance between two sizes seen as points in width/height space.
    ///
    /// A scalable size is at distance zero from everything: it can become any size.
    pub fn distance(&self, other: &Dimension) -> f64 {
        let (Some((w1, h1)), Some((w2, h2))) = (self.as_point(), other.as_point()) else {
            return 0.0;
        };

        let dx = w1 - w2;
        let dy = h1 - h2;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Empty => f.write_str("empty"),
            Dimension::Scalable => f.write_str("scalable"),
            Dimension::Fixed { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

/// Constraints for a single fetch.
///
/// The fetched icon is the one closest to [`FetchOptions::perfect`] among those within
/// [`FetchOptions::minimum`] and [`FetchOptions::maximum`].
/// An exact match with `perfect` ends the search early.
///
/// # Example
///
/// ```
/// use favicon::{Dimension, FetchOptions};
///
/// let options = FetchOptions::closest(Dimension::square(32)).require_square(true);
/// assert!(options.in_range(&Dimension::square(48)));
/// assert!(!options.in_range(&Dimension::new(48, 32)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub minimum: Dimension,
    pub maximum: Dimension,
    pub perfect: Dimension,
    pub require_square: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            minimum: Dimension::Empty,
            maximum: Dimension::square(4096),
            perfect: Dimension::Empty,
            require_square: false,
        }
    }
}

impl FetchOptions {
    /// Any size is accepted, the closest to `size` wins.
    pub fn closest(size: Dimension) -> Self {
        Self {
            perfect: size,
            ..Self::default()
        }
    }

    /// Only exactly `size` is accepted.
    pub fn exact(size: Dimension) -> Self {
        Self {
            minimum: size,
            maximum: size,
            perfect: size,
            require_square: false,
        }
    }

    pub fn minimum(mut self, size: Dimension) -> Self {
        self.minimum = size;
        self
    }

    pub fn maximum(mut self, size: Dimension) -> Self {
        self.maximum = size;
        self
    }

    pub fn perfect(mut self, size: Dimension) -> Self {
        self.perfect = size;
        self
    }

    pub fn require_square(mut self, require_square: bool) -> Self {
        self.require_square = require_square;
        self
    }

    /// Is `size` exactly the perfect size? Never true when no perfect size is set.
    pub fn is_perfect(&self, size: &Dimension) -> bool {
        self.perfect != Dimension::Empty && *size == self.perfect
    }

    /// Is `size` within the minimum and maximum bounds (and square, if required)?
    pub fn in_range(&self, size: &Dimension) -> bool {
        let Dimension::Fixed { width, height } = *size else {
            // scalable images fit anywhere, and an unknown size can't be judged.
            return size.is_scalable();
        };

        if self.require_square && width != height {
            return false;
        }

        let min_width = self.minimum.width().unwrap_or(0);
        let min_height = self.minimum.height().unwrap_or(0);
        let max_width = self.maximum.width().unwrap_or(u32::MAX);
        let max_height = self.maximum.height().unwrap_or(u32::MAX);

        (min_width..=max_width).contains(&width) && (min_height..=max_height).contains(&height)
    }

    /// How far `size` is from the perfect size.
    pub fn distance(&self, size: &Dimension) -> f64 {
        size.distance(&self.perfect)
    }
}
