//! Reading the directory of `.ico` (and `.cur`) containers.
//!
//! An ico file starts with a 6 byte header (reserved, type, count) followed by `count`
//! 16 byte directory entries. Each entry declares the size of one embedded image and where
//! its data lives. Widths and heights are stored in a single byte, where 0 means 256.

use crate::size::Dimension;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Seek, SeekFrom};

const HEADER_LEN: u64 = 6;
const ENTRY_LEN: u64 = 16;

/// ico files begin with these bytes (reserved 0, type 1).
pub const ICO_MAGIC: [u8; 4] = [0, 0, 1, 0];

#[derive(Debug, thiserror::Error)]
pub enum IcoError {
    #[error("the icon directory is truncated")]
    Truncated(#[from] std::io::Error),
    #[error("not an ico container")]
    NotAnIcon,
    #[error("the icon directory has no entries")]
    Empty,
}

/// One image declared in an ico container's directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IconDirEntry {
    pub size: Dimension,
    pub data_len: u32,
    pub data_offset: u32,
}

impl IconDirEntry {
    /// The bytes of this entry's image within the container, if they're all there.
    pub fn data<'a>(&self, container: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.data_offset).ok()?;
        let len = usize::try_from(self.data_len).ok()?;

        container.get(start..start.checked_add(len)?)
    }
}

/// Reads the image directory of an ico container, in declaration order.
///
/// # Example
///
/// ```
/// use favicon::Dimension;
///
/// let mut ico = vec![0, 0, 1, 0, 1, 0];
/// ico.extend([0, 32, 0, 0, 1, 0, 32, 0, 0, 0, 0, 0, 22, 0, 0, 0]);
///
/// let entries = favicon::ico::read_directory(&ico).unwrap();
/// assert_eq!(entries[0].size, Dimension::new(256, 32));
/// ```
pub fn read_directory(container: &[u8]) -> Result<Vec<IconDirEntry>, IcoError> {
    let mut reader = Cursor::new(container);

    let reserved = reader.read_u16::<LittleEndian>()?;
    let kind = reader.read_u16::<LittleEndian>()?;
    // 1 is an icon, 2 a cursor. Both use the same directory layout.
    if reserved != 0 || !(1..=2).contains(&kind) {
        return Err(IcoError::NotAnIcon);
    }

    let count = reader.read_u16::<LittleEndian>()?;
    if count == 0 {
        return Err(IcoError::Empty);
    }

    let mut entries = Vec::with_capacity(usize::from(count));
    for index in 0..u64::from(count) {
        reader.seek(SeekFrom::Start(HEADER_LEN + index * ENTRY_LEN))?;

        let width = stored_side(reader.read_u8()?);
        let height = stored_side(reader.read_u8()?);
        // colour count, reserved, planes / hotspot x, bit count / hotspot y
        reader.seek(SeekFrom::Current(6))?;
        let data_len = reader.read_u32::<LittleEndian>()?;
        let data_offset = reader.read_u32::<LittleEndian>()?;

        entries.push(IconDirEntry {
            size: Dimension::new(width, height),
            data_len,
            data_offset,
        });
    }

    Ok(entries)
}

/// The declared sizes of every image in an ico container, in declaration order.
pub fn read_sizes(container: &[u8]) -> Result<Vec<Dimension>, IcoError> {
    Ok(read_directory(container)?
        .into_iter()
        .map(|entry| entry.size)
        .collect())
}

pub fn looks_like_ico(bytes: &[u8]) -> bool {
    bytes.starts_with(&ICO_MAGIC)
}

fn stored_side(byte: u8) -> u32 {
    match byte {
        0 => 256,
        n => u32::from(n),
    }
}
