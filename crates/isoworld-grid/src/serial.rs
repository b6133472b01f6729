//! Binary tile-map persistence.
//!
//! ## Binary Layout
//!
//! All integers and floats are little-endian.
//!
//! | Size | Field |
//! |------|-------|
//! | 4 | Grid width (`i32`) |
//! | 4 | Grid height (`i32`) |
//! | 10 × W × H | Tiles, row-major |
//!
//! Each tile record:
//!
//! | Size | Field |
//! |------|-------|
//! | 4 | Tile type tag (`i32`, see [`TileType::tag`]) |
//! | 1 | Walkable (`u8`, 0 or 1) |
//! | 1 | Transparent (`u8`, 0 or 1) |
//! | 4 | Render height (`f32`) |
//!
//! Only these four fields are persisted; environmental data is regenerated.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::grid::Grid;
use crate::tile::{Tile, TileType};

/// Errors that can occur while reading or writing a tile map.
#[derive(Debug, thiserror::Error)]
pub enum TileMapError {
    /// The underlying reader or writer failed (including truncated input).
    #[error("tile map I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The header declares a negative size, or the grid is too large for the format.
    #[error("invalid tile map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: i64,
        /// Declared height.
        height: i64,
    },
    /// A tile record carries a type tag that this build does not know.
    #[error("unknown tile type tag: {0}")]
    UnknownTileType(i32),
}

impl Grid {
    /// Writes the grid in the tile-map format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), TileMapError> {
        let width = i32::try_from(self.width()).map_err(|_| self.dimension_error())?;
        let height = i32::try_from(self.height()).map_err(|_| self.dimension_error())?;

        writer.write_all(&width.to_le_bytes())?;
        writer.write_all(&height.to_le_bytes())?;

        let mut record = [0u8; 10];
        for tile in self.tiles() {
            record[0..4].copy_from_slice(&tile.kind().tag().to_le_bytes());
            record[4] = u8::from(tile.walkable);
            record[5] = u8::from(tile.transparent);
            record[6..10].copy_from_slice(&tile.height.to_le_bytes());
            writer.write_all(&record)?;
        }
        Ok(())
    }

    /// Reads a grid written by [`Grid::write_to`].
    ///
    /// Tiles are rebuilt with their type defaults, then walkable, transparent and
    /// height are overwritten from the record.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, TileMapError> {
        let width = read_i32(reader)?;
        let height = read_i32(reader)?;
        if width < 0 || height < 0 {
            return Err(TileMapError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }

        let (width, height) = (width as usize, height as usize);
        let count = width
            .checked_mul(height)
            .ok_or(TileMapError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            })?;
        // The header is untrusted; a short payload surfaces as `Io` below.
        let mut tiles = Vec::with_capacity(count.min(MAX_PREALLOCATED_TILES));
        let mut record = [0u8; 10];
        for _ in 0..count {
            reader.read_exact(&mut record)?;
            let tag = i32::from_le_bytes([record[0], record[1], record[2], record[3]]);
            let kind = TileType::from_tag(tag).ok_or(TileMapError::UnknownTileType(tag))?;

            let mut tile = Tile::new(kind);
            tile.walkable = record[4] != 0;
            tile.transparent = record[5] != 0;
            tile.height = f32::from_le_bytes([record[6], record[7], record[8], record[9]]);
            tiles.push(tile);
        }

        Ok(Grid::from_tiles(width, height, tiles))
    }

    /// Saves the grid to `path`, creating or truncating the file.
    pub fn save(&self, path: &Path) -> Result<(), TileMapError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a grid previously written with [`Grid::save`].
    pub fn load(path: &Path) -> Result<Self, TileMapError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }

    fn dimension_error(&self) -> TileMapError {
        TileMapError::InvalidDimensions {
            width: self.width() as i64,
            height: self.height() as i64,
        }
    }
}

const MAX_PREALLOCATED_TILES: usize = 1 << 16;

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, TileMapError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}
