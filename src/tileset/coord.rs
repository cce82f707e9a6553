//! XYZ tile coordinates and their TMS row mapping.

/// Deepest zoom level accepted from clients.
pub const MAX_ZOOM: u8 = 30;

/// A tile coordinate in the XYZ scheme (row 0 is the northernmost row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Build a coordinate, returning `None` if it lies outside the tile grid.
    ///
    /// Valid coordinates satisfy `z <= MAX_ZOOM` and `x, y < 2^z`.
    pub fn new(z: u32, x: u32, y: u32) -> Option<Self> {
        let z = u8::try_from(z).ok().filter(|z| *z <= MAX_ZOOM)?;
        let size = 1u32 << z;
        if x >= size || y >= size {
            return None;
        }
        Some(Self { z, x, y })
    }

    /// Number of tiles along one axis at this zoom level.
    pub fn grid_size(&self) -> u32 {
        1u32 << self.z
    }

    /// Row index of this tile in the TMS scheme: `2^z - 1 - y`.
    pub fn tms_row(&self) -> u32 {
        self.grid_size() - 1 - self.y
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
