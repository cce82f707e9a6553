use thiserror::Error;

/// Errors raised by the MBTiles archive adapter.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Filesystem error while opening or inspecting the archive
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error while querying the archive
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The file opened but is not a usable MBTiles archive
    #[error("Invalid MBTiles file {path}: {reason}")]
    InvalidFile { path: String, reason: String },
}

/// Errors raised while building a TileJSON descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Archive query failed
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Filesystem error while reading the archive size
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No cached zoom values and no rows in the tile table
    #[error("Tileset has no tiles to infer zoom levels from")]
    NoTiles,
}

/// Errors visible to HTTP clients.
///
/// Every internal failure is normalized into one of these variants at the
/// responder boundary. The three not-found kinds share one plain-text shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilesetError {
    /// Generic not-found, also used for unmatched routes
    #[error("Not Found")]
    NotFound,

    /// The tileset exists but the requested tile does not
    #[error("Tile does not exist")]
    TileNotFound,

    /// The tileset is missing from every search root or could not be opened
    #[error("Tileset does not exist")]
    TilesetNotFound,

    /// Malformed client input, such as an invalid JSONP callback
    #[error("Bad Request")]
    BadRequest,
}

impl TilesetError {
    /// Plain-text body rendered for this error.
    pub fn description(&self) -> &'static str {
        match self {
            TilesetError::NotFound => "Not Found",
            TilesetError::TileNotFound => "Tile does not exist",
            TilesetError::TilesetNotFound => "Tileset does not exist",
            TilesetError::BadRequest => "Bad Request",
        }
    }
}
