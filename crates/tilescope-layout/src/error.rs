use std::fmt;

/// Names the input that failed validation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Dimension {
    Width,
    Height,
    TileWidth,
    TileHeight,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Width => "image width",
            Dimension::Height => "image height",
            Dimension::TileWidth => "tile width",
            Dimension::TileHeight => "tile height",
        };
        f.write_str(name)
    }
}

/// A tile layout contract violation.
///
/// Both variants are caller errors; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// An image or tile dimension was zero.
    InvalidDimension(Dimension),

    /// A tile coordinate outside `[0, columns) × [0, rows)`.
    IndexOutOfRange {
        col: u32,
        row: u32,
        columns: u32,
        rows: u32,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::InvalidDimension(dim) => write!(f, "{dim} must be greater than zero"),
            LayoutError::IndexOutOfRange { col, row, columns, rows } => write!(
                f,
                "tile ({col}, {row}) is outside the {columns}x{rows} grid"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}
