use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("raster dimensions must be non-zero, got {width}x{height}")]
    EmptyRaster { width: u32, height: u32 },
    #[error("raster buffer holds {actual} bytes, expected {expected}")]
    RasterSizeMismatch { expected: usize, actual: usize },
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
    #[error("invalid brush color {0:?}, expected #rrggbb")]
    InvalidBrushColor(String),
    #[error("unknown export format: {0}")]
    UnknownExportFormat(String),
}
