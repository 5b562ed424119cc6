mod brush;
mod error;
mod filter;
mod history;
mod image;
mod raster;
mod stroke;
mod transform;

pub use brush::{BrushColor, BrushState, BRUSH_PALETTE, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
pub use error::DomainError;
pub use filter::{FilterControl, FilterDescriptor, FilterKind, FilterSlider, FilterState};
pub use history::{History, HistorySnapshot, HISTORY_CAPACITY};
pub use image::{
    media_type_for_path, DecodedImage, ExportFormat, MediaType, EXPORT_FILE_STEM, JPEG_QUALITY,
    OCTET_STREAM,
};
pub use raster::{fit_canvas, CanvasSize, Raster, BYTES_PER_PIXEL};
pub use stroke::{
    CanvasPoint, DisplayRect, PointerSample, StrokeEnd, StrokePhase, StrokeSegment, StrokeTracker,
};
pub use transform::{FlipAxis, FlipSign, RotateDirection, TransformState};
