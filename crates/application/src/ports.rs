use std::path::PathBuf;

use retouch_domain::{
    BrushState, CanvasSize, ExportFormat, FilterState, MediaType, Raster, StrokeSegment,
    TransformState,
};

use crate::ApplicationError;

pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8], media_type: &MediaType) -> Result<Raster, ApplicationError>;
}

/// Produces the on-screen raster from a baseline image. Implementations must
/// be pure: same inputs, same output, inputs untouched.
pub trait CanvasRenderer {
    fn render(
        &self,
        source: &Raster,
        filters: &FilterState,
        transform: &TransformState,
        canvas: CanvasSize,
    ) -> Result<Raster, ApplicationError>;
}

pub trait StrokePainter {
    fn paint_segment(&self, canvas: &mut Raster, segment: StrokeSegment, brush: &BrushState);
}

pub trait ImageEncoder {
    fn encode(&self, raster: &Raster, format: ExportFormat) -> Result<Vec<u8>, ApplicationError>;
}

/// Receives an encoded export, the desktop counterpart of a download.
pub trait ExportSink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ApplicationError>;
}
