mod error;
mod load;
mod ports;
mod service;
mod use_cases;

pub use error::ApplicationError;
pub use load::{LoadOutcome, LoadTicket};
pub use ports::{CanvasRenderer, ExportSink, ImageDecoder, ImageEncoder, StrokePainter};
pub use service::{EditorService, DEFAULT_CANVAS_PADDING};
pub use use_cases::{
    CompleteLoadCommand, ExportImageCommand, FlipCommand, LoadImageCommand, PointerCommand,
    PointerPhase, ResetAllCommand, RotateCommand, SelectFilterCommand, SetBrushColorCommand,
    SetBrushSizeCommand, SetFilterValueCommand, UndoCommand,
};
