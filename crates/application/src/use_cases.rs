use retouch_domain::{
    BrushColor, CanvasSize, DisplayRect, ExportFormat, FilterKind, FlipAxis, MediaType, PointerSample,
    RotateDirection,
};

use crate::LoadTicket;

#[derive(Debug, Clone)]
pub struct LoadImageCommand {
    pub file_name: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
    /// Space available for the canvas; the canvas keeps the image aspect ratio inside it.
    pub container: CanvasSize,
}

#[derive(Debug, Clone)]
pub struct CompleteLoadCommand {
    pub ticket: LoadTicket,
    pub load: LoadImageCommand,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectFilterCommand {
    pub kind: FilterKind,
}

#[derive(Debug, Clone, Copy)]
pub struct SetFilterValueCommand {
    pub value: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct RotateCommand {
    pub direction: RotateDirection,
}

#[derive(Debug, Clone, Copy)]
pub struct FlipCommand {
    pub axis: FlipAxis,
}

#[derive(Debug, Clone, Copy)]
pub struct SetBrushSizeCommand {
    pub size: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SetBrushColorCommand {
    pub color: BrushColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

#[derive(Debug, Clone)]
pub struct PointerCommand {
    pub phase: PointerPhase,
    pub sample: PointerSample,
    pub display: DisplayRect,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportImageCommand {
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UndoCommand;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResetAllCommand;
