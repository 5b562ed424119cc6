use std::path::PathBuf;
use std::sync::Arc;

use retouch_domain::{
    fit_canvas, BrushState, CanvasSize, DecodedImage, FilterControl, FilterKind, FilterSlider,
    FilterState, History, HistorySnapshot, Raster, StrokeEnd, StrokeTracker, TransformState,
};
use tracing::{debug, info, warn};

use crate::load::LoadTickets;
use crate::{
    ApplicationError, CanvasRenderer, CompleteLoadCommand, ExportImageCommand, ExportSink,
    FlipCommand, ImageDecoder, ImageEncoder, LoadImageCommand, LoadOutcome, LoadTicket,
    PointerCommand, PointerPhase, ResetAllCommand, RotateCommand, SelectFilterCommand,
    SetBrushColorCommand, SetBrushSizeCommand, SetFilterValueCommand, StrokePainter, UndoCommand,
};

pub const DEFAULT_CANVAS_PADDING: u32 = 48;

#[derive(Debug, Default)]
struct EditorSession {
    source: Option<Arc<Raster>>,
    canvas: Option<Raster>,
    canvas_size: Option<CanvasSize>,
    container: Option<CanvasSize>,
    filters: FilterState,
    control: FilterControl,
    transform: TransformState,
    brush: BrushState,
    draw_mode: bool,
    stroke: StrokeTracker,
    history: History,
}

/// One editing session over a single image, driven by discrete user actions.
pub struct EditorService {
    decoder: Box<dyn ImageDecoder>,
    renderer: Box<dyn CanvasRenderer>,
    painter: Box<dyn StrokePainter>,
    encoder: Box<dyn ImageEncoder>,
    export_sink: Box<dyn ExportSink>,
    canvas_padding: u32,
    tickets: LoadTickets,
    session: EditorSession,
}

impl EditorService {
    pub fn new(
        decoder: Box<dyn ImageDecoder>,
        renderer: Box<dyn CanvasRenderer>,
        painter: Box<dyn StrokePainter>,
        encoder: Box<dyn ImageEncoder>,
        export_sink: Box<dyn ExportSink>,
    ) -> Self {
        Self {
            decoder,
            renderer,
            painter,
            encoder,
            export_sink,
            canvas_padding: DEFAULT_CANVAS_PADDING,
            tickets: LoadTickets::default(),
            session: EditorSession::default(),
        }
    }

    pub fn with_canvas_padding(mut self, padding: u32) -> Self {
        self.canvas_padding = padding;
        self
    }

    pub fn with_brush(mut self, brush: BrushState) -> Self {
        self.session.brush.set_size(brush.size);
        self.session.brush.set_color(brush.color);
        self
    }

    /// Issues the ticket for a load that will complete later.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.tickets.issue()
    }

    pub fn complete_load(
        &mut self,
        command: CompleteLoadCommand,
    ) -> Result<LoadOutcome, ApplicationError> {
        if !self.tickets.is_current(command.ticket) {
            warn!(
                ticket = command.ticket.get(),
                file = %command.load.file_name,
                "dropping stale image load"
            );
            return Ok(LoadOutcome::Stale);
        }
        self.apply_load(command.load).map(LoadOutcome::Loaded)
    }

    /// Loads immediately, superseding any load still in flight.
    pub fn load_image(&mut self, command: LoadImageCommand) -> Result<DecodedImage, ApplicationError> {
        let ticket = self.begin_load();
        match self.complete_load(CompleteLoadCommand {
            ticket,
            load: command,
        })? {
            LoadOutcome::Loaded(decoded) => Ok(decoded),
            LoadOutcome::Stale => Err(ApplicationError::InvalidInput(
                "load superseded before it completed".to_string(),
            )),
        }
    }

    fn apply_load(&mut self, command: LoadImageCommand) -> Result<DecodedImage, ApplicationError> {
        if !command.media_type.is_image() {
            warn!(
                file = %command.file_name,
                media_type = %command.media_type,
                "rejected non-image file"
            );
            return Err(ApplicationError::NotAnImage {
                file_name: command.file_name,
                media_type: command.media_type.to_string(),
            });
        }
        if command.container.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "canvas container must be non-empty".to_string(),
            ));
        }

        let decoded = self.decoder.decode(&command.bytes, &command.media_type)?;
        let image_size = decoded.size();
        let canvas_size = fit_canvas(image_size, command.container, self.canvas_padding);
        let source = Arc::new(decoded);
        let canvas = self.renderer.render(
            &source,
            &FilterState::default(),
            &TransformState::default(),
            canvas_size,
        )?;

        let session = &mut self.session;
        session.source = Some(source);
        session.canvas = Some(canvas);
        session.canvas_size = Some(canvas_size);
        session.container = Some(command.container);
        session.filters = FilterState::default();
        session.transform = TransformState::default();
        session.stroke.cancel();
        self.commit_snapshot();

        info!(
            file = %command.file_name,
            width = image_size.width,
            height = image_size.height,
            canvas_width = canvas_size.width,
            canvas_height = canvas_size.height,
            "image loaded"
        );
        Ok(DecodedImage {
            file_name: command.file_name,
            media_type: command.media_type,
            size: image_size,
        })
    }

    pub fn has_image(&self) -> bool {
        self.session.source.is_some()
    }

    pub fn canvas(&self) -> Option<&Raster> {
        self.session.canvas.as_ref()
    }

    pub fn canvas_size(&self) -> Option<CanvasSize> {
        self.session.canvas_size
    }

    pub fn filters(&self) -> FilterState {
        self.session.filters
    }

    pub fn transform(&self) -> TransformState {
        self.session.transform
    }

    pub fn brush(&self) -> BrushState {
        self.session.brush
    }

    pub fn draw_mode(&self) -> bool {
        self.session.draw_mode
    }

    pub fn is_stroking(&self) -> bool {
        self.session.stroke.is_stroking()
    }

    pub fn history(&self) -> &History {
        &self.session.history
    }

    pub fn select_filter(&mut self, command: SelectFilterCommand) -> FilterSlider {
        self.session.control.select(command.kind);
        self.filter_slider()
    }

    pub fn filter_slider(&self) -> FilterSlider {
        self.session.control.slider(&self.session.filters)
    }

    /// Moves the shared slider. Re-renders but does not commit; see
    /// [`EditorService::commit_filter_adjustment`].
    pub fn set_filter_value(
        &mut self,
        command: SetFilterValueCommand,
    ) -> Result<FilterSlider, ApplicationError> {
        let kind = self.session.control.selected();
        self.set_filter(kind, command.value)?;
        Ok(self.filter_slider())
    }

    pub fn set_filter(&mut self, kind: FilterKind, value: i32) -> Result<u16, ApplicationError> {
        let stored = self.session.filters.set(kind, value);
        self.rerender()?;
        Ok(stored)
    }

    /// Ends a slider drag. Commits only when the filters moved away from the
    /// current snapshot.
    pub fn commit_filter_adjustment(&mut self) -> Result<bool, ApplicationError> {
        let Some(current) = self.session.history.current() else {
            return Ok(false);
        };
        if current.filters == self.session.filters {
            return Ok(false);
        }
        self.commit_snapshot();
        Ok(true)
    }

    /// Restores default filters and transform and re-renders without committing.
    pub fn reset_filters(&mut self) -> Result<(), ApplicationError> {
        self.session.filters = FilterState::default();
        self.session.transform = TransformState::default();
        self.rerender()
    }

    pub fn rotate(&mut self, command: RotateCommand) -> Result<(), ApplicationError> {
        if !self.has_image() {
            return Ok(());
        }
        self.session.transform.rotate(command.direction);
        self.rerender()?;
        self.commit_snapshot();
        Ok(())
    }

    pub fn flip(&mut self, command: FlipCommand) -> Result<(), ApplicationError> {
        if !self.has_image() {
            return Ok(());
        }
        self.session.transform.flip(command.axis);
        self.rerender()?;
        self.commit_snapshot();
        Ok(())
    }

    pub fn toggle_draw_mode(&mut self) -> Result<bool, ApplicationError> {
        let enabled = !self.session.draw_mode;
        self.set_draw_mode(enabled)?;
        Ok(enabled)
    }

    /// Turning draw mode off in the middle of a stroke ends the stroke.
    pub fn set_draw_mode(&mut self, enabled: bool) -> Result<(), ApplicationError> {
        if !enabled && self.session.stroke.is_stroking() {
            self.finish_stroke()?;
        }
        self.session.draw_mode = enabled;
        Ok(())
    }

    pub fn set_brush_size(&mut self, command: SetBrushSizeCommand) -> u32 {
        self.session.brush.set_size(command.size)
    }

    pub fn set_brush_color(&mut self, command: SetBrushColorCommand) {
        self.session.brush.set_color(command.color);
    }

    pub fn pointer(&mut self, command: PointerCommand) -> Result<(), ApplicationError> {
        if !self.session.draw_mode {
            return Ok(());
        }
        let Some(canvas_size) = self.session.canvas_size else {
            return Ok(());
        };

        match command.phase {
            PointerPhase::Down => {
                if let Some(point) = command.sample.to_canvas(command.display, canvas_size) {
                    self.session.stroke.pointer_down(point);
                }
                Ok(())
            }
            PointerPhase::Move => {
                let Some(point) = command.sample.to_canvas(command.display, canvas_size) else {
                    return Ok(());
                };
                let Some(segment) = self.session.stroke.pointer_move(point) else {
                    return Ok(());
                };
                if let Some(canvas) = self.session.canvas.as_mut() {
                    self.painter
                        .paint_segment(canvas, segment, &self.session.brush);
                }
                Ok(())
            }
            PointerPhase::Up | PointerPhase::Leave => self.finish_stroke(),
        }
    }

    fn finish_stroke(&mut self) -> Result<(), ApplicationError> {
        match self.session.stroke.pointer_up() {
            StrokeEnd::NotStroking => {}
            StrokeEnd::Empty => self.commit_snapshot(),
            StrokeEnd::Painted => {
                // The painted canvas already carries the filters and transform.
                if let Some(canvas) = self.session.canvas.as_ref() {
                    self.session.source = Some(Arc::new(canvas.clone()));
                    self.session.filters = FilterState::default();
                    self.session.transform = TransformState::default();
                }
                self.commit_snapshot();
                debug!(
                    history_len = self.session.history.len(),
                    "stroke committed into baseline"
                );
            }
        }
        Ok(())
    }

    /// Steps back one snapshot. At the first snapshot nothing changes, and a
    /// stroke in progress keeps drawing.
    pub fn undo(&mut self, _command: UndoCommand) -> Result<bool, ApplicationError> {
        let Some(snapshot) = self.session.history.undo().cloned() else {
            return Ok(false);
        };
        self.session.stroke.cancel();
        self.restore(&snapshot)?;
        debug!(
            cursor = ?self.session.history.cursor(),
            "undo restored snapshot"
        );
        Ok(true)
    }

    fn restore(&mut self, snapshot: &HistorySnapshot) -> Result<(), ApplicationError> {
        self.session.source = Some(Arc::clone(&snapshot.source));
        self.session.filters = snapshot.filters;
        self.session.transform = snapshot.transform;
        self.session.canvas_size = Some(snapshot.rendered.size());
        self.rerender()
    }

    /// Returns to the first retained image with default filters and
    /// transform, and commits that as a new snapshot.
    pub fn reset_all(&mut self, _command: ResetAllCommand) -> Result<(), ApplicationError> {
        if !self.has_image() {
            return Ok(());
        }
        self.session.stroke.cancel();

        if let Some(first) = self.session.history.reset_to_first() {
            let source = Arc::clone(&first.source);
            let image_size = source.size();
            self.session.canvas_size = Some(match self.session.container {
                Some(container) => fit_canvas(image_size, container, self.canvas_padding),
                None => first.rendered.size(),
            });
            self.session.source = Some(source);
        }

        self.reset_filters()?;
        self.commit_snapshot();
        self.session.draw_mode = false;
        info!("editor reset to first image");
        Ok(())
    }

    /// Encodes the current canvas and hands it to the export sink. Returns
    /// `None` when no image is loaded.
    pub fn export_image(
        &self,
        command: ExportImageCommand,
    ) -> Result<Option<PathBuf>, ApplicationError> {
        let Some(canvas) = self.session.canvas.as_ref() else {
            return Ok(None);
        };
        let bytes = self.encoder.encode(canvas, command.format)?;
        let path = self
            .export_sink
            .deliver(&command.format.file_name(), &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "image exported");
        Ok(Some(path))
    }

    fn rerender(&mut self) -> Result<(), ApplicationError> {
        let session = &mut self.session;
        let (Some(source), Some(canvas_size)) = (session.source.as_ref(), session.canvas_size) else {
            return Ok(());
        };
        let rendered =
            self.renderer
                .render(source, &session.filters, &session.transform, canvas_size)?;
        debug!(
            width = canvas_size.width,
            height = canvas_size.height,
            filters = ?session.filters,
            rotation = session.transform.rotation_degrees,
            "canvas rendered"
        );
        session.canvas = Some(rendered);
        Ok(())
    }

    fn commit_snapshot(&mut self) {
        let session = &mut self.session;
        let (Some(source), Some(canvas)) = (session.source.as_ref(), session.canvas.as_ref()) else {
            return;
        };
        session.history.commit(HistorySnapshot {
            rendered: Arc::new(canvas.clone()),
            filters: session.filters,
            transform: session.transform,
            source: Arc::clone(source),
        });
    }
}
