use std::path::Path;
use std::time::{Duration, Instant};

use font8x8::UnicodeFonts;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use retouch_adapters::{
    present_brush, present_decoded, present_export, present_filter_slider, present_history,
    present_transform, BackgroundImageLoader, CandidateFile, LoadRequest,
};
use retouch_application::{
    ApplicationError, CompleteLoadCommand, EditorService, ExportImageCommand, FlipCommand,
    LoadOutcome, PointerCommand, PointerPhase, ResetAllCommand, RotateCommand,
    SelectFilterCommand, SetBrushColorCommand, SetBrushSizeCommand, SetFilterValueCommand,
    UndoCommand,
};
use retouch_domain::{
    BrushColor, CanvasSize, DisplayRect, DomainError, ExportFormat, FilterKind, FlipAxis,
    PointerSample, Raster, RotateDirection, BRUSH_PALETTE, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE,
};
use tracing::{debug, warn};

const CANVAS_MARGIN: usize = 24;
const HEADER_TOP: usize = 20;
const HEADER_HEIGHT: usize = 56;
const WORKAREA_TOP: usize = 94;
const WORKAREA_BOTTOM_MARGIN: usize = 28;
const SPLIT_GUTTER: usize = 24;
const CONTROL_PANEL_WIDTH: usize = 300;
const CONTROL_INSET: usize = 18;
const STAGE_INSET: usize = 12;
const BUTTON_HEIGHT: usize = 30;
const BUTTON_GAP: usize = 8;
const SLIDER_HEIGHT: usize = 40;
const SWATCH_SIZE: usize = 30;
const SECTION_GAP: usize = 14;
const NOTICE_MS: u64 = 4_000;
const STAGE_COLOR: u32 = 0x101010;
const ACCENT: u32 = 0xF05C4B;
const KEY_HELP: &str = "CTRL+Z/U UNDO  D DRAW  O/LEFT/RIGHT OPEN  ESC QUIT";
const HEX_HELP: &str = "TYPE 6 HEX DIGITS  ENTER APPLY  ESC CANCEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Filter(FilterKind),
    FilterSlider,
    Rotate(RotateDirection),
    Flip(FlipAxis),
    DrawToggle,
    BrushSlider,
    Swatch(usize),
    HexColor,
    Undo,
    Reset,
    Save(ExportFormat),
    Open,
}

impl Control {
    fn is_slider(self) -> bool {
        matches!(self, Self::FilterSlider | Self::BrushSlider)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Filter(FilterKind::Brightness) => "BRIGHTNESS",
            Self::Filter(FilterKind::Saturation) => "SATURATION",
            Self::Filter(FilterKind::Inversion) => "INVERSION",
            Self::Filter(FilterKind::Grayscale) => "GRAYSCALE",
            Self::Rotate(RotateDirection::Left) => "ROTATE L",
            Self::Rotate(RotateDirection::Right) => "ROTATE R",
            Self::Flip(FlipAxis::Horizontal) => "FLIP H",
            Self::Flip(FlipAxis::Vertical) => "FLIP V",
            Self::DrawToggle => "DRAW",
            Self::Undo => "UNDO",
            Self::Reset => "RESET",
            Self::Save(ExportFormat::Jpeg) => "SAVE JPEG",
            Self::Save(ExportFormat::Png) => "SAVE PNG",
            Self::Open => "OPEN",
            Self::FilterSlider | Self::BrushSlider | Self::Swatch(_) | Self::HexColor => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl Rect {
    fn right(&self) -> usize {
        self.left + self.width
    }

    fn bottom(&self) -> usize {
        self.top + self.height
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left as f32
            && y >= self.top as f32
            && x < self.right() as f32
            && y < self.bottom() as f32
    }

    fn display(&self) -> DisplayRect {
        DisplayRect {
            left: self.left as f32,
            top: self.top as f32,
            width: self.width as f32,
            height: self.height as f32,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ControlSpec {
    control: Control,
    rect: Rect,
}

#[derive(Debug, Clone)]
struct Layout {
    controls: Vec<ControlSpec>,
    sections: Vec<(usize, &'static str)>,
}

impl Layout {
    fn control_at(&self, x: f32, y: f32) -> Option<Control> {
        self.controls
            .iter()
            .find(|spec| spec.rect.contains(x, y))
            .map(|spec| spec.control)
    }

    fn rect_of(&self, control: Control) -> Option<Rect> {
        self.controls
            .iter()
            .find(|spec| spec.control == control)
            .map(|spec| spec.rect)
    }
}

#[derive(Debug, Clone, Copy)]
struct SliderRange {
    min: f32,
    max: f32,
}

/// Status line text that clears itself after a while.
struct TimedNotice {
    duration_ms: u64,
    text: Option<String>,
    shown_at_ms: u64,
}

impl TimedNotice {
    fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            text: None,
            shown_at_ms: 0,
        }
    }

    fn show(&mut self, text: impl Into<String>, now_ms: u64) {
        self.text = Some(text.into());
        self.shown_at_ms = now_ms;
    }

    fn current(&self, now_ms: u64) -> Option<&str> {
        let text = self.text.as_deref()?;
        (now_ms.saturating_sub(self.shown_at_ms) < self.duration_ms).then_some(text)
    }
}

/// Files the OPEN button and the arrow keys step through.
struct Candidates {
    files: Vec<CandidateFile>,
    position: Option<usize>,
}

impl Candidates {
    fn new(files: Vec<CandidateFile>) -> Self {
        Self {
            files,
            position: None,
        }
    }

    fn step(&mut self, forward: bool) -> Option<&CandidateFile> {
        let len = self.files.len();
        if len == 0 {
            return None;
        }
        let next = match (self.position, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(current), true) => (current + 1) % len,
            (Some(current), false) => (current + len - 1) % len,
        };
        self.position = Some(next);
        self.files.get(next)
    }

    fn label(&self) -> String {
        match self.position {
            Some(position) => format!("FILE {}/{}", position + 1, self.files.len()),
            None => format!("FILES {}", self.files.len()),
        }
    }
}

/// Brush colour typed as `#rrggbb` while the HEX field has focus.
#[derive(Debug, Default)]
struct HexEntry {
    digits: Option<String>,
}

impl HexEntry {
    fn begin(&mut self) {
        self.digits = Some(String::new());
    }

    fn is_active(&self) -> bool {
        self.digits.is_some()
    }

    fn cancel(&mut self) {
        self.digits = None;
    }

    fn push(&mut self, digit: char) {
        if let Some(digits) = self.digits.as_mut().filter(|digits| digits.len() < 6) {
            digits.push(digit);
        }
    }

    fn backspace(&mut self) {
        if let Some(digits) = self.digits.as_mut() {
            digits.pop();
        }
    }

    /// Closes the entry and parses what was typed.
    fn submit(&mut self) -> Option<Result<BrushColor, DomainError>> {
        let digits = self.digits.take()?;
        Some(format!("#{digits}").parse())
    }

    fn label(&self, current: BrushColor) -> String {
        match &self.digits {
            Some(digits) => format!("HEX #{digits}_"),
            None => format!("HEX {current}").to_uppercase(),
        }
    }
}

pub struct WindowSettings {
    pub width: usize,
    pub height: usize,
}

pub fn launch_window(
    service: &mut EditorService,
    loader: &BackgroundImageLoader,
    files: Vec<CandidateFile>,
    settings: WindowSettings,
) -> Result<(), String> {
    let width = settings.width.max(CONTROL_PANEL_WIDTH * 2);
    let height = settings.height.max(control_layout_bottom() + WORKAREA_BOTTOM_MARGIN);
    let layout = control_layout(width);
    let stage = stage_rect(width, height);
    let container = CanvasSize::new(stage.width as u32, stage.height as u32);

    let mut window = Window::new("retouch", width, height, WindowOptions::default())
        .map_err(|error| format!("failed to start UI window: {error}"))?;
    window.limit_update_rate(Some(Duration::from_micros(16_000)));

    let mut buffer = vec![0x222222_u32; width * height];
    let start = Instant::now();
    let mut notice = TimedNotice::new(NOTICE_MS);
    let mut candidates = Candidates::new(files);
    let mut active_drag: Option<Control> = None;
    let mut was_mouse_down = false;
    let mut hex_entry = HexEntry::default();

    if let Some(file) = candidates.step(true) {
        notice.show(request_open(service, loader, file, container), 0);
    }

    while window.is_open() {
        let now_ms = start.elapsed().as_millis() as u64;
        if window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            if !hex_entry.is_active() {
                break;
            }
            hex_entry.cancel();
        }

        if let Some(message) = poll_loader(service, loader)? {
            notice.show(message, now_ms);
        }

        if hex_entry.is_active() {
            for key in window.get_keys_pressed(KeyRepeat::Yes) {
                if let Some(message) = type_hex_key(service, &mut hex_entry, key) {
                    notice.show(message, now_ms);
                }
            }
        } else {
            let ctrl = window.is_key_down(Key::LeftCtrl) || window.is_key_down(Key::RightCtrl);
            if (ctrl && window.is_key_pressed(Key::Z, KeyRepeat::No))
                || window.is_key_pressed(Key::U, KeyRepeat::No)
            {
                report(&mut notice, now_ms, apply_control(service, Control::Undo));
            }
            if window.is_key_pressed(Key::D, KeyRepeat::No) {
                report(&mut notice, now_ms, apply_control(service, Control::DrawToggle));
            }
            let go_next = window.is_key_pressed(Key::O, KeyRepeat::No)
                || window.is_key_pressed(Key::Right, KeyRepeat::No);
            let go_prev = window.is_key_pressed(Key::Left, KeyRepeat::No);
            if go_next || go_prev {
                open_step(service, loader, &mut candidates, go_next, container, &mut notice, now_ms);
            }
        }

        let mouse_down = window.get_mouse_down(MouseButton::Left);
        let clamped = window.get_mouse_pos(MouseMode::Clamp);
        let inside = window.get_mouse_pos(MouseMode::Discard);
        let pressed = mouse_down && !was_mouse_down;
        let released = !mouse_down && was_mouse_down;
        let canvas_rect = service
            .canvas_size()
            .map(|size| canvas_display_rect(stage, size));

        if pressed {
            if let Some((x, y)) = inside {
                let clicked = layout.control_at(x, y);
                if clicked != Some(Control::HexColor) {
                    hex_entry.cancel();
                }
                match clicked {
                    Some(Control::HexColor) => {
                        hex_entry.begin();
                        notice.show(HEX_HELP, now_ms);
                    }
                    Some(Control::Open) => {
                        open_step(service, loader, &mut candidates, true, container, &mut notice, now_ms);
                    }
                    Some(control) if control.is_slider() => active_drag = Some(control),
                    Some(control) => report(&mut notice, now_ms, apply_control(service, control)),
                    None => {
                        if let Some(rect) = canvas_rect.filter(|rect| rect.contains(x, y)) {
                            send_pointer(service, PointerPhase::Down, x, y, rect, &mut notice, now_ms);
                        }
                    }
                }
            }
        }

        if mouse_down {
            if let (Some(control), Some((x, _))) = (active_drag, clamped) {
                if let Some(rect) = layout.rect_of(control) {
                    drag_slider(service, control, x, rect, &mut notice, now_ms);
                }
            }
            if service.is_stroking() {
                if let Some(rect) = canvas_rect {
                    match inside.filter(|(x, y)| rect.contains(*x, *y)) {
                        Some((x, y)) => {
                            send_pointer(service, PointerPhase::Move, x, y, rect, &mut notice, now_ms)
                        }
                        None => send_pointer(service, PointerPhase::Leave, 0.0, 0.0, rect, &mut notice, now_ms),
                    }
                }
            }
        }

        if released {
            if active_drag == Some(Control::FilterSlider) {
                if let Err(error) = service.commit_filter_adjustment() {
                    notice.show(error.notice(), now_ms);
                }
            }
            active_drag = None;
            if service.is_stroking() {
                if let Some(rect) = canvas_rect {
                    send_pointer(service, PointerPhase::Up, 0.0, 0.0, rect, &mut notice, now_ms);
                }
            }
        }
        was_mouse_down = mouse_down;

        let hovered = inside.and_then(|(x, y)| layout.control_at(x, y));
        draw_background(&mut buffer, width, height);
        draw_header(&mut buffer, width, notice.current(now_ms).unwrap_or(KEY_HELP));
        draw_stage(&mut buffer, width, height, stage, service.canvas(), canvas_rect);
        draw_controls(
            &mut buffer,
            width,
            height,
            &layout,
            service,
            hovered.or(active_drag),
            &candidates.label(),
            &hex_entry,
        );

        window.set_title(&build_window_title(service));
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|error| format!("failed to update UI window: {error}"))?;
    }

    Ok(())
}

fn report(notice: &mut TimedNotice, now_ms: u64, result: Result<Option<String>, ApplicationError>) {
    match result {
        Ok(Some(message)) => notice.show(message, now_ms),
        Ok(None) => {}
        Err(error) => {
            warn!(%error, "editor action failed");
            notice.show(error.notice(), now_ms);
        }
    }
}

fn apply_control(
    service: &mut EditorService,
    control: Control,
) -> Result<Option<String>, ApplicationError> {
    match control {
        Control::Filter(kind) => {
            let slider = service.select_filter(SelectFilterCommand { kind });
            Ok(Some(present_filter_slider(&slider)))
        }
        Control::Rotate(direction) => {
            service.rotate(RotateCommand { direction })?;
            Ok(None)
        }
        Control::Flip(axis) => {
            service.flip(FlipCommand { axis })?;
            Ok(None)
        }
        Control::DrawToggle => {
            let enabled = service.toggle_draw_mode()?;
            let state = if enabled { "on" } else { "off" };
            Ok(Some(format!("draw mode {state}")))
        }
        Control::Swatch(index) => {
            let Some(color) = BRUSH_PALETTE.get(index).copied() else {
                return Ok(None);
            };
            service.set_brush_color(SetBrushColorCommand { color });
            Ok(Some(present_brush(&service.brush())))
        }
        Control::Undo => {
            let undone = service.undo(UndoCommand)?;
            Ok(undone.then(|| present_history(service.history())))
        }
        Control::Reset => {
            service.reset_all(ResetAllCommand)?;
            Ok(None)
        }
        Control::Save(format) => Ok(service
            .export_image(ExportImageCommand { format })?
            .map(|path| present_export(&path))),
        Control::Open | Control::HexColor | Control::FilterSlider | Control::BrushSlider => {
            Ok(None)
        }
    }
}

fn drag_slider(
    service: &mut EditorService,
    control: Control,
    mouse_x: f32,
    rect: Rect,
    notice: &mut TimedNotice,
    now_ms: u64,
) {
    match control {
        Control::FilterSlider => {
            let range = filter_range(service);
            let value = x_to_value(mouse_x, range, rect).round() as i32;
            if i32::from(service.filter_slider().value) == value {
                return;
            }
            if let Err(error) = service.set_filter_value(SetFilterValueCommand { value }) {
                notice.show(error.notice(), now_ms);
            }
        }
        Control::BrushSlider => {
            let size = x_to_value(mouse_x, brush_range(), rect).round() as u32;
            service.set_brush_size(SetBrushSizeCommand { size });
        }
        _ => {}
    }
}

fn send_pointer(
    service: &mut EditorService,
    phase: PointerPhase,
    x: f32,
    y: f32,
    canvas: Rect,
    notice: &mut TimedNotice,
    now_ms: u64,
) {
    let command = PointerCommand {
        phase,
        sample: PointerSample::Mouse { x, y },
        display: canvas.display(),
    };
    if let Err(error) = service.pointer(command) {
        notice.show(error.notice(), now_ms);
    }
}

fn open_step(
    service: &mut EditorService,
    loader: &BackgroundImageLoader,
    candidates: &mut Candidates,
    forward: bool,
    container: CanvasSize,
    notice: &mut TimedNotice,
    now_ms: u64,
) {
    match candidates.step(forward) {
        Some(file) => notice.show(request_open(service, loader, file, container), now_ms),
        None => notice.show("no files to open: pass a file or folder on the command line", now_ms),
    }
}

fn request_open(
    service: &mut EditorService,
    loader: &BackgroundImageLoader,
    file: &CandidateFile,
    container: CanvasSize,
) -> String {
    let ticket = service.begin_load();
    debug!(ticket = ticket.get(), path = %file.path.display(), "open requested");
    match loader.submit(LoadRequest {
        ticket,
        path: file.path.clone(),
        container,
    }) {
        Ok(()) => format!("opening {}", file_label(&file.path)),
        Err(error) => error.notice(),
    }
}

fn poll_loader(
    service: &mut EditorService,
    loader: &BackgroundImageLoader,
) -> Result<Option<String>, String> {
    let Some(loaded) = loader
        .try_receive()
        .map_err(|error| format!("image loader failed: {error}"))?
    else {
        return Ok(None);
    };

    let load = match loaded.result {
        Ok(load) => load,
        Err(error) => return Ok(Some(error.notice())),
    };
    let message = match service.complete_load(CompleteLoadCommand {
        ticket: loaded.ticket,
        load,
    }) {
        Ok(LoadOutcome::Loaded(decoded)) => Some(present_decoded(&decoded)),
        Ok(LoadOutcome::Stale) => None,
        Err(error) => Some(error.notice()),
    };
    Ok(message)
}

fn type_hex_key(service: &mut EditorService, entry: &mut HexEntry, key: Key) -> Option<String> {
    match key {
        Key::Backspace => {
            entry.backspace();
            None
        }
        Key::Enter | Key::NumPadEnter => match entry.submit()? {
            Ok(color) => {
                service.set_brush_color(SetBrushColorCommand { color });
                Some(present_brush(&service.brush()))
            }
            Err(error) => Some(error.to_string()),
        },
        other => {
            if let Some(digit) = hex_digit(other) {
                entry.push(digit);
            }
            None
        }
    }
}

fn hex_digit(key: Key) -> Option<char> {
    let digit = match key {
        Key::Key0 | Key::NumPad0 => '0',
        Key::Key1 | Key::NumPad1 => '1',
        Key::Key2 | Key::NumPad2 => '2',
        Key::Key3 | Key::NumPad3 => '3',
        Key::Key4 | Key::NumPad4 => '4',
        Key::Key5 | Key::NumPad5 => '5',
        Key::Key6 | Key::NumPad6 => '6',
        Key::Key7 | Key::NumPad7 => '7',
        Key::Key8 | Key::NumPad8 => '8',
        Key::Key9 | Key::NumPad9 => '9',
        Key::A => 'a',
        Key::B => 'b',
        Key::C => 'c',
        Key::D => 'd',
        Key::E => 'e',
        Key::F => 'f',
        _ => return None,
    };
    Some(digit)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn filter_range(service: &EditorService) -> SliderRange {
    let descriptor = service.filter_slider().descriptor;
    SliderRange {
        min: f32::from(descriptor.min),
        max: f32::from(descriptor.max),
    }
}

fn brush_range() -> SliderRange {
    SliderRange {
        min: MIN_BRUSH_SIZE as f32,
        max: MAX_BRUSH_SIZE as f32,
    }
}

fn control_layout(width: usize) -> Layout {
    let left = control_panel_left(width) + CONTROL_INSET;
    let inner = control_panel_right(width)
        .saturating_sub(CONTROL_INSET)
        .saturating_sub(left);
    let mut controls = Vec::new();
    let mut sections = Vec::new();
    let mut y = control_panel_top() + CONTROL_INSET;

    let row = |controls: &mut Vec<ControlSpec>, y: &mut usize, items: &[Control], height: usize| {
        let count = items.len().max(1);
        let cell = inner.saturating_sub(BUTTON_GAP * (count - 1)) / count;
        for (index, control) in items.iter().enumerate() {
            controls.push(ControlSpec {
                control: *control,
                rect: Rect {
                    left: left + index * (cell + BUTTON_GAP),
                    top: *y,
                    width: cell,
                    height,
                },
            });
        }
        *y += height + BUTTON_GAP;
    };

    sections.push((y, "FILTERS"));
    y += SECTION_GAP;
    row(
        &mut controls,
        &mut y,
        &[Control::Filter(FilterKind::Brightness), Control::Filter(FilterKind::Saturation)],
        BUTTON_HEIGHT,
    );
    row(
        &mut controls,
        &mut y,
        &[Control::Filter(FilterKind::Inversion), Control::Filter(FilterKind::Grayscale)],
        BUTTON_HEIGHT,
    );
    row(&mut controls, &mut y, &[Control::FilterSlider], SLIDER_HEIGHT);

    sections.push((y, "TRANSFORM"));
    y += SECTION_GAP;
    row(
        &mut controls,
        &mut y,
        &[Control::Rotate(RotateDirection::Left), Control::Rotate(RotateDirection::Right)],
        BUTTON_HEIGHT,
    );
    row(
        &mut controls,
        &mut y,
        &[Control::Flip(FlipAxis::Horizontal), Control::Flip(FlipAxis::Vertical)],
        BUTTON_HEIGHT,
    );

    sections.push((y, "DRAW"));
    y += SECTION_GAP;
    row(&mut controls, &mut y, &[Control::DrawToggle], BUTTON_HEIGHT);
    row(&mut controls, &mut y, &[Control::BrushSlider], SLIDER_HEIGHT);
    let swatches: Vec<Control> = (0..BRUSH_PALETTE.len()).map(Control::Swatch).collect();
    row(&mut controls, &mut y, &swatches, SWATCH_SIZE);
    row(&mut controls, &mut y, &[Control::HexColor], BUTTON_HEIGHT);

    sections.push((y, "IMAGE"));
    y += SECTION_GAP;
    row(&mut controls, &mut y, &[Control::Undo, Control::Reset], BUTTON_HEIGHT);
    row(
        &mut controls,
        &mut y,
        &[Control::Save(ExportFormat::Jpeg), Control::Save(ExportFormat::Png)],
        BUTTON_HEIGHT,
    );
    row(&mut controls, &mut y, &[Control::Open], BUTTON_HEIGHT);

    Layout { controls, sections }
}

fn control_layout_bottom() -> usize {
    control_layout(CONTROL_PANEL_WIDTH * 3)
        .controls
        .iter()
        .map(|spec| spec.rect.bottom())
        .max()
        .unwrap_or(WORKAREA_TOP)
        + CONTROL_INSET
}

fn stage_rect(width: usize, height: usize) -> Rect {
    let left = stage_panel_left() + STAGE_INSET;
    let top = stage_panel_top() + STAGE_INSET;
    Rect {
        left,
        top,
        width: stage_panel_right(width).saturating_sub(left + STAGE_INSET).max(1),
        height: stage_panel_bottom(height).saturating_sub(top + STAGE_INSET).max(1),
    }
}

/// Where the canvas sits on screen: centred in the stage, never larger.
fn canvas_display_rect(stage: Rect, canvas: CanvasSize) -> Rect {
    let width = (canvas.width as usize).min(stage.width);
    let height = (canvas.height as usize).min(stage.height);
    Rect {
        left: stage.left + (stage.width - width) / 2,
        top: stage.top + (stage.height - height) / 2,
        width,
        height,
    }
}

fn draw_background(buffer: &mut [u32], width: usize, height: usize) {
    for y in 0..height {
        let color = lerp_color(0xF7EFE0, 0xF2E1CC, y as f32 / height.max(1) as f32);
        for x in 0..width {
            buffer[y * width + x] = if ((x + y * 2) / 36) % 2 == 0 {
                darken_color(color, 6)
            } else {
                color
            };
        }
    }
}

fn draw_header(buffer: &mut [u32], width: usize, status: &str) {
    let left = CANVAS_MARGIN;
    let band_width = width.saturating_sub(CANVAS_MARGIN * 2);
    fill_rect(buffer, width, left, HEADER_TOP, band_width, HEADER_HEIGHT, 0xFFFDF8);
    draw_rect(buffer, width, left, HEADER_TOP, band_width, HEADER_HEIGHT, 0xCCBBA4);

    let accent_h = HEADER_HEIGHT.saturating_sub(16);
    fill_rect(buffer, width, left + 12, HEADER_TOP + 8, 120, accent_h, ACCENT);
    draw_text(buffer, width, left + 30, HEADER_TOP + 24, "RETOUCH", 0xFFFFFF);
    draw_text(buffer, width, left + 148, HEADER_TOP + 24, status, 0x1B1F26);
}

fn draw_stage(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    stage: Rect,
    canvas: Option<&Raster>,
    canvas_rect: Option<Rect>,
) {
    let panel_left = stage_panel_left();
    let panel_top = stage_panel_top();
    let panel_w = stage_panel_right(width).saturating_sub(panel_left);
    let panel_h = stage_panel_bottom(height).saturating_sub(panel_top);
    fill_rect(buffer, width, panel_left, panel_top, panel_w, panel_h, 0xFBFAF7);
    draw_rect(buffer, width, panel_left, panel_top, panel_w, panel_h, 0xC8B89F);
    fill_rect(buffer, width, stage.left, stage.top, stage.width, stage.height, STAGE_COLOR);

    let (Some(canvas), Some(rect)) = (canvas, canvas_rect) else {
        draw_text(
            buffer,
            width,
            stage.left + 16,
            stage.top + 16,
            "NO IMAGE - PRESS O TO OPEN",
            0x8A8A8A,
        );
        return;
    };

    for y in 0..rect.height {
        for x in 0..rect.width {
            if let Some(pixel) = canvas.pixel(x as u32, y as u32) {
                set_pixel(buffer, width, rect.left + x, rect.top + y, over_stage(pixel));
            }
        }
    }
    draw_rect(
        buffer,
        width,
        rect.left.saturating_sub(1),
        rect.top.saturating_sub(1),
        rect.width + 2,
        rect.height + 2,
        0x2D2D2D,
    );
}

fn over_stage(rgba: [u8; 4]) -> u32 {
    let [red, green, blue, alpha] = rgba.map(u32::from);
    let blend = |channel: u32, shift: u32| {
        let under = (STAGE_COLOR >> shift) & 0xFF;
        (channel * alpha + under * (255 - alpha) + 127) / 255
    };
    (blend(red, 16) << 16) | (blend(green, 8) << 8) | blend(blue, 0)
}

fn draw_controls(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    layout: &Layout,
    service: &EditorService,
    focused: Option<Control>,
    files_label: &str,
    hex_entry: &HexEntry,
) {
    let left = control_panel_left(width);
    let top = control_panel_top();
    let panel_w = control_panel_right(width).saturating_sub(left);
    let panel_h = control_panel_bottom(height).saturating_sub(top);
    fill_rect(buffer, width, left, top, panel_w, panel_h, 0xFBFAF7);
    draw_rect(buffer, width, left, top, panel_w, panel_h, 0xCCBBA4);

    for (y, title) in &layout.sections {
        draw_text(buffer, width, left + CONTROL_INSET, *y + 2, title, 0x6A5B47);
    }
    if let Some(open) = layout.rect_of(Control::Open) {
        draw_text(buffer, width, left + CONTROL_INSET, open.bottom() + 8, files_label, 0x6A5B47);
    }

    let selected = service.filter_slider().descriptor.kind;
    for spec in &layout.controls {
        let rect = spec.rect;
        match spec.control {
            Control::FilterSlider => {
                let slider = service.filter_slider();
                draw_slider(
                    buffer,
                    width,
                    rect,
                    f32::from(slider.value),
                    filter_range(service),
                    &present_filter_slider(&slider).to_uppercase(),
                );
            }
            Control::BrushSlider => {
                let brush = service.brush();
                draw_slider(
                    buffer,
                    width,
                    rect,
                    brush.size as f32,
                    brush_range(),
                    &format!("SIZE {}PX", brush.size),
                );
            }
            Control::Swatch(index) => {
                let Some(color) = BRUSH_PALETTE.get(index) else {
                    continue;
                };
                fill_rect(buffer, width, rect.left, rect.top, rect.width, rect.height, color.to_u32());
                let outline = if service.brush().color == *color { ACCENT } else { 0x8A7A66 };
                draw_rect(buffer, width, rect.left, rect.top, rect.width, rect.height, outline);
            }
            Control::HexColor => {
                let label = hex_entry.label(service.brush().color);
                draw_button(buffer, width, rect, &label, hex_entry.is_active());
            }
            control => {
                let active = match control {
                    Control::Filter(kind) => kind == selected,
                    Control::DrawToggle => service.draw_mode(),
                    _ => false,
                };
                draw_button(buffer, width, rect, control.label(), active);
            }
        }
        if focused == Some(spec.control) {
            draw_rect(
                buffer,
                width,
                rect.left.saturating_sub(2),
                rect.top.saturating_sub(2),
                rect.width + 4,
                rect.height + 4,
                0x5A667A,
            );
        }
    }
}

fn draw_button(buffer: &mut [u32], width: usize, rect: Rect, label: &str, active: bool) {
    let (fill, ink) = if active {
        (0x1A1F29, 0xFFFFFF)
    } else {
        (0xF0E3D0, 0x1B1F26)
    };
    fill_rect(buffer, width, rect.left, rect.top, rect.width, rect.height, fill);
    draw_rect(buffer, width, rect.left, rect.top, rect.width, rect.height, 0xD4C1A6);
    let text_width = label.chars().count() * 8;
    let x = rect.left + rect.width.saturating_sub(text_width) / 2;
    let y = rect.top + rect.height.saturating_sub(8) / 2;
    draw_text(buffer, width, x, y, label, ink);
}

fn draw_slider(
    buffer: &mut [u32],
    width: usize,
    rect: Rect,
    value: f32,
    range: SliderRange,
    label: &str,
) {
    fill_rect(buffer, width, rect.left, rect.top, rect.width, rect.height, 0xFAF6EE);
    draw_rect(buffer, width, rect.left, rect.top, rect.width, rect.height, 0xD8C7AD);
    draw_text(buffer, width, rect.left + 8, rect.top + 5, label, 0x4A3E2E);

    let track_y = rect.top + rect.height - 12;
    let knob_x = value_to_x(value, range, rect);
    fill_rect(buffer, width, rect.left + 8, track_y, rect.width.saturating_sub(16), 4, 0xB8A58D);
    fill_rect(
        buffer,
        width,
        rect.left + 8,
        track_y,
        knob_x.saturating_sub(rect.left + 8),
        4,
        ACCENT,
    );
    fill_rect(buffer, width, knob_x.saturating_sub(5), track_y - 5, 10, 14, ACCENT);
    draw_rect(buffer, width, knob_x.saturating_sub(5), track_y - 5, 10, 14, 0xFFFFFF);
}

fn fill_rect(buffer: &mut [u32], width: usize, left: usize, top: usize, w: usize, h: usize, color: u32) {
    for y in top..top.saturating_add(h) {
        for x in left..left.saturating_add(w) {
            set_pixel(buffer, width, x, y, color);
        }
    }
}

fn draw_rect(buffer: &mut [u32], width: usize, left: usize, top: usize, w: usize, h: usize, color: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let right = left + w - 1;
    let bottom = top + h - 1;
    for x in left..=right {
        set_pixel(buffer, width, x, top, color);
        set_pixel(buffer, width, x, bottom, color);
    }
    for y in top..=bottom {
        set_pixel(buffer, width, left, y, color);
        set_pixel(buffer, width, right, y, color);
    }
}

fn lerp_color(start: u32, end: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let channel = |shift: u32| {
        let from = ((start >> shift) & 0xFF) as f32;
        let to = ((end >> shift) & 0xFF) as f32;
        ((from + (to - from) * t).round() as u32) << shift
    };
    channel(16) | channel(8) | channel(0)
}

fn darken_color(color: u32, amount: u8) -> u32 {
    let channel = |shift: u32| (((color >> shift) & 0xFF).saturating_sub(u32::from(amount))) << shift;
    channel(16) | channel(8) | channel(0)
}

fn stage_panel_left() -> usize {
    CANVAS_MARGIN
}

fn stage_panel_top() -> usize {
    WORKAREA_TOP
}

fn stage_panel_right(width: usize) -> usize {
    width.saturating_sub(CANVAS_MARGIN + CONTROL_PANEL_WIDTH + SPLIT_GUTTER)
}

fn stage_panel_bottom(height: usize) -> usize {
    height.saturating_sub(WORKAREA_BOTTOM_MARGIN)
}

fn control_panel_left(width: usize) -> usize {
    stage_panel_right(width).saturating_add(SPLIT_GUTTER)
}

fn control_panel_right(width: usize) -> usize {
    width.saturating_sub(CANVAS_MARGIN)
}

fn control_panel_top() -> usize {
    WORKAREA_TOP
}

fn control_panel_bottom(height: usize) -> usize {
    height.saturating_sub(WORKAREA_BOTTOM_MARGIN)
}

fn value_to_x(value: f32, range: SliderRange, rect: Rect) -> usize {
    let left = (rect.left + 8) as f32;
    let right = rect.right().saturating_sub(8) as f32;
    let span = (range.max - range.min).max(f32::EPSILON);
    let t = (value.clamp(range.min, range.max) - range.min) / span;
    (left + t * (right - left)).round() as usize
}

fn x_to_value(x: f32, range: SliderRange, rect: Rect) -> f32 {
    let left = (rect.left + 8) as f32;
    let right = rect.right().saturating_sub(8) as f32;
    let t = (x.clamp(left, right) - left) / (right - left).max(1.0);
    range.min + t * (range.max - range.min)
}

fn set_pixel(buffer: &mut [u32], width: usize, x: usize, y: usize, color: u32) {
    let height = buffer.len() / width;
    if x < width && y < height {
        buffer[y * width + x] = color;
    }
}

fn draw_text(buffer: &mut [u32], width: usize, x: usize, y: usize, text: &str, color: u32) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if ch == '\n' {
            continue;
        }
        draw_char(buffer, width, cursor_x, y, ch, color);
        cursor_x = cursor_x.saturating_add(8);
    }
}

fn draw_char(buffer: &mut [u32], width: usize, x: usize, y: usize, ch: char, color: u32) {
    let glyph = font8x8::BASIC_FONTS.get(ch).unwrap_or([0; 8]);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            if (bits >> col) & 1 == 1 {
                set_pixel(buffer, width, x + col, y + row, color);
            }
        }
    }
}

fn build_window_title(service: &EditorService) -> String {
    if !service.has_image() {
        return "retouch | no image | o open | esc quit".to_string();
    }
    let canvas = service
        .canvas_size()
        .map(|size| format!("canvas={}x{}", size.width, size.height))
        .unwrap_or_else(|| "canvas=none".to_string());
    format!(
        "retouch | {} | {} | {} | {} | draw {}",
        canvas,
        present_transform(&service.transform()),
        present_brush(&service.brush()),
        present_history(service.history()),
        if service.draw_mode() { "on" } else { "off" }
    )
}
