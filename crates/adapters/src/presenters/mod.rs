use std::path::Path;

use retouch_domain::{
    BrushState, DecodedImage, FilterKind, FilterSlider, FilterState, FlipSign, History,
    TransformState,
};

pub fn present_decoded(decoded: &DecodedImage) -> String {
    format!(
        "loaded {} ({}, {}x{})",
        decoded.file_name, decoded.media_type, decoded.size.width, decoded.size.height
    )
}

pub fn present_filter_slider(slider: &FilterSlider) -> String {
    format!(
        "{}: {}{}",
        slider.descriptor.label, slider.value, slider.descriptor.unit
    )
}

pub fn present_filters(filters: &FilterState) -> String {
    FilterKind::ALL
        .into_iter()
        .map(|kind| format!("{}={}%", kind.name(), filters.get(kind)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn present_transform(transform: &TransformState) -> String {
    format!(
        "rotation={} flip_h={} flip_v={}",
        transform.normalized_degrees(),
        sign(transform.flip_horizontal),
        sign(transform.flip_vertical)
    )
}

pub fn present_brush(brush: &BrushState) -> String {
    format!("brush {}px {}", brush.size, brush.color)
}

pub fn present_history<T>(history: &History<T>) -> String {
    match history.cursor() {
        Some(cursor) => format!(
            "history {}/{} (at {})",
            history.len(),
            history.capacity(),
            cursor + 1
        ),
        None => "history empty".to_string(),
    }
}

pub fn present_export(path: &Path) -> String {
    format!("exported {}", path.display())
}

fn sign(value: FlipSign) -> &'static str {
    match value {
        FlipSign::Positive => "+1",
        FlipSign::Negative => "-1",
    }
}
