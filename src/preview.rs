use crate::{
    core::SurfaceSize,
    model::{ResolvedStyle, Scene},
};

/// Preview-only font scale.
///
/// The editing surface shows text at 0.6x of its design-space size to
/// approximate visual weight at preview scale. Rasterization captures the
/// surface at full design scale, so this factor must never leak into export.
pub const PREVIEW_FONT_SCALE: f64 = 0.6;

/// One element projected onto a display surface as percentages of the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedElement {
    /// Index into the scene's element list (paint order, later = on top).
    pub index: usize,
    pub left_pct: f64,
    pub top_pct: f64,
    /// Percentage width when the element has an explicit size, else intrinsic.
    pub width_pct: Option<f64>,
    pub height_pct: Option<f64>,
    /// Display font size in surface pixels, already scaled by
    /// [`PREVIEW_FONT_SCALE`]. `None` for non-text elements.
    pub font_size_px: Option<f64>,
    pub content: Option<String>,
    pub style: ResolvedStyle,
}

/// A full preview projection of a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewLayout {
    pub surface: SurfaceSize,
    pub items: Vec<PlacedElement>,
}

/// Project a scene onto a display surface of arbitrary pixel size.
///
/// Placement is percentage-of-canvas, so the same scene lays out identically
/// on any surface. Pure and deterministic; out-of-bounds elements keep their
/// out-of-range percentages (the surface clips at paint time, not here).
pub fn layout_preview(scene: &Scene, surface: SurfaceSize) -> PreviewLayout {
    let canvas = scene.canvas();
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);

    let items = scene
        .elements()
        .iter()
        .enumerate()
        .map(|(index, el)| {
            let style = ResolvedStyle::resolve(&el.style);
            // Image elements carry content too but render no text.
            let font_size_px = (el.content.is_some() && el.image_reference().is_none())
                .then(|| style.font_size * PREVIEW_FONT_SCALE);

            PlacedElement {
                index,
                left_pct: el.position.x / cw * 100.0,
                top_pct: el.position.y / ch * 100.0,
                width_pct: el.size.map(|s| s.width / cw * 100.0),
                height_pct: el.size.map(|s| s.height / ch * 100.0),
                font_size_px,
                content: el.content.clone(),
                style,
            }
        })
        .collect();

    PreviewLayout { surface, items }
}
