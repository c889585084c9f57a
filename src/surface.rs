use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use anyhow::Context as _;
use base64::Engine as _;

use crate::{
    core::SurfaceSize,
    error::{ArtboardError, ArtboardResult},
    filters::FilterSettings,
    model::{Element, ResolvedStyle, Scene, TextAlign},
};

/// Straight-alpha RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuf {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuf {
    pub fn into_rgba_image(self) -> ArtboardResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| ArtboardError::encoding("pixel buffer length mismatch"))
    }
}

/// Capture background, decided by the export format before capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Background {
    /// Alpha-capable formats (PNG) capture over transparency.
    Transparent,
    /// Opaque formats (JPEG) force a white backdrop.
    White,
}

/// A live, already-laid-out surface the exporter can capture.
///
/// `size` is the nominal capture size in pixels; `scale` is the oversampling
/// factor, so the returned buffer is `(size.width * scale, size.height * scale)`.
pub trait RenderTarget {
    fn capture(
        &self,
        size: SurfaceSize,
        scale: u32,
        background: Background,
    ) -> ArtboardResult<PixelBuf>;
}

/// CPU capture surface for a scene.
///
/// The scene is composed into an SVG document (element image references are
/// inlined as data URIs so they can never silently drop out of the capture)
/// and rasterized with resvg into a pixmap.
pub struct SceneSurface<'a> {
    scene: &'a Scene,
    filters: FilterSettings,
}

impl<'a> SceneSurface<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            filters: FilterSettings::default(),
        }
    }

    pub fn with_filters(scene: &'a Scene, filters: FilterSettings) -> Self {
        Self { scene, filters }
    }

    /// The SVG document this surface rasterizes. Exposed for tests and
    /// diagnostics; the markup is in design-space coordinates.
    pub fn compose_svg(&self) -> ArtboardResult<String> {
        compose_svg(self.scene)
    }
}

impl RenderTarget for SceneSurface<'_> {
    #[tracing::instrument(skip(self), fields(elements = self.scene.elements().len()))]
    fn capture(
        &self,
        size: SurfaceSize,
        scale: u32,
        background: Background,
    ) -> ArtboardResult<PixelBuf> {
        let (out_w, out_h) = capture_dims(size, scale)?;

        let svg = compose_svg(self.scene)?;
        let opts = usvg::Options {
            fontdb: shared_fontdb(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
            .map_err(|e| ArtboardError::encoding(format!("scene markup did not parse: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(out_w, out_h)
            .ok_or_else(|| ArtboardError::encoding("failed to allocate capture pixmap"))?;
        if background == Background::White {
            pixmap.fill(resvg::tiny_skia::Color::WHITE);
        }

        let canvas = self.scene.canvas();
        let sx = out_w as f32 / canvas.width as f32;
        let sy = out_h as f32 / canvas.height as f32;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(sx, sy),
            &mut pixmap.as_mut(),
        );

        let mut data = Vec::with_capacity((out_w * out_h * 4) as usize);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        let mut buf = PixelBuf {
            width: out_w,
            height: out_h,
            data,
        };
        self.filters.apply(&mut buf);
        Ok(buf)
    }
}

fn capture_dims(size: SurfaceSize, scale: u32) -> ArtboardResult<(u32, u32)> {
    // Matches the svg raster guard: very large captures need an explicit
    // strategy change, not a silent multi-gigabyte allocation.
    const MAX_DIM: u32 = 16_384;

    if scale == 0 {
        return Err(ArtboardError::encoding("capture scale must be > 0"));
    }
    let w = size.width.saturating_mul(scale);
    let h = size.height.saturating_mul(scale);
    if w == 0 || h == 0 {
        return Err(ArtboardError::encoding("capture size must be > 0"));
    }
    if w > MAX_DIM || h > MAX_DIM {
        return Err(ArtboardError::encoding(format!(
            "capture size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

fn shared_fontdb() -> Arc<usvg::fontdb::Database> {
    static DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    })
    .clone()
}

fn compose_svg(scene: &Scene) -> ArtboardResult<String> {
    let canvas = scene.canvas();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = canvas.width,
        h = canvas.height
    );

    for el in scene.elements() {
        write_element(&mut out, el)?;
    }

    let _ = writeln!(out, "</svg>");
    Ok(out)
}

fn write_element(out: &mut String, el: &Element) -> ArtboardResult<()> {
    let style = ResolvedStyle::resolve(&el.style);

    // Group per element: position plus the optional local transform. Content
    // below is drawn in element-local coordinates.
    let [a, b, c, d, e, f] = (kurbo::Affine::translate(el.position.to_vec2())
        * style.transform.to_affine())
    .as_coeffs();
    let _ = writeln!(
        out,
        "<g transform=\"matrix({a:.4} {b:.4} {c:.4} {d:.4} {e:.4} {f:.4})\">"
    );

    if let (Some(bg), Some(size)) = (style.background_color, el.size) {
        let _ = writeln!(
            out,
            "  <rect x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" fill=\"{}\" fill-opacity=\"{:.4}\" />",
            size.width,
            size.height,
            style.border_radius,
            bg.to_hex_rgb(),
            bg.opacity()
        );
    }

    if let Some(reference) = el.image_reference() {
        write_image(out, el, reference)?;
    } else if let Some(content) = el.content.as_deref()
        && !content.is_empty()
    {
        write_text(out, el, &style, content);
    }

    let _ = writeln!(out, "</g>");
    Ok(())
}

fn write_text(out: &mut String, el: &Element, style: &ResolvedStyle, content: &str) {
    let pad = style.padding;
    let (x, anchor) = match (style.text_align, el.size) {
        (TextAlign::Left, _) => (pad, "start"),
        (TextAlign::Center, Some(size)) => (size.width / 2.0, "middle"),
        (TextAlign::Center, None) => (0.0, "middle"),
        (TextAlign::Right, Some(size)) => (size.width - pad, "end"),
        (TextAlign::Right, None) => (0.0, "end"),
    };

    // First baseline sits one font-size below the padded top edge; subsequent
    // lines advance by line-height.
    let baseline = pad + style.font_size;
    let line_advance = style.line_height * style.font_size;

    let _ = writeln!(
        out,
        "  <text x=\"{x:.2}\" y=\"{baseline:.2}\" font-size=\"{fs:.2}\" font-weight=\"{fw}\" fill=\"{fill}\" fill-opacity=\"{fo:.4}\" text-anchor=\"{anchor}\" font-family=\"sans-serif\">",
        fs = style.font_size,
        fw = style.font_weight.svg_value(),
        fill = style.color.to_hex_rgb(),
        fo = style.color.opacity(),
    );
    for (i, line) in content.lines().enumerate() {
        let dy = if i == 0 { 0.0 } else { line_advance };
        let _ = writeln!(
            out,
            "    <tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        );
    }
    let _ = writeln!(out, "  </text>");
}

fn write_image(out: &mut String, el: &Element, reference: &str) -> ArtboardResult<()> {
    let (href, bytes) = resolve_image(reference)?;

    // An <image> without explicit dimensions renders as nothing, so intrinsic
    // sizing must be read out of the encoded bytes here.
    let (width, height) = match el.size {
        Some(size) => (size.width, size.height),
        None => {
            let (w, h) = image::ImageReader::new(std::io::Cursor::new(&bytes))
                .with_guessed_format()
                .map_err(|e| ArtboardError::encoding(format!("probe image '{reference}': {e}")))?
                .into_dimensions()
                .map_err(|e| ArtboardError::encoding(format!("decode image '{reference}': {e}")))?;
            (f64::from(w), f64::from(h))
        }
    };

    let _ = writeln!(
        out,
        "  <image x=\"0\" y=\"0\" width=\"{width:.2}\" height=\"{height:.2}\" href=\"{href}\" />"
    );
    Ok(())
}

/// Resolve an image reference to a data URI plus its raw bytes.
///
/// User-supplied images are embedded into the markup rather than referenced,
/// so a missing fetch can never yield a silently blank capture: resolution
/// failures surface here, before any raster work.
fn resolve_image(reference: &str) -> ArtboardResult<(String, Vec<u8>)> {
    if let Some(rest) = reference.strip_prefix("data:") {
        let payload = rest
            .split_once(";base64,")
            .map(|(_, p)| p)
            .ok_or_else(|| ArtboardError::encoding("image data uri must be base64-encoded"))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ArtboardError::encoding(format!("image data uri: {e}")))?;
        return Ok((reference.to_string(), bytes));
    }

    let bytes = std::fs::read(reference)
        .with_context(|| format!("read image '{reference}'"))
        .map_err(ArtboardError::from)?;
    let mime = match reference.rsplit('.').next().map(str::to_ascii_lowercase) {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "webp" => "image/webp",
        _ => "image/png",
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok((format!("data:{mime};base64,{encoded}"), bytes))
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}
