use crate::{
    color::Color,
    core::{CanvasSize, Point, Transform2D},
    error::{ArtboardError, ArtboardResult},
};

/// A normalized, resolution-independent description of one design.
///
/// The canvas is fixed at construction; element positions and sizes are in the
/// same design-space units. Element order is paint order: later elements are
/// drawn on top.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    canvas: CanvasSize,
    elements: Vec<Element>,
}

/// A single visual primitive: a positioned text block or image reference.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Element {
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ElementSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub style: ElementStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
}

/// Per-element styling. Every attribute is optional; absence means "use the
/// documented default", applied by [`ResolvedStyle::resolve`] at render time
/// and never written back into the element.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform2D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn svg_value(self) -> &'static str {
        match self {
            Self::Light => "300",
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// An [`ElementStyle`] with every default filled in.
///
/// This is the single place element defaults live. Both the preview renderer
/// and the rasterizing surface consume resolved styles, so a missing attribute
/// and an explicitly-set default always render identically.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStyle {
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub color: Color,
    pub text_align: TextAlign,
    pub background_color: Option<Color>,
    pub border_radius: f64,
    pub padding: f64,
    pub transform: Transform2D,
    pub line_height: f64,
}

impl ResolvedStyle {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

    pub fn resolve(style: &ElementStyle) -> Self {
        Self {
            font_size: style.font_size.unwrap_or(Self::DEFAULT_FONT_SIZE),
            font_weight: style.font_weight.unwrap_or_default(),
            color: style.color.unwrap_or_default(),
            text_align: style.text_align.unwrap_or_default(),
            background_color: style.background_color,
            border_radius: style.border_radius.unwrap_or(0.0),
            padding: style.padding.unwrap_or(0.0),
            transform: style.transform.unwrap_or_default(),
            line_height: style.line_height.unwrap_or(Self::DEFAULT_LINE_HEIGHT),
        }
    }
}

impl Scene {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            elements: Vec::new(),
        }
    }

    pub fn with_elements(canvas: CanvasSize, elements: Vec<Element>) -> ArtboardResult<Self> {
        let scene = Self { canvas, elements };
        scene.validate()?;
        Ok(scene)
    }

    /// Load a persisted scene payload, rejecting malformed data with
    /// [`ArtboardError::InvalidScene`] before it reaches any renderer.
    pub fn from_json(payload: &str) -> ArtboardResult<Self> {
        let scene: Self = serde_json::from_str(payload)
            .map_err(|e| ArtboardError::invalid_scene(format!("malformed scene payload: {e}")))?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json(&self) -> ArtboardResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ArtboardError::invalid_scene(format!("scene not serializable: {e}")))
    }

    pub fn validate(&self) -> ArtboardResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ArtboardError::invalid_scene(
                "canvas width/height must be > 0",
            ));
        }
        for (i, el) in self.elements.iter().enumerate() {
            el.validate()
                .map_err(|e| ArtboardError::invalid_scene(format!("element {i}: {e}")))?;
        }
        Ok(())
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    /// Append an element at the top of the paint order.
    pub fn add_element(&mut self, element: Element) -> ArtboardResult<usize> {
        element.validate()?;
        self.elements.push(element);
        Ok(self.elements.len() - 1)
    }

    pub fn remove_element(&mut self, index: usize) -> ArtboardResult<Element> {
        if index >= self.elements.len() {
            return Err(ArtboardError::invalid_scene(format!(
                "element index {index} out of bounds (len {})",
                self.elements.len()
            )));
        }
        Ok(self.elements.remove(index))
    }

    /// Move an element to a new paint-order position (z-order change).
    pub fn move_element(&mut self, from: usize, to: usize) -> ArtboardResult<()> {
        let len = self.elements.len();
        if from >= len || to >= len {
            return Err(ArtboardError::invalid_scene(format!(
                "move {from} -> {to} out of bounds (len {len})"
            )));
        }
        let el = self.elements.remove(from);
        self.elements.insert(to, el);
        Ok(())
    }
}

impl Element {
    pub fn text(position: Point, content: impl Into<String>) -> Self {
        Self {
            position,
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// The reference part of an `image:` content entry, if this element is an
    /// image rather than a text block.
    pub fn image_reference(&self) -> Option<&str> {
        self.content.as_deref()?.strip_prefix("image:")
    }

    pub fn validate(&self) -> ArtboardResult<()> {
        // Out-of-canvas and negative positions are valid states; only
        // non-finite coordinates are structural errors.
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(ArtboardError::invalid_scene(
                "element position must be finite",
            ));
        }
        if let Some(size) = self.size
            && (!size.width.is_finite()
                || !size.height.is_finite()
                || size.width < 0.0
                || size.height < 0.0)
        {
            return Err(ArtboardError::invalid_scene(
                "element size must be finite and non-negative",
            ));
        }
        if let Some(fs) = self.style.font_size
            && (!fs.is_finite() || fs <= 0.0)
        {
            return Err(ArtboardError::invalid_scene("font_size must be > 0"));
        }
        if let Some(lh) = self.style.line_height
            && (!lh.is_finite() || lh <= 0.0)
        {
            return Err(ArtboardError::invalid_scene("line_height must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> CanvasSize {
        CanvasSize::new(800, 600).unwrap()
    }

    #[test]
    fn json_roundtrip_preserves_elements() {
        let mut scene = Scene::new(canvas());
        scene
            .add_element(Element::text(Point::new(40.0, 50.0), "رحلة إلى دبي"))
            .unwrap();
        let s = scene.to_json().unwrap();
        let de = Scene::from_json(&s).unwrap();
        assert_eq!(de.canvas().width, 800);
        assert_eq!(de.elements().len(), 1);
        assert_eq!(de.elements()[0].content.as_deref(), Some("رحلة إلى دبي"));
    }

    #[test]
    fn from_json_rejects_zero_canvas() {
        let payload = r#"{"canvas":{"width":0,"height":600},"elements":[]}"#;
        let err = Scene::from_json(payload).unwrap_err();
        assert!(matches!(err, ArtboardError::InvalidScene(_)));
    }

    #[test]
    fn from_json_rejects_multibyte_color_string() {
        let payload = r#"{
            "canvas": {"width": 800, "height": 600},
            "elements": [{
                "position": {"x": 0.0, "y": 0.0},
                "content": "hi",
                "style": {"color": "€€"}
            }]
        }"#;
        let err = Scene::from_json(payload).unwrap_err();
        assert!(matches!(err, ArtboardError::InvalidScene(_)));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            Scene::from_json("not json").unwrap_err(),
            ArtboardError::InvalidScene(_)
        ));
    }

    #[test]
    fn negative_and_out_of_bounds_positions_are_valid() {
        let mut scene = Scene::new(canvas());
        scene
            .add_element(Element::text(Point::new(-50.0, 9999.0), "off canvas"))
            .unwrap();
        scene.validate().unwrap();
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let el = Element::text(Point::new(f64::NAN, 0.0), "x");
        assert!(el.validate().is_err());
    }

    #[test]
    fn move_element_changes_paint_order() {
        let mut scene = Scene::new(canvas());
        scene
            .add_element(Element::text(Point::new(0.0, 0.0), "back"))
            .unwrap();
        scene
            .add_element(Element::text(Point::new(0.0, 0.0), "front"))
            .unwrap();
        scene.move_element(0, 1).unwrap();
        assert_eq!(scene.elements()[1].content.as_deref(), Some("back"));
    }

    #[test]
    fn remove_out_of_bounds_fails() {
        let mut scene = Scene::new(canvas());
        assert!(scene.remove_element(0).is_err());
    }

    #[test]
    fn resolved_style_fills_documented_defaults() {
        let r = ResolvedStyle::resolve(&ElementStyle::default());
        assert_eq!(r.font_size, 16.0);
        assert_eq!(r.font_weight, FontWeight::Normal);
        assert_eq!(r.color, Color::BLACK);
        assert_eq!(r.text_align, TextAlign::Left);
        assert_eq!(r.background_color, None);
        assert_eq!(r.border_radius, 0.0);
        assert_eq!(r.padding, 0.0);
        assert!(r.transform.is_identity());
        assert_eq!(r.line_height, 1.2);
    }

    #[test]
    fn absent_attribute_resolves_like_explicit_default() {
        let explicit = ElementStyle {
            color: Some(Color::BLACK),
            line_height: Some(1.2),
            ..ElementStyle::default()
        };
        let absent = ElementStyle::default();
        // Not structurally equal, but identical once resolved.
        assert_ne!(explicit, absent);
        assert_eq!(
            ResolvedStyle::resolve(&explicit),
            ResolvedStyle::resolve(&absent)
        );
    }
}
