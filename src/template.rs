use std::sync::OnceLock;

use crate::{
    color::Color,
    core::{CanvasSize, Point},
    error::{ArtboardError, ArtboardResult},
    model::{Element, ElementSize, ElementStyle, FontWeight, Scene, TextAlign},
};

/// Design domain a template belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Travel,
    Cv,
    Logo,
    Social,
}

/// A named, categorized scene factory.
///
/// Catalog entries are read-only; [`TemplateCatalog::select`] always hands out
/// a deep copy, so mutating a working scene can never bleed into the catalog.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub kind: TemplateKind,
    /// Free-form category. Logos use `text` / `icon` / `combination`; new
    /// categories may appear in data without code changes.
    pub category: String,
    pub palette: Vec<Color>,
    pub canvas: CanvasSize,
    pub elements: Vec<Element>,
}

impl Template {
    pub fn to_scene(&self) -> ArtboardResult<Scene> {
        Scene::with_elements(self.canvas, self.elements.clone())
    }
}

/// Icon name for a template category.
///
/// Unknown categories fall back to a generic icon rather than erroring, so
/// catalog data can grow categories ahead of the code.
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "text" => "type",
        "icon" => "shapes",
        "combination" => "layers",
        "travel" => "plane",
        "cv" => "file-text",
        "social" => "share",
        _ => "layout",
    }
}

/// Human-readable label for a template category, with the same fallback
/// policy as [`category_icon`].
pub fn category_label(category: &str) -> &'static str {
    match category {
        "text" => "Text mark",
        "icon" => "Icon mark",
        "combination" => "Combination mark",
        "travel" => "Travel",
        "cv" => "CV",
        "social" => "Social post",
        _ => "Design",
    }
}

/// Process-wide, read-only set of templates, built once at startup.
#[derive(Debug)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// The builtin catalog. Constructed on first use and shared by every
    /// session; entries are never mutated afterwards.
    pub fn builtin() -> &'static TemplateCatalog {
        static CATALOG: OnceLock<TemplateCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| TemplateCatalog::new(builtin_templates()))
    }

    /// Lazy, restartable listing, optionally filtered by kind.
    pub fn list(&self, kind: Option<TemplateKind>) -> impl Iterator<Item = &Template> + '_ {
        self.templates
            .iter()
            .filter(move |t| kind.is_none_or(|k| t.kind == k))
    }

    /// Listing filtered by category string (logo marks etc.).
    pub fn list_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Template> {
        self.templates.iter().filter(move |t| t.category == category)
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Create a fresh scene from a template (deep copy on select).
    pub fn select(&self, id: &str) -> ArtboardResult<Scene> {
        let template = self
            .get(id)
            .ok_or_else(|| ArtboardError::template_not_found(id))?;
        template.to_scene()
    }
}

fn text_element(
    x: f64,
    y: f64,
    content: &str,
    font_size: f64,
    color: Color,
    weight: FontWeight,
) -> Element {
    Element {
        position: Point::new(x, y),
        size: None,
        content: Some(content.to_string()),
        style: ElementStyle {
            font_size: Some(font_size),
            font_weight: Some(weight),
            color: Some(color),
            ..ElementStyle::default()
        },
    }
}

fn panel(x: f64, y: f64, w: f64, h: f64, color: Color, radius: f64) -> Element {
    Element {
        position: Point::new(x, y),
        size: Some(ElementSize {
            width: w,
            height: h,
        }),
        content: None,
        style: ElementStyle {
            background_color: Some(color),
            border_radius: Some(radius),
            ..ElementStyle::default()
        },
    }
}

fn builtin_templates() -> Vec<Template> {
    let sky = Color::rgb(0x2d, 0x9c, 0xdb);
    let sand = Color::rgb(0xf2, 0xc9, 0x4c);
    let ink = Color::rgb(0x1a, 0x1a, 0x2e);
    let coral = Color::rgb(0xeb, 0x57, 0x57);
    let mint = Color::rgb(0x6f, 0xcf, 0x97);

    vec![
        Template {
            id: "travel-dubai".to_string(),
            name: "Dubai Getaway".to_string(),
            kind: TemplateKind::Travel,
            category: "travel".to_string(),
            palette: vec![sky, sand, Color::WHITE],
            canvas: CanvasSize {
                width: 800,
                height: 1000,
            },
            elements: vec![
                panel(0.0, 0.0, 800.0, 1000.0, sky, 0.0),
                panel(60.0, 620.0, 680.0, 320.0, Color::rgba(255, 255, 255, 230), 24.0),
                text_element(100.0, 680.0, "رحلة إلى دبي", 56.0, ink, FontWeight::Bold),
                text_element(100.0, 770.0, "عروض الصيف تبدأ من 999", 28.0, coral, FontWeight::Normal),
            ],
        },
        Template {
            id: "travel-beach".to_string(),
            name: "Beach Escape".to_string(),
            kind: TemplateKind::Travel,
            category: "travel".to_string(),
            palette: vec![sand, sky, coral],
            canvas: CanvasSize {
                width: 1200,
                height: 628,
            },
            elements: vec![
                panel(0.0, 0.0, 1200.0, 628.0, sand, 0.0),
                text_element(80.0, 200.0, "Escape to the coast", 64.0, ink, FontWeight::Bold),
                text_element(80.0, 300.0, "Seven nights, all inclusive", 30.0, ink, FontWeight::Light),
            ],
        },
        Template {
            id: "cv-classic".to_string(),
            name: "Classic CV".to_string(),
            kind: TemplateKind::Cv,
            category: "cv".to_string(),
            palette: vec![ink, Color::WHITE, mint],
            canvas: CanvasSize {
                width: 794,
                height: 1123,
            },
            elements: vec![
                panel(0.0, 0.0, 794.0, 180.0, ink, 0.0),
                text_element(60.0, 80.0, "Your Name", 44.0, Color::WHITE, FontWeight::Bold),
                text_element(60.0, 135.0, "Product Designer", 22.0, mint, FontWeight::Normal),
                text_element(60.0, 260.0, "Experience", 28.0, ink, FontWeight::Bold),
                text_element(60.0, 620.0, "Education", 28.0, ink, FontWeight::Bold),
            ],
        },
        Template {
            id: "logo-text-mono".to_string(),
            name: "Monogram".to_string(),
            kind: TemplateKind::Logo,
            category: "text".to_string(),
            palette: vec![ink, Color::WHITE],
            canvas: CanvasSize {
                width: 500,
                height: 500,
            },
            elements: vec![Element {
                position: Point::new(250.0, 250.0),
                size: None,
                content: Some("AB".to_string()),
                style: ElementStyle {
                    font_size: Some(160.0),
                    font_weight: Some(FontWeight::Bold),
                    color: Some(ink),
                    text_align: Some(TextAlign::Center),
                    ..ElementStyle::default()
                },
            }],
        },
        Template {
            id: "logo-icon-badge".to_string(),
            name: "Badge".to_string(),
            kind: TemplateKind::Logo,
            category: "icon".to_string(),
            palette: vec![coral, Color::WHITE],
            canvas: CanvasSize {
                width: 500,
                height: 500,
            },
            elements: vec![panel(100.0, 100.0, 300.0, 300.0, coral, 150.0)],
        },
        Template {
            id: "logo-combo-studio".to_string(),
            name: "Studio Mark".to_string(),
            kind: TemplateKind::Logo,
            category: "combination".to_string(),
            palette: vec![mint, ink],
            canvas: CanvasSize {
                width: 600,
                height: 400,
            },
            elements: vec![
                panel(230.0, 60.0, 140.0, 140.0, mint, 28.0),
                Element {
                    position: Point::new(300.0, 290.0),
                    size: None,
                    content: Some("STUDIO".to_string()),
                    style: ElementStyle {
                        font_size: Some(48.0),
                        font_weight: Some(FontWeight::Bold),
                        color: Some(ink),
                        text_align: Some(TextAlign::Center),
                        ..ElementStyle::default()
                    },
                },
            ],
        },
        Template {
            id: "social-quote".to_string(),
            name: "Quote Card".to_string(),
            kind: TemplateKind::Social,
            category: "social".to_string(),
            palette: vec![ink, sand],
            canvas: CanvasSize {
                width: 1080,
                height: 1080,
            },
            elements: vec![
                panel(0.0, 0.0, 1080.0, 1080.0, ink, 0.0),
                Element {
                    position: Point::new(540.0, 500.0),
                    size: None,
                    content: Some("Make something\npeople remember".to_string()),
                    style: ElementStyle {
                        font_size: Some(72.0),
                        font_weight: Some(FontWeight::Bold),
                        color: Some(sand),
                        text_align: Some(TextAlign::Center),
                        line_height: Some(1.3),
                        ..ElementStyle::default()
                    },
                },
            ],
        },
    ]
}
