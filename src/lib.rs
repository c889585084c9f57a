//! Artboard assembles flat graphic designs (travel ads, logos, CVs, social
//! posts) from positioned elements and exports them as raster files.
//!
//! The crate is built around a resolution-independent [`Scene`]: templates
//! produce scenes, [`layout_preview`] projects a scene onto any display
//! surface as percentages, and [`Exporter`] captures, resamples and encodes a
//! scene surface into a downloadable PNG or JPEG.
#![forbid(unsafe_code)]

pub mod color;
pub mod core;
pub mod error;
pub mod export;
pub mod filters;
pub mod model;
pub mod preview;
pub mod resample;
pub mod surface;
pub mod template;

pub use color::Color;
pub use crate::core::{CanvasSize, SurfaceSize, Transform2D};
pub use error::{ArtboardError, ArtboardResult};
pub use export::{ExportFormat, ExportReport, ExportRequest, ExportStage, Exporter};
pub use filters::{FilterPreset, FilterSettings, PRESETS};
pub use model::{Element, ElementSize, ElementStyle, ResolvedStyle, Scene};
pub use preview::{layout_preview, PlacedElement, PreviewLayout, PREVIEW_FONT_SCALE};
pub use surface::{Background, PixelBuf, RenderTarget, SceneSurface};
pub use template::{Template, TemplateCatalog, TemplateKind, category_icon, category_label};
