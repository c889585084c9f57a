use crate::error::{ArtboardError, ArtboardResult};

pub use kurbo::{Affine, Point, Vec2};

/// Design-space canvas dimensions.
///
/// These are resolution-independent units: every element position and size in
/// a scene is expressed against this box, never against output pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> ArtboardResult<Self> {
        if width == 0 || height == 0 {
            return Err(ArtboardError::invalid_scene(
                "canvas width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }
}

/// Pixel dimensions of a display or output surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> ArtboardResult<Self> {
        if width == 0 || height == 0 {
            return Err(ArtboardError::invalid_scene(
                "surface width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }
}

/// Element-local 2D transform (translate, rotate, scale).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    pub translate: Vec2,
    pub rotation_deg: f64,
    pub scale: Vec2, // default (1,1)
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_deg: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2D {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translate)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rejects_zero_dimensions() {
        assert!(CanvasSize::new(0, 100).is_err());
        assert!(CanvasSize::new(100, 0).is_err());
        assert!(CanvasSize::new(800, 600).is_ok());
    }

    #[test]
    fn default_transform_is_identity() {
        let t = Transform2D::default();
        assert!(t.is_identity());
        let a = t.to_affine().as_coeffs();
        assert_eq!(a, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn transform_applies_translate() {
        let t = Transform2D {
            translate: Vec2::new(10.0, -5.0),
            ..Transform2D::default()
        };
        let p = t.to_affine() * Point::new(0.0, 0.0);
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y + 5.0).abs() < 1e-9);
    }
}
