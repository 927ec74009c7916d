use crate::error::{BannercraftError, BannercraftResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Logical canvas size in pixels, independent of any display scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        // Creative templates are authored against a 1080x1080 surface.
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> BannercraftResult<Self> {
        if width == 0 || height == 0 {
            return Err(BannercraftError::validation(
                "canvas width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_size_defaults_to_square_1080() {
        let c = CanvasSize::default();
        assert_eq!((c.width, c.height), (1080, 1080));
        assert_eq!(c.to_rect(), Rect::new(0.0, 0.0, 1080.0, 1080.0));
    }

    #[test]
    fn canvas_size_rejects_zero_extent() {
        assert!(CanvasSize::new(0, 1080).is_err());
        assert!(CanvasSize::new(1080, 0).is_err());
        assert!(CanvasSize::new(64, 64).is_ok());
    }

    #[test]
    fn premul_is_exact_at_alpha_extremes() {
        let opaque = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);
        assert_eq!((opaque.r, opaque.g, opaque.b, opaque.a), (10, 20, 30, 255));

        let clear = Rgba8Premul::from_straight_rgba(10, 20, 30, 0);
        assert_eq!((clear.r, clear.g, clear.b, clear.a), (0, 0, 0, 0));
    }
}
