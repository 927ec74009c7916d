use crate::{
    color::Color,
    core::Rect,
    error::{BannercraftError, BannercraftResult},
};

/// Default CTA font size in pixels when the template omits `font_size`.
pub const CTA_FONT_SIZE_DEFAULT: f64 = 30.0;
/// Default CTA wrap length in characters when the template omits `wrap_length`.
pub const CTA_WRAP_LENGTH_DEFAULT: usize = 20;

/// A creative template descriptor, fetched once and never mutated.
///
/// Shape matches the template JSON served alongside each design: layer image
/// sources, caption and CTA styling, and the rectangle an uploaded image is
/// fitted into.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Template {
    pub urls: LayerUrls,
    pub caption: CaptionStyle,
    pub cta: CtaStyle,
    pub image_mask: MaskRect,
}

/// Image sources for the three template layers, named by their role.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayerUrls {
    pub mask: String,
    pub stroke: String,
    pub design_pattern: String,
}

impl LayerUrls {
    /// Sources in compositing order: mask below stroke below design pattern.
    pub fn in_draw_order(&self) -> [&str; 3] {
        [&self.mask, &self.stroke, &self.design_pattern]
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CaptionStyle {
    pub font_size: f64,
    pub text_color: Color,
    pub alignment: TextAlign,
    pub max_characters_per_line: usize,
    pub position: Position,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CtaStyle {
    #[serde(default = "default_cta_font_size")]
    pub font_size: f64,
    pub text_color: Color,
    pub background_color: Color,
    #[serde(default = "default_cta_wrap_length")]
    pub wrap_length: usize,
    pub position: Position,
}

fn default_cta_font_size() -> f64 {
    CTA_FONT_SIZE_DEFAULT
}

fn default_cta_wrap_length() -> usize {
    CTA_WRAP_LENGTH_DEFAULT
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Destination rectangle for the uploaded image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaskRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MaskRect {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl Template {
    pub fn validate(&self) -> BannercraftResult<()> {
        for (role, source) in [
            ("mask", &self.urls.mask),
            ("stroke", &self.urls.stroke),
            ("design_pattern", &self.urls.design_pattern),
        ] {
            if source.trim().is_empty() {
                return Err(BannercraftError::validation(format!(
                    "layer url '{role}' must be non-empty"
                )));
            }
        }

        if !self.caption.font_size.is_finite() || self.caption.font_size <= 0.0 {
            return Err(BannercraftError::validation(
                "caption font_size must be finite and > 0",
            ));
        }
        if self.caption.max_characters_per_line == 0 {
            return Err(BannercraftError::validation(
                "caption max_characters_per_line must be > 0",
            ));
        }

        if !self.cta.font_size.is_finite() || self.cta.font_size <= 0.0 {
            return Err(BannercraftError::validation(
                "cta font_size must be finite and > 0",
            ));
        }
        if self.cta.wrap_length == 0 {
            return Err(BannercraftError::validation("cta wrap_length must be > 0"));
        }

        if self.image_mask.width < 0.0 || self.image_mask.height < 0.0 {
            return Err(BannercraftError::validation(
                "image_mask width/height must be >= 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_json() -> serde_json::Value {
        serde_json::json!({
            "urls": {
                "mask": "layers/mask.png",
                "stroke": "layers/stroke.png",
                "design_pattern": "layers/pattern.png"
            },
            "caption": {
                "font_size": 44,
                "text_color": "#ffffff",
                "alignment": "left",
                "max_characters_per_line": 31,
                "position": { "x": 50, "y": 50 }
            },
            "cta": {
                "text_color": "#ffffff",
                "background_color": "#000000",
                "position": { "x": 190, "y": 320 }
            },
            "image_mask": { "x": 56, "y": 442, "width": 970, "height": 600 }
        })
    }

    fn basic_template() -> Template {
        serde_json::from_value(template_json()).unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let t = basic_template();
        let s = serde_json::to_string_pretty(&t).unwrap();
        let de: Template = serde_json::from_str(&s).unwrap();
        assert_eq!(de.caption.max_characters_per_line, 31);
        assert_eq!(de.urls.in_draw_order()[2], "layers/pattern.png");
    }

    #[test]
    fn omitted_cta_fields_take_documented_defaults() {
        let t = basic_template();
        assert_eq!(t.cta.font_size, CTA_FONT_SIZE_DEFAULT);
        assert_eq!(t.cta.wrap_length, CTA_WRAP_LENGTH_DEFAULT);
    }

    #[test]
    fn explicit_cta_fields_override_defaults() {
        let mut v = template_json();
        v["cta"]["font_size"] = serde_json::json!(48);
        v["cta"]["wrap_length"] = serde_json::json!(12);
        let t: Template = serde_json::from_value(v).unwrap();
        assert_eq!(t.cta.font_size, 48.0);
        assert_eq!(t.cta.wrap_length, 12);
    }

    #[test]
    fn validate_rejects_empty_layer_url() {
        let mut t = basic_template();
        t.urls.stroke = "  ".to_string();
        assert!(t.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        let mut t = basic_template();
        t.caption.font_size = 0.0;
        assert!(t.validate().is_err());

        let mut t = basic_template();
        t.cta.wrap_length = 0;
        assert!(t.validate().is_err());

        let mut t = basic_template();
        t.image_mask.height = -1.0;
        assert!(t.validate().is_err());
    }

    #[test]
    fn mask_rect_converts_to_kurbo() {
        let m = MaskRect {
            x: 56.0,
            y: 442.0,
            width: 970.0,
            height: 600.0,
        };
        let r = m.to_rect();
        assert_eq!((r.x0, r.y0, r.x1, r.y1), (56.0, 442.0, 1026.0, 1042.0));
    }
}
