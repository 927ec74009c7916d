use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;

use crate::error::{BannercraftError, BannercraftResult};

/// Greedily wrap `text` into lines of at most `max_chars_per_line` characters.
///
/// Words are taken in order; a word is appended to the current line (with a
/// single joining space) unless that would push the line past the limit, in
/// which case the line is closed and the word starts the next one. A single
/// word longer than the limit is never split and occupies its own line, so
/// visual overflow is possible with proportional fonts; wrapping is
/// character-count based, not pixel-measured.
///
/// Empty or whitespace-only input yields no lines; nothing is drawn for it.
pub fn wrap(text: &str, max_chars_per_line: usize) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    for word in words {
        if current.chars().count() + 1 + word.chars().count() > max_chars_per_line {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    lines.push(current);
    lines
}

/// RGBA8 brush color carried through Parley glyph runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Parley-backed shaping and measurement for single pre-wrapped lines.
///
/// The engine owns one registered font; wrapping happens by character count
/// before text reaches Parley, so layouts are built without a break width.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
    font_bytes: Arc<Vec<u8>>,
}

impl TextEngine {
    /// Construct an engine around raw TTF/OTF bytes.
    pub fn new(font_bytes: Vec<u8>) -> BannercraftResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let font_bytes = Arc::new(font_bytes);

        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font_bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            BannercraftError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BannercraftError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_bytes,
        })
    }

    /// Raw bytes of the registered font, for handing to the rasterizer.
    pub fn font_bytes(&self) -> Arc<Vec<u8>> {
        self.font_bytes.clone()
    }

    /// Shape one line of text at `size_px`. No line breaking is applied.
    pub fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> BannercraftResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(BannercraftError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text` in pixels at `size_px`.
    pub fn measure_width(&mut self, text: &str, size_px: f32) -> BannercraftResult<f64> {
        Ok(f64::from(self.layout_line(text, size_px, TextBrush::default())?.width()))
    }

    /// CTA line height: 1.2x the advance width of an "M" at `size_px`.
    pub fn line_height(&mut self, size_px: f32) -> BannercraftResult<f64> {
        Ok(self.measure_width("M", size_px)? * 1.2)
    }
}

/// Distance from the top of `layout` to the first line's baseline.
pub fn first_baseline(layout: &parley::Layout<TextBrush>) -> f64 {
    layout
        .lines()
        .next()
        .map(|line| f64::from(line.metrics().baseline))
        .unwrap_or(0.0)
}

/// Locate a usable sans-serif font on this machine.
///
/// Checked in order under the usual font roots; first hit wins. Callers that
/// need a specific face should pass explicit font bytes instead.
pub fn find_system_font() -> BannercraftResult<Vec<u8>> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for candidate in CANDIDATES {
        let path = PathBuf::from(candidate);
        if path.is_file() {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read font '{}'", path.display()))?;
            tracing::debug!(font = %path.display(), "using system font");
            return Ok(bytes);
        }
    }

    Err(BannercraftError::asset(
        "no system sans-serif font found; pass font bytes explicitly",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_greedily_at_character_bound() {
        assert_eq!(wrap("hello world foo", 11), vec!["hello world", "foo"]);
    }

    #[test]
    fn never_splits_an_overlong_word() {
        assert_eq!(wrap("unpronounceable", 5), vec!["unpronounceable"]);
        assert_eq!(
            wrap("a unpronounceable b", 5),
            vec!["a", "unpronounceable", "b"]
        );
    }

    #[test]
    fn exact_fit_stays_on_one_line() {
        // "ab cd" is exactly 5 chars; the limit is inclusive.
        assert_eq!(wrap("ab cd", 5), vec!["ab cd"]);
        assert_eq!(wrap("ab cd", 4), vec!["ab", "cd"]);
    }

    #[test]
    fn empty_and_whitespace_input_yield_no_lines() {
        assert!(wrap("", 10).is_empty());
        assert!(wrap("   \t ", 10).is_empty());
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        assert_eq!(wrap("hello   world", 20), vec!["hello world"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Four two-byte characters plus a space: fits in 9 chars.
        assert_eq!(wrap("éé éé", 5), vec!["éé éé"]);
        assert_eq!(wrap("éé éé", 4), vec!["éé", "éé"]);
    }

    #[test]
    fn engine_measures_and_lays_out_when_a_font_exists() {
        let Ok(bytes) = find_system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let mut engine = TextEngine::new(bytes).unwrap();

        let wide = engine.measure_width("MMMM", 30.0).unwrap();
        let narrow = engine.measure_width("M", 30.0).unwrap();
        assert!(wide > narrow);
        assert!(narrow > 0.0);

        let lh = engine.line_height(30.0).unwrap();
        assert!((lh - narrow * 1.2).abs() < 1e-6);

        let layout = engine
            .layout_line("Shop Now", 30.0, TextBrush::default())
            .unwrap();
        assert!(layout.width() > 0.0);
        assert!(first_baseline(&layout) > 0.0);
    }

    #[test]
    fn engine_rejects_nonpositive_size() {
        let Ok(bytes) = find_system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let mut engine = TextEngine::new(bytes).unwrap();
        assert!(engine.layout_line("x", 0.0, TextBrush::default()).is_err());
    }
}
