use std::sync::Arc;

use crate::color::Color;

/// Maximum number of colors remembered by [`RecentColors`].
pub const RECENT_COLORS_CAP: usize = 5;

/// All user-editable state for one composition session.
///
/// Lives for the session only; there is no persistence. Mutations go through
/// [`Composer`](crate::composer::Composer), which redraws after each one.
#[derive(Clone, Debug)]
pub struct EditState {
    pub caption: String,
    pub cta: String,
    pub background_color: Color,
    pub uploaded_image: Option<Arc<Vec<u8>>>,
    pub recent_colors: RecentColors,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            caption: String::new(),
            cta: String::new(),
            background_color: Color::WHITE,
            uploaded_image: None,
            recent_colors: RecentColors::default(),
        }
    }
}

impl EditState {
    /// A pre-filled demo session: stock real-estate caption, "Shop Now"
    /// CTA, blue background, and a full starter palette in the recent
    /// colors. Handy for smoke output and demos; [`Default`] stays blank.
    pub fn sample() -> Self {
        Self {
            caption: "1 & 2 BHK Luxury Apartments at just Rs.34.97 Lakhs".to_string(),
            cta: "Shop Now".to_string(),
            background_color: Color::rgb(0x03, 0x69, 0xa1),
            uploaded_image: None,
            recent_colors: [
                Color::rgb(255, 0, 0),
                Color::rgb(255, 255, 0),
                Color::rgb(0, 0, 255),
                Color::rgb(0, 255, 255),
                Color::rgb(0, 128, 0),
            ]
            .into_iter()
            .collect(),
        }
    }
}

/// Ordered list of recently used colors, capped at [`RECENT_COLORS_CAP`].
///
/// Eviction is FIFO: pushing onto a full list drops the oldest entry, so the
/// list always equals the last `RECENT_COLORS_CAP` pushes in insertion order.
#[derive(Clone, Debug, Default)]
pub struct RecentColors {
    colors: Vec<Color>,
}

impl RecentColors {
    pub fn push(&mut self, color: Color) {
        self.colors.push(color);
        if self.colors.len() > RECENT_COLORS_CAP {
            self.colors.remove(0);
        }
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl FromIterator<Color> for RecentColors {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut out = Self::default();
        for c in iter {
            out.push(c);
        }
        out
    }
}
