#![forbid(unsafe_code)]

pub mod assets;
pub mod color;
pub mod composer;
pub mod core;
pub mod error;
pub mod model;
pub mod render;
pub mod shapes;
pub mod state;
pub mod text;

pub use assets::{LayerCache, LayerImage, LayerLoader, LayerSlot};
pub use color::Color;
pub use composer::Composer;
pub use core::{CanvasSize, Rgba8Premul};
pub use error::{BannercraftError, BannercraftResult};
pub use model::{Template, TextAlign};
pub use render::{FrameRgba, Renderer};
pub use state::{EditState, RecentColors};
pub use text::wrap;
