pub mod decode;
pub mod fetch;
pub mod loader;

pub use decode::{LayerImage, decode_image};
pub use fetch::{fetch_bytes, load_template};
pub use loader::{LayerCache, LayerLoader, LayerSlot, LayerSource, LoadEvent, LoadOutcome};
