mod compositor;
mod renderer;
mod surface;
mod tiles;

pub use compositor::{Compositor, Layer, SILHOUETTE_COLOR, TRANSITION_SPAN};
pub use renderer::Renderer;
pub use surface::{Surface, MASK_ALPHA_THRESHOLD};
pub use tiles::TilemapPainter;
