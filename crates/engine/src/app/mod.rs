mod clock;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    Compositor, Layer, Renderer, Surface, TilemapPainter, MASK_ALPHA_THRESHOLD, SILHOUETTE_COLOR,
    TRANSITION_SPAN,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneLoadError};
