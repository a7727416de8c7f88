use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

use super::clock::{FixedStepClock, RenderPacer};
use super::input::InputCollector;
use super::metrics::MetricsWindow;
use super::rendering::{Compositor, Renderer};
use super::scene::SceneLoadError;
use super::{Scene, SceneCommand};

const BACKDROP_COLOR: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Internal frame size. The frame is scaled up to fill the window.
    pub display_width: u32,
    pub display_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// `None` or `Some(0)` renders as fast as the loop turns.
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Platformer".to_string(),
            window_width: 640,
            window_height: 480,
            display_width: 320,
            display_height: 240,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error(transparent)]
    SceneLoad(#[from] SceneLoadError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window, loads `scene` and drives it until it quits or the window
/// closes.
pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.as_str())
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let renderer = Renderer::new(
        Arc::clone(&window),
        config.display_width,
        config.display_height,
    )
    .map_err(AppError::CreateRenderer)?;

    scene.load()?;
    info!(scene = scene.name(), "scene_loaded");

    let mut state = LoopState::new(&config, window, renderer, scene);
    info!(
        target_tps = config.target_tps,
        max_ticks_per_frame = state.clock.max_ticks(),
        render_fps_cap = %state.pacer.cap_label(),
        metrics_interval_ms = state.metrics.length().as_millis() as u64,
        display_width = config.display_width,
        display_height = config.display_height,
        "loop_config"
    );

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(move |event, target| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window.id() => {
                state.on_window_event(event, target);
            }
            Event::AboutToWait => state.window.request_redraw(),
            Event::LoopExiting => {
                state.scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Everything the event loop closure owns.
struct LoopState {
    window: Arc<Window>,
    renderer: Renderer,
    compositor: Compositor,
    scene: Box<dyn Scene>,
    input: InputCollector,
    clock: FixedStepClock,
    pacer: RenderPacer,
    metrics: MetricsWindow,
}

impl LoopState {
    fn new(
        config: &LoopConfig,
        window: Arc<Window>,
        renderer: Renderer,
        scene: Box<dyn Scene>,
    ) -> Self {
        Self {
            window,
            renderer,
            compositor: Compositor::new(config.display_width, config.display_height),
            scene,
            input: InputCollector::default(),
            clock: FixedStepClock::new(
                config.target_tps,
                config.max_frame_delta,
                config.max_ticks_per_frame,
            ),
            pacer: RenderPacer::new(config.max_render_fps),
            metrics: MetricsWindow::new(config.metrics_log_interval, Instant::now()),
        }
    }

    fn on_window_event(&mut self, event: WindowEvent, target: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => {
                info!(reason = "window_close", "shutdown_requested");
                target.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height, target),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height, target);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.handle_key_event(&event);
                if self.input.quit_requested() {
                    info!(reason = "escape_key", "shutdown_requested");
                    target.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if !self.frame() {
                    target.exit();
                }
            }
            _ => {}
        }
    }

    fn resize(&mut self, width: u32, height: u32, target: &EventLoopWindowTarget<()>) {
        if let Err(err) = self.renderer.resize(width, height) {
            error!(error = %err, width, height, "renderer_resize_failed");
            target.exit();
        }
    }

    /// Runs owed ticks, then renders once. Returns `false` when the loop should stop.
    fn frame(&mut self) -> bool {
        let now = Instant::now();
        let steps = self.clock.frame(now);

        let mut ran = 0;
        while ran < steps.ticks {
            ran += 1;
            let input = self.input.next_tick();
            if self.scene.update(&input) == SceneCommand::Quit {
                info!(reason = "scene_command", "shutdown_requested");
                self.metrics.ticks(ran, steps.dropped);
                return false;
            }
        }
        self.metrics.ticks(ran, steps.dropped);
        if !steps.dropped.is_zero() {
            warn!(
                dropped_backlog_ms = steps.dropped.as_millis() as u64,
                max_ticks_per_frame = self.clock.max_ticks(),
                "sim_clamp_triggered"
            );
        }

        let wait = self.pacer.remaining(Instant::now());
        if !wait.is_zero() {
            thread::sleep(wait);
        }

        self.compositor.begin_frame(BACKDROP_COLOR);
        self.scene.render(&mut self.compositor);
        if let Err(err) = self.renderer.present(self.compositor.composite()) {
            error!(error = %err, "renderer_draw_failed");
            return false;
        }
        self.pacer.presented(Instant::now());
        self.metrics.frame(steps.frame_delta);

        if let Some(snapshot) = self.metrics.close_if_due(now) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                dropped_backlog_ms = snapshot.dropped_backlog_ms,
                scene = self.scene.name(),
                "loop_metrics"
            );
        }
        true
    }
}
