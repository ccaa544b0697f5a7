use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use glam::UVec2;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use binviz::cli::Cli;
use binviz::config::ViewerConfig;
use binviz::core::{BuiltinShaders, ByteBuffer, FrameStats, RenderBackend, SurfaceRenderer, Visualizer, WinitController};
use binviz::gui::{ControlPanel, Gui, Status};
use binviz::loaders;

// === Constants ===

const WINDOW_TITLE: &str = "BinViz";
const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;
const FPS_UPDATE_INTERVAL: f32 = 1.0;

// === Viewer ===

/// Everything that only exists once the OS window does
struct Viewer {
    window: Arc<Window>,
    renderer: SurfaceRenderer,
    gui: Option<Gui>,
    panel: ControlPanel,
    visualizer: Visualizer,
    input: WinitController,
}

impl Viewer {
    fn new(window: Arc<Window>, config: &ViewerConfig, buffer: ByteBuffer) -> Result<Self> {
        let renderer = pollster::block_on(SurfaceRenderer::new(window.clone(), &BuiltinShaders))?;

        let mut visualizer = config.build(buffer, renderer.surface_size());
        visualizer.set_size_limit(renderer.max_texture_dimension());

        let gui = config
            .show_ui
            .then(|| Gui::new(&window, renderer.gpu().device(), renderer.format()));
        let panel = ControlPanel::new(&visualizer);

        let size = visualizer.window_size();
        log::info!("Viewer ready: {}x{} window at offset 0x{:X}", size.x, size.y, visualizer.offset());

        Ok(Self {
            window,
            renderer,
            gui,
            panel,
            visualizer,
            input: WinitController::new(),
        })
    }

    fn redraw(&mut self, status: &Status) -> FrameStats {
        let Viewer {
            window,
            renderer,
            gui,
            panel,
            visualizer,
            input,
        } = self;

        visualizer.consume_input(input);
        if let Some(gui) = gui.as_mut() {
            gui.run(window, |ctx| panel.show(ctx, visualizer, status));
        }

        visualizer.begin_frame();
        visualizer.draw(renderer);
        let stats = visualizer.end_frame();

        if let Err(e) = renderer.render_frame(window, gui.as_mut()) {
            log::error!("Render error: {}", e);
        }
        stats
    }
}

// === Application ===

struct App {
    config: ViewerConfig,
    buffer: Option<ByteBuffer>,
    viewer: Option<Viewer>,
    last_frame_time: Instant,
    frame_count: u32,
    fps_update_timer: f32,
    status: Status,
}

impl App {
    fn new(config: ViewerConfig, buffer: ByteBuffer) -> Self {
        Self {
            config,
            buffer: Some(buffer),
            viewer: None,
            last_frame_time: Instant::now(),
            frame_count: 0,
            fps_update_timer: 0.0,
            status: Status::default(),
        }
    }

    fn update_fps(&mut self, delta: f32) {
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            self.status.fps = self.frame_count as f32 / self.fps_update_timer;
            log::debug!("FPS: {:.1}", self.status.fps);
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        let Some(buffer) = self.buffer.take() else {
            return;
        };

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(WINDOW_TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match Viewer::new(window, &self.config, buffer) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };

        // Let egui see the event first; whatever it claims never reaches the camera
        let consumed = viewer
            .gui
            .as_mut()
            .is_some_and(|gui| gui.on_window_event(&viewer.window, &event));
        let ui_pointer = viewer.gui.as_ref().is_some_and(|gui| gui.wants_pointer_input());
        let ui_keyboard = viewer.gui.as_ref().is_some_and(|gui| gui.wants_keyboard_input());
        viewer.input.process_event(&event, consumed || ui_pointer);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } if !ui_keyboard => match key {
                KeyCode::PageUp => {
                    viewer.visualizer.page(-1);
                }
                KeyCode::PageDown => {
                    viewer.visualizer.page(1);
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                viewer.renderer.resize(size.width, size.height);
                viewer.visualizer.set_viewport(UVec2::new(size.width, size.height));
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta = now.duration_since(self.last_frame_time).as_secs_f32();
                self.last_frame_time = now;
                self.update_fps(delta);

                if let Some(viewer) = self.viewer.as_mut() {
                    self.status.last_frame = viewer.redraw(&self.status);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            viewer.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => loaders::load_config(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_cli(&cli);

    let buffer = loaders::load_binary(&cli.file)?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, buffer);

    log::info!("BinViz - drag to pan, scroll to zoom, PgUp/PgDown to page, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
