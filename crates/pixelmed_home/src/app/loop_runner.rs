use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use nav_engine::{
    CatalogError, EngineConfig, InputBus, InputEvent, InteractionCoordinator, ZoneRegistry,
};
use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::bootstrap::AppWiring;
use super::renderer::{HomeView, Renderer};
use super::router::HomeRouter;

#[derive(Debug, Clone)]
pub(crate) struct HostConfig {
    pub(crate) window_title: String,
    pub(crate) asset_root: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            window_title: "PixelMed Pharmacy".to_string(),
            asset_root: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load zone catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// What the window is showing: the mounted home-screen engine, or any other
/// route with the router parked until the user comes back home.
enum Screen {
    Home(InteractionCoordinator<HomeRouter>),
    Away(HomeRouter),
}

impl Screen {
    fn router(&self) -> &HomeRouter {
        match self {
            Screen::Home(engine) => engine.handler(),
            Screen::Away(router) => router,
        }
    }
}

/// Everything needed to mount a fresh engine instance on the shared bus.
struct HomeMount {
    engine: EngineConfig,
    registry: ZoneRegistry,
    bus: InputBus,
}

impl HomeMount {
    fn mount(&self, router: HomeRouter, now: Instant) -> Screen {
        let context = router.mount_context();
        let engine = InteractionCoordinator::mount(
            &self.engine,
            self.registry.clone(),
            context,
            router,
            &self.bus,
            now,
        );
        if engine.is_active() {
            Screen::Home(engine)
        } else {
            Screen::Away(engine.unmount())
        }
    }

    /// Drains input and runs a due pass; unmounts once a dispatch has taken
    /// the router away from the home route. At most one dispatch fires per call.
    fn settle(&self, screen: Screen, now: Instant) -> Screen {
        match screen {
            Screen::Home(mut engine) => {
                engine.pump(now);
                if engine.handler().is_home() {
                    Screen::Home(engine)
                } else {
                    Screen::Away(engine.unmount())
                }
            }
            away => away,
        }
    }

    fn return_home(&self, screen: Screen, now: Instant) -> Screen {
        match screen {
            Screen::Away(mut router) => {
                if router.go_home() {
                    self.mount(router, now)
                } else {
                    Screen::Away(router)
                }
            }
            home => home,
        }
    }

    fn shutdown(&self, screen: Screen) -> HomeRouter {
        match screen {
            Screen::Home(engine) => engine.unmount(),
            Screen::Away(router) => router,
        }
    }
}

pub(crate) fn run_app(wiring: AppWiring) -> Result<(), AppError> {
    let AppWiring {
        host,
        engine,
        registry,
        router,
    } = wiring;
    let engine = engine.normalized();
    let walkable = engine.walkable;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(window_title(&host.window_title, router.current_route()))
            .with_inner_size(LogicalSize::new(
                walkable.width as f64,
                walkable.height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, walkable, host.asset_root.clone())
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let home = HomeMount {
        engine,
        registry,
        bus: InputBus::new(),
    };
    let mut screen = Some(home.mount(router, Instant::now()));
    let mut cursor_position_px: Option<(f32, f32)> = None;
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        cursor_position_px = Some((position.x as f32, position.y as f32));
                    }
                    WindowEvent::CursorLeft { .. } => {
                        cursor_position_px = None;
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        if let Some(point) =
                            cursor_position_px.and_then(|cursor| renderer.window_to_world(cursor))
                        {
                            home.bus.publish(InputEvent::PointerClick(point));
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed {
                            return;
                        }
                        match event.physical_key {
                            PhysicalKey::Code(KeyCode::Escape) => {
                                info!(reason = "escape_key", "shutdown_requested");
                                window_target.exit();
                            }
                            PhysicalKey::Code(KeyCode::Backspace) => {
                                screen = screen
                                    .take()
                                    .map(|current| home.return_home(current, Instant::now()));
                            }
                            physical_key => {
                                if let Some(name) = key_name(physical_key) {
                                    home.bus.publish(InputEvent::Key(name));
                                }
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let Some(current) = screen.as_ref() else {
                            return;
                        };
                        let view = match current {
                            Screen::Home(engine) => HomeView::from_engine(engine),
                            Screen::Away(_) => HomeView::away(),
                        };
                        if let Err(error) = renderer.render(&view) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        let next_title =
                            window_title(&host.window_title, current.router().current_route());
                        if last_applied_title.as_deref() != Some(next_title.as_str()) {
                            window_for_loop.set_title(&next_title);
                            last_applied_title = Some(next_title);
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                screen = screen
                    .take()
                    .map(|current| home.settle(current, Instant::now()));
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                if let Some(current) = screen.take() {
                    let router = home.shutdown(current);
                    info!(route = %router.current_route(), "shutdown");
                }
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Key name in the form the engine's direction table expects
/// (`ArrowUp`, `KeyW`, ...).
fn key_name(key: PhysicalKey) -> Option<String> {
    match key {
        PhysicalKey::Code(code) => Some(format!("{code:?}")),
        PhysicalKey::Unidentified(_) => None,
    }
}

fn window_title(base: &str, route: &str) -> String {
    format!("{base} - {route}")
}
