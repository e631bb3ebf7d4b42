//! Platform layer: window, event loop and the glue between winit events,
//! a [`SceneHandler`] and the renderer.
//!
//! - Continuous redraw (`ControlFlow::Poll`); every idle pass is a scene tick.
//! - Key presses are translated to [`corelib::Key`] before the handler sees them.
//! - Errors raised inside callbacks stop the loop and are returned from [`run`].

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use asset::mesh::MeshBuffer;
use corelib::{Key, LoopControl, SceneHandler};
use renderer::{GpuState, Material};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key as WinitKey, NamedKey},
    window::{Window, WindowId},
};

/// Window parameters chosen on the command line.
#[derive(Clone, Debug)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub backends: wgpu::Backends,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "objview".to_owned(),
            width: 1280,
            height: 720,
            backends: wgpu::Backends::all(),
        }
    }
}

/// What gets uploaded once the window exists.
pub struct SceneAssets {
    pub mesh: MeshBuffer,
    pub material: Material,
}

/// Open a window and drive `handler` until it asks to exit or the window closes.
pub fn run<H: SceneHandler>(settings: WindowSettings, assets: SceneAssets, handler: H) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        settings,
        assets,
        handler,
        window: None,
        gpu: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App<H> {
    settings: WindowSettings,
    assets: SceneAssets,
    handler: H,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    error: Option<anyhow::Error>,
}

impl<H: SceneHandler> App<H> {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.settings.backends,
            &self.assets.mesh,
            &self.assets.material,
        ))?;
        self.handler.on_reshape(size.width, size.height);

        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let frame = self.handler.frame();
        match gpu.render(&frame) {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface lost/outdated; reconfiguring");
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout; skipping frame");
            }
            Err(e) => self.fail(event_loop, anyhow!("Render error: {e:?}")),
        }
    }
}

impl<H: SceneHandler> ApplicationHandler for App<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized: {}x{}", size.width, size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
                self.handler.on_reshape(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let Some(key) = map_key(&event.logical_key) {
                    if self.handler.on_key(key) == LoopControl::Exit {
                        log::info!("Exit requested by {:?}", key);
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            self.handler.on_tick();
            window.request_redraw();
        }
    }
}

/// Translate a winit logical key; characters are lowercased.
pub fn map_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(NamedKey::Escape) => Some(Key::Escape),
        WinitKey::Named(NamedKey::ArrowUp) => Some(Key::Up),
        WinitKey::Named(NamedKey::ArrowDown) => Some(Key::Down),
        WinitKey::Named(NamedKey::ArrowLeft) => Some(Key::Left),
        WinitKey::Named(NamedKey::ArrowRight) => Some(Key::Right),
        WinitKey::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_lowercase().next().map(Key::Char),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_escape_map_to_named_keys() {
        assert_eq!(map_key(&WinitKey::Named(NamedKey::ArrowUp)), Some(Key::Up));
        assert_eq!(map_key(&WinitKey::Named(NamedKey::ArrowLeft)), Some(Key::Left));
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Escape)), Some(Key::Escape));
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Enter)), None);
    }

    #[test]
    fn characters_are_lowercased() {
        assert_eq!(map_key(&WinitKey::Character("Q".into())), Some(Key::Char('q')));
        assert_eq!(map_key(&WinitKey::Character("2".into())), Some(Key::Char('2')));
        assert_eq!(map_key(&WinitKey::Character("ab".into())), None);
    }

    #[test]
    fn default_settings_are_720p_auto_backend() {
        let s = WindowSettings::default();
        assert_eq!((s.width, s.height), (1280, 720));
        assert_eq!(s.backends, wgpu::Backends::all());
    }
}
