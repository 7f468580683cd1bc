use std::{path::PathBuf, sync::Arc};

use kurbo::Rect;
use vello::wgpu;
use winit::{
  application::ApplicationHandler,
  dpi::{LogicalSize, PhysicalSize},
  event::{ElementState, KeyEvent, WindowEvent},
  event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
  keyboard::{Key, NamedKey},
  window::{Window, WindowId},
};

use crate::{
  Error, Result, ResultExt,
  config::Config,
  dashboard::{self, Dashboard, Effect, Event, State, Tab},
  render::{GpuHandle, Render, RenderConfig},
};

/// Opens the dashboard in a window and blocks until it is closed.
pub fn show(dashboard: &Dashboard, config: &Config) -> Result<()> {
  let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
  event_loop.set_control_flow(ControlFlow::Wait);

  let mut app = App {
    dashboard,
    state: dashboard.initial_state(),
    download_dir: config.download_dir.clone(),
    size: LogicalSize::new(config.window.width, config.window.height),
    stale: true,
    render: Render::new(),
    init: None,
    error: None,
  };
  event_loop.run_app(&mut app).map_err(|e| Error::Window(e.to_string()))?;

  match app.error {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

struct App<'a> {
  dashboard:    &'a Dashboard<'a>,
  state:        State,
  download_dir: PathBuf,
  size:         LogicalSize<u32>,
  stale:        bool,
  render:       Render,

  init:  Option<Init>,
  error: Option<Error>,
}

// Fields drop in order, so the surface goes before the window it draws to.
struct Init {
  surface: wgpu::Surface<'static>,
  config:  wgpu::SurfaceConfiguration,
  handle:  GpuHandle,

  blit:   wgpu::util::TextureBlitter,
  vello:  vello::Renderer,
  window: Arc<Window>,
}

impl App<'_> {
  fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
    log::error!("{err}");
    self.error = Some(err);
    event_loop.exit();
  }

  fn dispatch(&mut self, event: Event) -> Result<()> {
    let (state, effect) = self.dashboard.handle(&self.state, event)?;
    self.state = state;

    match effect {
      Effect::None => {}
      Effect::Redraw => self.stale = true,
      Effect::Download(download) => {
        download.save(&self.download_dir).log_err();
      }
    }
    Ok(())
  }

  fn key_event(&self, key: &Key) -> Option<Event> {
    match key {
      Key::Character(c) => match c.as_str() {
        "1" => Some(Event::SelectTab(Tab::Overview)),
        "2" => Some(Event::SelectTab(Tab::WastageAnalysis)),
        "3" => Some(Event::SelectTab(Tab::AdditionalInsights)),
        "d" if self.state.tab == Tab::AdditionalInsights => Some(Event::Download),
        _ => None,
      },
      Key::Named(NamedKey::Tab) => Some(Event::NextTab),
      Key::Named(NamedKey::ArrowRight) => Some(Event::NextEventType),
      Key::Named(NamedKey::ArrowLeft) => Some(Event::PreviousEventType),
      _ => None,
    }
  }

  fn draw(&mut self) -> Result<()> {
    let Some(init) = &mut self.init else { return Ok(()) };

    if self.stale {
      self.stale = false;

      let (width, height) = (init.config.width, init.config.height);
      let page = self.dashboard.page(&self.state)?;
      self.render.reset();
      dashboard::draw_page(
        &mut self.render,
        &page,
        Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
      )?;

      init
        .vello
        .render_to_texture(
          &init.handle.device,
          &init.handle.queue,
          &self.render.scene,
          &init.handle.view,
          &RenderConfig { width, height }.params(self.render.background),
        )
        .map_err(Error::gpu)?;
    }

    init.present();
    Ok(())
  }
}

impl ApplicationHandler for App<'_> {
  fn resumed(&mut self, event_loop: &ActiveEventLoop) {
    if self.init.is_some() {
      return;
    }

    match Init::new(event_loop, self.size) {
      Ok(init) => {
        log::info!("opened {}x{} window", init.config.width, init.config.height);
        self.init = Some(init);
        self.stale = true;
      }
      Err(e) => self.fail(event_loop, e),
    }
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
    match event {
      WindowEvent::CloseRequested => event_loop.exit(),

      WindowEvent::KeyboardInput {
        event: KeyEvent { logical_key, state: ElementState::Pressed, .. },
        ..
      } => {
        if matches!(&logical_key, Key::Named(NamedKey::Escape))
          || matches!(&logical_key, Key::Character(c) if c == "q")
        {
          event_loop.exit();
          return;
        }

        let Some(event) = self.key_event(&logical_key) else { return };
        log::debug!("{event:?}");
        if let Err(e) = self.dispatch(event) {
          self.fail(event_loop, e);
          return;
        }
        if self.stale {
          if let Some(init) = &self.init {
            init.window.request_redraw();
          }
        }
      }

      WindowEvent::Resized(new_size) => {
        if let Some(init) = &mut self.init {
          if init.resize(new_size) {
            self.stale = true;
            init.window.request_redraw();
          }
        }
      }

      WindowEvent::RedrawRequested => {
        if let Err(e) = self.draw() {
          self.fail(event_loop, e);
        }
      }

      _ => (),
    }
  }
}

impl Init {
  fn new(event_loop: &ActiveEventLoop, size: LogicalSize<u32>) -> Result<Self> {
    let window = event_loop
      .create_window(
        Window::default_attributes()
          .with_title(dashboard::TITLE)
          .with_inner_size(size)
          .with_min_inner_size(LogicalSize::new(400, 300)),
      )
      .map_err(|e| Error::Window(e.to_string()))?;
    let window = Arc::new(window);
    let size = window.inner_size();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let surface = instance.create_surface(window.clone()).map_err(Error::gpu)?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
      compatible_surface: Some(&surface),
      ..Default::default()
    }))
    .map_err(Error::gpu)?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
      .formats
      .iter()
      .copied()
      .find(|f| f.is_srgb())
      .or_else(|| surface_caps.formats.first().copied())
      .ok_or_else(|| Error::Gpu("surface supports no formats".into()))?;
    let alpha_mode = surface_caps.alpha_modes.first().copied().unwrap_or_default();

    let (width, height) = (size.width.max(1), size.height.max(1));
    let handle = GpuHandle::new(&RenderConfig::new(width, height)?, Some(adapter))?;

    let config = wgpu::SurfaceConfiguration {
      usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
      format: surface_format,
      width,
      height,
      present_mode: wgpu::PresentMode::AutoVsync,
      alpha_mode,
      view_formats: vec![],
      desired_maximum_frame_latency: 2,
    };
    surface.configure(&handle.device, &config);

    let vello =
      vello::Renderer::new(&handle.device, vello::RendererOptions::default()).map_err(Error::gpu)?;
    let blit = wgpu::util::TextureBlitter::new(&handle.device, config.format);

    Ok(Init { surface, config, handle, blit, vello, window })
  }

  /// Returns `false` for a zero-sized (minimized) window or one larger than a texture.
  fn resize(&mut self, size: PhysicalSize<u32>) -> bool {
    let Ok(render_config) = RenderConfig::new(size.width, size.height) else {
      return false;
    };

    self.config.width = size.width;
    self.config.height = size.height;
    self.handle.resize(&render_config);
    self.surface.configure(&self.handle.device, &self.config);
    true
  }

  fn present(&mut self) {
    let frame = match self.surface.get_current_texture() {
      Ok(frame) => frame,
      Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
        self.surface.configure(&self.handle.device, &self.config);
        self.window.request_redraw();
        return;
      }
      Err(e) => {
        log::warn!("dropped frame: {e}");
        return;
      }
    };

    let surface_view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = self
      .handle
      .device
      .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Present Encoder") });
    self.blit.copy(&self.handle.device, &mut encoder, &self.handle.view, &surface_view);
    self.handle.queue.submit(std::iter::once(encoder.finish()));

    self.window.pre_present_notify();
    frame.present();
  }
}
