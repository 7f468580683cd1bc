use parley::{Alignment, AlignmentOptions, FontWeight, Layout, PositionedLayoutItem, StyleProperty};
use vello::{
  kurbo::{Affine, Point, Rect, Shape, Stroke, Vec2},
  peniko::{Brush, BrushRef, Color, Fill, Mix},
  wgpu::{self, TextureDescriptor},
};

use crate::{Error, Result};

mod texture;
mod window;

pub use window::show;

pub struct Render {
  pub(crate) scene:      vello::Scene,
  font:                  parley::FontContext,
  layout:                parley::LayoutContext<Brush>,
  pub(crate) background: Color,
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
  #[default]
  Start,
  Center,
  End,
}

#[derive(Clone)]
pub struct DrawText<'a> {
  pub text:             &'a str,
  pub size:             f32,
  pub weight:           FontWeight,
  pub brush:            Brush,
  pub position:         Point,
  /// Applied around `position`, after alignment.
  pub transform:        Affine,
  pub horizontal_align: Align,
  pub vertical_align:   Align,
  pub max_width:        Option<f32>,
}

impl Default for DrawText<'_> {
  fn default() -> Self {
    DrawText {
      text:             "",
      size:             16.0,
      weight:           FontWeight::NORMAL,
      brush:            Brush::Solid(Color::BLACK),
      position:         Point::ZERO,
      transform:        Affine::IDENTITY,
      horizontal_align: Align::Start,
      vertical_align:   Align::Start,
      max_width:        None,
    }
  }
}

impl Default for Render {
  fn default() -> Self { Render::new() }
}

impl Render {
  pub fn new() -> Self {
    Render {
      scene:      vello::Scene::new(),
      font:       parley::FontContext::new(),
      layout:     parley::LayoutContext::new(),
      background: Color::WHITE,
    }
  }

  pub fn reset(&mut self) { self.scene.reset(); }

  pub fn fill<'b>(
    &mut self,
    shape: &impl Shape,
    transform: Affine,
    brush: impl Into<BrushRef<'b>>,
  ) {
    self.scene.fill(Fill::NonZero, transform, brush, None, shape);
  }

  pub fn stroke<'b>(
    &mut self,
    shape: &impl Shape,
    transform: Affine,
    brush: impl Into<BrushRef<'b>>,
    stroke: &Stroke,
  ) {
    self.scene.stroke(stroke, transform, brush, None, shape);
  }

  /// Runs `f` with everything it draws clipped to `rect`.
  pub fn clipped<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Self) -> R) -> R {
    self.scene.push_layer(Mix::Normal, 1.0, Affine::IDENTITY, &rect);
    let result = f(self);
    self.scene.pop_layer();
    result
  }

  pub fn layout_text(&mut self, text: &DrawText) -> Layout<Brush> {
    let mut builder = self.layout.ranged_builder(&mut self.font, text.text, 1.0, true);

    builder.push_default(StyleProperty::FontSize(text.size));
    builder.push_default(StyleProperty::FontWeight(text.weight));
    builder.push_default(StyleProperty::Brush(text.brush.clone()));

    let mut layout = builder.build(text.text);
    layout.break_all_lines(text.max_width);
    layout.align(text.max_width, Alignment::Start, AlignmentOptions::default());
    layout
  }

  pub fn draw_text(&mut self, text: DrawText) {
    let layout = self.layout_text(&text);
    self.draw_text_layout(layout, text);
  }

  pub fn draw_text_layout(&mut self, layout: Layout<Brush>, text: DrawText) {
    let width = f64::from(layout.width());
    let height = f64::from(layout.height());

    let offset = Vec2::new(
      match text.horizontal_align {
        Align::Start => 0.0,
        Align::Center => -width / 2.0,
        Align::End => -width,
      },
      match text.vertical_align {
        Align::Start => 0.0,
        Align::Center => -height / 2.0,
        Align::End => -height,
      },
    );
    let transform =
      Affine::translate(text.position.to_vec2()) * text.transform * Affine::translate(offset);

    for line in layout.lines() {
      for item in line.items() {
        let PositionedLayoutItem::GlyphRun(glyph_run) = item else { continue };

        let run = glyph_run.run();
        let mut x = glyph_run.offset();
        let baseline = glyph_run.baseline();

        self
          .scene
          .draw_glyphs(run.font())
          .brush(&glyph_run.style().brush)
          .hint(false)
          .transform(transform)
          .glyph_transform(
            run.synthesis().skew().map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0)),
          )
          .font_size(run.font_size())
          .normalized_coords(run.normalized_coords())
          .draw(
            Fill::NonZero,
            glyph_run.glyphs().map(|glyph| {
              let gx = x + glyph.x;
              let gy = baseline + glyph.y;
              x += glyph.advance;
              vello::Glyph { id: glyph.id.into(), x: gx, y: gy }
            }),
          );
      }
    }
  }
}

pub(crate) struct GpuHandle {
  pub device:  wgpu::Device,
  pub queue:   wgpu::Queue,
  pub texture: wgpu::Texture,
  pub view:    wgpu::TextureView,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RenderConfig {
  pub width:  u32,
  pub height: u32,
}

impl GpuHandle {
  pub fn new(config: &RenderConfig, adapter: Option<wgpu::Adapter>) -> Result<Self> {
    let adapter = match adapter {
      Some(adapter) => adapter,
      None => {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
          .map_err(Error::gpu)?
      }
    };
    log::debug!("using adapter {:?}", adapter.get_info().name);

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
      label:             None,
      required_features: wgpu::Features::empty(),
      required_limits:   wgpu::Limits::defaults(),
      memory_hints:      wgpu::MemoryHints::MemoryUsage,
      trace:             wgpu::Trace::Off,
    }))
    .map_err(Error::gpu)?;

    let (texture, view) = create_texture(&device, config);
    Ok(GpuHandle { device, queue, texture, view })
  }

  pub fn resize(&mut self, config: &RenderConfig) {
    let (texture, view) = create_texture(&self.device, config);
    self.texture = texture;
    self.view = view;
  }
}

fn create_texture(
  device: &wgpu::Device,
  config: &RenderConfig,
) -> (wgpu::Texture, wgpu::TextureView) {
  let texture = device.create_texture(&TextureDescriptor {
    label:           Some("Render Texture"),
    size:            config.extent_3d(),
    mip_level_count: 1,
    sample_count:    1,
    dimension:       wgpu::TextureDimension::D2,
    format:          wgpu::TextureFormat::Rgba8Unorm,
    usage:           wgpu::TextureUsages::STORAGE_BINDING
      | wgpu::TextureUsages::TEXTURE_BINDING
      | wgpu::TextureUsages::COPY_SRC,
    view_formats:    &[],
  });
  let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
  (texture, view)
}

impl RenderConfig {
  /// Rejects sizes the device cannot hold as a texture.
  pub(crate) fn new(width: u32, height: u32) -> Result<Self> {
    let max = wgpu::Limits::defaults().max_texture_dimension_2d;
    if !(1..=max).contains(&width) || !(1..=max).contains(&height) {
      return Err(Error::CanvasSize { width, height, max });
    }
    Ok(RenderConfig { width, height })
  }

  fn extent_3d(&self) -> wgpu::Extent3d {
    wgpu::Extent3d {
      width:                 self.width,
      height:                self.height,
      depth_or_array_layers: 1,
    }
  }

  fn params(&self, background: Color) -> vello::RenderParams {
    vello::RenderParams {
      base_color:          background,
      width:               self.width,
      height:              self.height,
      antialiasing_method: vello::AaConfig::Msaa16,
    }
  }
}

/// Draws a scene with `draw` and returns it encoded as PNG. The canvas passed
/// to `draw` may be slightly wider than requested.
pub(crate) fn render_png(
  width: u32,
  height: u32,
  draw: impl FnOnce(&mut Render, Rect) -> Result<()>,
) -> Result<Vec<u8>> {
  let config = RenderConfig::new(width, height)?;
  // Texture readback rows must be 256-byte aligned.
  let config = RenderConfig { width: width.next_multiple_of(64), ..config };
  let handle = GpuHandle::new(&config, None)?;

  let mut render = Render::new();
  draw(&mut render, Rect::new(0.0, 0.0, f64::from(config.width), f64::from(config.height)))?;

  let mut renderer =
    vello::Renderer::new(&handle.device, vello::RendererOptions::default()).map_err(Error::gpu)?;
  renderer
    .render_to_texture(
      &handle.device,
      &handle.queue,
      &render.scene,
      &handle.view,
      &config.params(render.background),
    )
    .map_err(Error::gpu)?;

  texture::read_png(&handle, config)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn canvas_size_is_checked_before_the_device() {
    let max = wgpu::Limits::defaults().max_texture_dimension_2d;
    assert!(RenderConfig::new(1024, 768).is_ok());
    assert!(RenderConfig::new(max, max).is_ok());

    for (width, height) in [(0, 768), (1024, 0), (max + 1, 768), (1024, u32::MAX)] {
      let err = RenderConfig::new(width, height).unwrap_err();
      assert!(matches!(err, Error::CanvasSize { max: m, .. } if m == max));
    }
    assert!(matches!(render_png(0, 0, |_, _| Ok(())), Err(Error::CanvasSize { .. })));
  }
}
