use std::path::Path;

use kurbo::{Affine, Cap, Line, Point, Rect, Stroke};
use parley::FontWeight;
use peniko::Brush;
use polars::prelude::*;

use crate::{
  Error, Result,
  axes::Axes,
  bounds::{Bounds, DataBounds, Range},
  render::{self, Align, DrawText, Render},
  theme,
};

#[derive(Default)]
pub struct Plot<'a> {
  title:           Option<String>,
  pub x:           Axis,
  pub y:           Axis,
  pub(crate) axes: Vec<Axes<'a>>,
}

#[derive(Clone, Default)]
pub struct Axis {
  title:         Option<String>,
  tick_rotation: f64,
}

impl Axis {
  pub fn title(&mut self, title: &str) -> &mut Self {
    self.title = Some(title.to_string());
    self
  }

  /// Rotates tick labels counter-clockwise by `degrees`.
  pub fn rotate_ticks(&mut self, degrees: f64) -> &mut Self {
    self.tick_rotation = degrees;
    self
  }
}

impl<'a> Plot<'a> {
  pub fn new() -> Plot<'a> { Plot::default() }

  pub fn title(&mut self, title: &str) -> &mut Self {
    self.title = Some(title.to_string());
    self
  }

  pub fn axes(&self) -> &[Axes<'a>] { &self.axes }

  pub fn render_png(&self, width: u32, height: u32) -> Result<Vec<u8>> {
    render::render_png(width, height, |render, canvas| Ok(self.draw(render, canvas)?))
  }

  pub fn save(&self, path: impl AsRef<Path>, width: u32, height: u32) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, self.render_png(width, height)?).map_err(Error::io(path))?;
    log::info!("wrote {}", path.display());
    Ok(())
  }

  /// Merged extent of all non-pie axes, or `None` if there are none.
  pub fn data_bounds(&self) -> PolarsResult<Option<DataBounds>> {
    let mut merged: Option<DataBounds> = None;
    for ax in &self.axes {
      if let Some(bounds) = ax.data_bounds()? {
        merged = Some(match merged {
          Some(m) => m.union(bounds),
          None => bounds,
        });
      }
    }
    Ok(merged)
  }

  /// Draws the plot into `frame`, in screen coordinates.
  pub fn draw(&self, render: &mut Render, frame: Rect) -> PolarsResult<()> {
    let scale = (frame.width().min(frame.height()) / 1000.0).clamp(0.6, 2.0);
    let size = |s: f64| (s * scale) as f32;
    let text = Brush::Solid(theme::TEXT);

    let mut top = frame.y0 + 20.0 * scale;
    if let Some(title) = &self.title {
      render.draw_text(DrawText {
        text: title,
        size: size(30.0),
        weight: FontWeight::BOLD,
        brush: text.clone(),
        position: Point::new(frame.center().x, top),
        horizontal_align: Align::Center,
        max_width: Some(frame.width() as f32),
        ..Default::default()
      });
      top += 55.0 * scale;
    }

    let Some(data_bounds) = self.data_bounds()? else {
      let area = Rect::new(frame.x0, top, frame.x1, frame.y1);
      for ax in &self.axes {
        if let Axes::Pie(pie) = ax {
          pie.draw(render, area, scale)?;
        }
      }
      return Ok(());
    };

    let bottom = if self.x.tick_rotation != 0.0 { 170.0 } else { 100.0 };
    let area = Rect::new(
      frame.x0 + 130.0 * scale,
      top + 10.0 * scale,
      frame.x1 - 30.0 * scale,
      frame.y1 - bottom * scale,
    );
    let viewport = Bounds::new(Range::new(area.x0, area.x1), Range::new(area.y1, area.y0));

    let x_range = data_bounds.x.resolve();
    let y_range = data_bounds.y.resolve();
    let transform = Bounds::new(x_range, y_range).transform_to(viewport);

    if let Some(x_title) = &self.x.title {
      render.draw_text(DrawText {
        text: x_title,
        size: size(22.0),
        position: Point::new(area.center().x, frame.y1 - 15.0 * scale),
        brush: text.clone(),
        horizontal_align: Align::Center,
        vertical_align: Align::End,
        ..Default::default()
      });
    }

    if let Some(y_title) = &self.y.title {
      render.draw_text(DrawText {
        text: y_title,
        size: size(22.0),
        position: Point::new(frame.x0 + 15.0 * scale, area.center().y),
        brush: text.clone(),
        transform: Affine::rotate(-std::f64::consts::FRAC_PI_2),
        horizontal_align: Align::Center,
        vertical_align: Align::Start,
        ..Default::default()
      });
    }

    let border = Stroke::new(2.0 * scale);
    let tick = border.clone().with_start_cap(Cap::Butt);
    let grid = Stroke::new(1.0 * scale);

    let iter = y_range.nice_ticks(10);
    let decimals = iter.decimals();
    for (y, vy) in iter
      .map(|v| (v, (transform * Point::new(0.0, v)).y))
      .filter(|(_, vy)| viewport.y.contains(vy))
    {
      render.stroke(
        &Line::new(Point::new(area.x0, vy), Point::new(area.x1, vy)),
        Affine::IDENTITY,
        theme::GRID,
        &grid,
      );
      render.stroke(
        &Line::new(Point::new(area.x0, vy), Point::new(area.x0 - 10.0 * scale, vy)),
        Affine::IDENTITY,
        theme::AXIS,
        &tick,
      );
      render.draw_text(DrawText {
        text: &format!("{y:.decimals$}"),
        size: size(16.0),
        position: Point::new(area.x0 - 15.0 * scale, vy),
        brush: text.clone(),
        horizontal_align: Align::End,
        vertical_align: Align::Center,
        ..Default::default()
      });
    }

    let x_ticks: Vec<(f64, String)> = match data_bounds.x.categories() {
      Some(labels) => labels.iter().enumerate().map(|(i, l)| (i as f64, l.clone())).collect(),
      None => {
        let iter = x_range.nice_ticks(10);
        let decimals = iter.decimals();
        iter.map(|v| (v, format!("{v:.decimals$}"))).collect()
      }
    };
    for (x, label) in x_ticks {
      let vx = (transform * Point::new(x, 0.0)).x;
      if !viewport.x.contains(&vx) {
        continue;
      }

      render.stroke(
        &Line::new(Point::new(vx, area.y1), Point::new(vx, area.y1 + 10.0 * scale)),
        Affine::IDENTITY,
        theme::AXIS,
        &tick,
      );

      let rotated = self.x.tick_rotation != 0.0;
      render.draw_text(DrawText {
        text: &label,
        size: size(16.0),
        position: Point::new(vx, area.y1 + 15.0 * scale),
        brush: text.clone(),
        transform: Affine::rotate(-self.x.tick_rotation.to_radians()),
        horizontal_align: if rotated { Align::End } else { Align::Center },
        vertical_align: if rotated { Align::Center } else { Align::Start },
        ..Default::default()
      });
    }

    render.stroke(
      &Line::new(Point::new(area.x0, area.y1), Point::new(area.x1, area.y1)),
      Affine::IDENTITY,
      theme::AXIS,
      &border,
    );
    render.stroke(
      &Line::new(Point::new(area.x0, area.y1), Point::new(area.x0, area.y0)),
      Affine::IDENTITY,
      theme::AXIS,
      &border,
    );

    render.clipped(area, |render| {
      self.axes.iter().try_for_each(|ax| ax.draw(render, transform, scale))
    })?;

    self.draw_legend(render, area, scale);

    Ok(())
  }
}
