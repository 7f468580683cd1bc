use kurbo::{Affine, BezPath, Stroke};
use peniko::Color;
use polars::prelude::*;

use crate::{axes::points, bounds::DataBounds, marker::Marker, render::Render, theme};

pub struct LineAxes<'a> {
  x:       &'a Column,
  y:       &'a Column,
  options: LineOptions,
}

pub struct LineOptions {
  pub width:       f64,
  pub color:       Color,
  pub marker:      Option<Marker>,
  pub marker_size: f64,
}

impl Default for LineOptions {
  fn default() -> Self {
    LineOptions { width: 2.5, color: theme::BLUE, marker: None, marker_size: 10.0 }
  }
}

impl<'a> LineAxes<'a> {
  pub(crate) fn new(x: &'a Column, y: &'a Column) -> Self {
    LineAxes { x, y, options: LineOptions::default() }
  }

  pub fn color(&mut self, color: Color) -> &mut Self {
    self.options.color = color;
    self
  }

  pub fn marker(&mut self, marker: Marker) -> &mut Self {
    self.options.marker = Some(marker);
    self
  }

  pub(crate) fn data_bounds(&self) -> PolarsResult<DataBounds> {
    Ok(DataBounds::from_points(&points(self.x, self.y)?))
  }

  pub(crate) fn draw(
    &self,
    render: &mut Render,
    transform: Affine,
    scale: f64,
  ) -> PolarsResult<()> {
    let points: Vec<_> = points(self.x, self.y)?.into_iter().map(|p| transform * p).collect();

    let mut shape = BezPath::new();
    for (i, point) in points.iter().enumerate() {
      if i == 0 {
        shape.move_to(*point);
      } else {
        shape.line_to(*point);
      }
    }
    let stroke = Stroke::new(self.options.width * scale);
    render.stroke(&shape, Affine::IDENTITY, self.options.color, &stroke);

    if let Some(marker) = self.options.marker {
      for point in points {
        let path = marker.place(point, self.options.marker_size * scale);
        render.fill(&path, Affine::IDENTITY, self.options.color);
      }
    }

    Ok(())
  }
}
