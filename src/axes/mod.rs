mod box_plot;
mod line;
mod pie;
mod scatter;

pub use box_plot::{BoxPlotAxes, BoxStats};
pub use line::LineAxes;
pub use pie::{PieAxes, PieSlice};
pub use scatter::{LinearFit, ScatterAxes, Trendline, TrendlineKind};

use kurbo::{Affine, Point};
use polars::prelude::*;

use crate::{Plot, bounds::DataBounds, render::Render};

pub enum Axes<'a> {
  Scatter(ScatterAxes<'a>),
  Line(LineAxes<'a>),
  BoxPlot(BoxPlotAxes<'a>),
  Pie(PieAxes<'a>),
}

impl<'a> Plot<'a> {
  pub fn scatter(&mut self, x: &'a Column, y: &'a Column) -> &mut ScatterAxes<'a> {
    self.axes.push(Axes::Scatter(ScatterAxes::new(x, y)));
    match self.axes.last_mut().unwrap() {
      Axes::Scatter(sa) => sa,
      _ => unreachable!(),
    }
  }

  pub fn line(&mut self, x: &'a Column, y: &'a Column) -> &mut LineAxes<'a> {
    self.axes.push(Axes::Line(LineAxes::new(x, y)));
    match self.axes.last_mut().unwrap() {
      Axes::Line(la) => la,
      _ => unreachable!(),
    }
  }

  pub fn box_plot(&mut self, categories: &'a Column, values: &'a Column) -> &mut BoxPlotAxes<'a> {
    self.axes.push(Axes::BoxPlot(BoxPlotAxes::new(categories, values)));
    match self.axes.last_mut().unwrap() {
      Axes::BoxPlot(ba) => ba,
      _ => unreachable!(),
    }
  }

  pub fn pie(&mut self, labels: &'a Column, values: &'a Column) -> &mut PieAxes<'a> {
    self.axes.push(Axes::Pie(PieAxes::new(labels, values)));
    match self.axes.last_mut().unwrap() {
      Axes::Pie(pa) => pa,
      _ => unreachable!(),
    }
  }
}

impl Axes<'_> {
  /// Pie charts have no x/y extent; they are drawn into the whole plot area.
  pub(crate) fn data_bounds(&self) -> PolarsResult<Option<DataBounds>> {
    Ok(match self {
      Axes::Scatter(sa) => Some(sa.data_bounds()?),
      Axes::Line(la) => Some(la.data_bounds()?),
      Axes::BoxPlot(ba) => Some(ba.data_bounds()?),
      Axes::Pie(_) => None,
    })
  }

  pub(crate) fn draw(
    &self,
    render: &mut Render,
    transform: Affine,
    scale: f64,
  ) -> PolarsResult<()> {
    match self {
      Axes::Scatter(sa) => sa.draw(render, transform, scale),
      Axes::Line(la) => la.draw(render, transform, scale),
      Axes::BoxPlot(ba) => ba.draw(render, transform, scale),
      Axes::Pie(_) => Ok(()),
    }
  }
}

/// Pairs up two numeric columns, skipping rows where either side is null.
pub(crate) fn points(x: &Column, y: &Column) -> PolarsResult<Vec<Point>> {
  let x = x.strict_cast(&DataType::Float64)?;
  let y = y.strict_cast(&DataType::Float64)?;

  Ok(
    x.f64()?
      .into_iter()
      .zip(y.f64()?.into_iter())
      .filter_map(|(x, y)| Some(Point::new(x?, y?)))
      .collect(),
  )
}

pub(crate) fn labels(column: &Column) -> PolarsResult<Vec<Option<String>>> {
  let column = column.cast(&DataType::String)?;
  Ok(column.str()?.into_iter().map(|s| s.map(str::to_string)).collect())
}

pub(crate) fn values(column: &Column) -> PolarsResult<Vec<Option<f64>>> {
  let column = column.strict_cast(&DataType::Float64)?;
  Ok(column.f64()?.into_iter().collect())
}
