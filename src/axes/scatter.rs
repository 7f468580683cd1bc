use kurbo::{Affine, Circle, Line, Point, Stroke};
use peniko::Color;
use polars::prelude::*;

use crate::{axes::points, bounds::DataBounds, render::Render, theme};

pub struct ScatterAxes<'a> {
  x:                  &'a Column,
  y:                  &'a Column,
  pub(crate) options: ScatterOptions,
}

pub struct ScatterOptions {
  pub size:      f64,
  pub color:     Color,
  pub label:     String,
  pub trendline: Option<Trendline>,
}

pub struct Trendline {
  pub kind:  TrendlineKind,
  pub width: f64,
  pub color: Color,
  pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendlineKind {
  /// Ordinary least squares.
  Linear,
}

/// `y = slope * x + intercept`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
  pub slope:     f64,
  pub intercept: f64,
}

impl Default for ScatterOptions {
  fn default() -> Self {
    ScatterOptions { size: 5.0, color: theme::BLUE, label: "data".into(), trendline: None }
  }
}

impl Default for Trendline {
  fn default() -> Self {
    Trendline { kind: TrendlineKind::Linear, width: 3.0, color: theme::RED, label: "fit".into() }
  }
}

impl<'a> ScatterAxes<'a> {
  pub(crate) fn new(x: &'a Column, y: &'a Column) -> Self {
    ScatterAxes { x, y, options: ScatterOptions::default() }
  }

  pub fn color(&mut self, color: Color) -> &mut Self {
    self.options.color = color;
    self
  }

  /// Scales the opacity of the point color.
  pub fn alpha(&mut self, alpha: f32) -> &mut Self {
    self.options.color = self.options.color.multiply_alpha(alpha);
    self
  }

  pub fn label(&mut self, label: &str) -> &mut Self {
    self.options.label = label.to_string();
    self
  }

  pub fn trendline(&mut self, kind: TrendlineKind) -> &mut Self {
    self.options.trendline = Some(Trendline { kind, ..Default::default() });
    self
  }

  pub fn trendline_label(&mut self, label: &str) -> &mut Self {
    if let Some(trendline) = &mut self.options.trendline {
      trendline.label = label.to_string();
    }
    self
  }

  pub fn fit(&self) -> PolarsResult<Option<LinearFit>> {
    Ok(match self.options.trendline.as_ref().map(|t| t.kind) {
      Some(TrendlineKind::Linear) => LinearFit::from_points(&points(self.x, self.y)?),
      None => None,
    })
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
    let points = points(self.x, self.y)?;

    for point in points.iter().map(|p| transform * *p) {
      let dot = Circle::new(point, self.options.size * scale);
      render.fill(&dot, Affine::IDENTITY, self.options.color);
    }

    if let (Some(trendline), Some(fit)) = (&self.options.trendline, self.fit()?) {
      let min = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
      let max = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);

      let line = Line::new(
        transform * Point::new(min, fit.at(min)),
        transform * Point::new(max, fit.at(max)),
      );
      let stroke = Stroke::new(trendline.width * scale);
      render.stroke(&line, Affine::IDENTITY, trendline.color, &stroke);
    }

    Ok(())
  }
}

impl LinearFit {
  /// Least-squares fit. `None` for fewer than two distinct x values.
  pub fn from_points(points: &[Point]) -> Option<LinearFit> {
    if points.len() < 2 {
      return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for p in points {
      covariance += (p.x - mean_x) * (p.y - mean_y);
      variance += (p.x - mean_x).powi(2);
    }
    if variance == 0.0 {
      return None;
    }

    let slope = covariance / variance;
    Some(LinearFit { slope, intercept: mean_y - slope * mean_x })
  }

  pub fn at(&self, x: f64) -> f64 { self.slope * x + self.intercept }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fit_recovers_exact_line() {
    let points: Vec<_> =
      (0..5).map(|i| Point::new(f64::from(i), 2.0 * f64::from(i) + 1.0)).collect();
    let fit = LinearFit::from_points(&points).unwrap();

    assert!((fit.slope - 2.0).abs() < 1e-12);
    assert!((fit.intercept - 1.0).abs() < 1e-12);
    assert!((fit.at(10.0) - 21.0).abs() < 1e-12);
  }

  #[test]
  fn fit_minimizes_squared_error() {
    let points = [Point::new(1.0, 1.0), Point::new(2.0, 3.0), Point::new(3.0, 2.0)];
    let fit = LinearFit::from_points(&points).unwrap();

    assert!((fit.slope - 0.5).abs() < 1e-12);
    assert!((fit.intercept - 1.0).abs() < 1e-12);
  }

  #[test]
  fn fit_needs_spread_in_x() {
    assert_eq!(LinearFit::from_points(&[Point::new(1.0, 1.0)]), None);
    assert_eq!(LinearFit::from_points(&[Point::new(1.0, 1.0), Point::new(1.0, 3.0)]), None);
  }

  #[test]
  fn fit_comes_from_columns() {
    let x = Column::new("guests".into(), &[100i64, 200, 300]);
    let y = Column::new("waste".into(), &[10.0, 20.0, 30.0]);

    let mut plot = crate::Plot::new();
    let scatter = plot.scatter(&x, &y);
    assert_eq!(scatter.fit().unwrap(), None);

    scatter.trendline(TrendlineKind::Linear);
    let fit = scatter.fit().unwrap().unwrap();
    assert!((fit.slope - 0.1).abs() < 1e-12);
  }
}
