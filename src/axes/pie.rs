use kurbo::{Affine, BezPath, Point, Rect, Stroke, Vec2};
use parley::FontWeight;
use peniko::{Brush, Color};
use polars::prelude::*;

use crate::{
  axes::{labels, values},
  render::{Align, DrawText, Render},
  theme::{self, CategoricalPalette},
};

pub struct PieAxes<'a> {
  labels:  &'a Column,
  values:  &'a Column,
  options: PieOptions,
}

pub struct PieOptions {
  /// Degrees, counter-clockwise from the positive x axis.
  pub start_angle: f64,
  pub palette:     &'static CategoricalPalette,
}

/// One wedge. Angles are in degrees, counter-clockwise from the positive x
/// axis.
#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
  pub label:       String,
  pub value:       f64,
  pub fraction:    f64,
  pub start_angle: f64,
  pub sweep_angle: f64,
}

impl Default for PieOptions {
  fn default() -> Self { PieOptions { start_angle: 0.0, palette: &theme::TAB10 } }
}

impl<'a> PieAxes<'a> {
  pub(crate) fn new(labels: &'a Column, values: &'a Column) -> Self {
    PieAxes { labels, values, options: PieOptions::default() }
  }

  pub fn start_angle(&mut self, degrees: f64) -> &mut Self {
    self.options.start_angle = degrees;
    self
  }

  /// Rows with a missing label or value, or a non-positive value, get no wedge.
  pub fn slices(&self) -> PolarsResult<Vec<PieSlice>> {
    let entries: Vec<(String, f64)> = labels(self.labels)?
      .into_iter()
      .zip(values(self.values)?)
      .filter_map(|(label, value)| Some((label?, value?)))
      .filter(|(_, value)| *value > 0.0)
      .collect();

    let total: f64 = entries.iter().map(|(_, v)| v).sum();

    let mut angle = self.options.start_angle;
    Ok(
      entries
        .into_iter()
        .map(|(label, value)| {
          let fraction = value / total;
          let slice = PieSlice {
            label,
            value,
            fraction,
            start_angle: angle,
            sweep_angle: fraction * 360.0,
          };
          angle += slice.sweep_angle;
          slice
        })
        .collect(),
    )
  }

  pub(crate) fn draw(&self, render: &mut Render, area: Rect, scale: f64) -> PolarsResult<()> {
    let center = area.center();
    let radius = area.width().min(area.height()) / 2.0 * 0.7;
    let text = Brush::Solid(theme::TEXT);

    let slices = self.slices()?;
    for (i, slice) in slices.iter().enumerate() {
      render.fill(&slice.wedge(center, radius), Affine::IDENTITY, self.options.palette.sample(i));
      render.stroke(
        &slice.wedge(center, radius),
        Affine::IDENTITY,
        Color::WHITE,
        &Stroke::new(2.0 * scale),
      );
    }

    for slice in &slices {
      let direction = slice.mid_direction();

      render.draw_text(DrawText {
        text: &slice.percent_label(),
        size: (18.0 * scale) as f32,
        weight: FontWeight::BOLD,
        brush: text.clone(),
        position: center + direction * radius * 0.6,
        horizontal_align: Align::Center,
        vertical_align: Align::Center,
        ..Default::default()
      });

      render.draw_text(DrawText {
        text: &slice.label,
        size: (20.0 * scale) as f32,
        brush: text.clone(),
        position: center + direction * radius * 1.1,
        horizontal_align: match direction.x {
          x if x > 0.2 => Align::Start,
          x if x < -0.2 => Align::End,
          _ => Align::Center,
        },
        vertical_align: Align::Center,
        ..Default::default()
      });
    }

    Ok(())
  }
}

impl PieSlice {
  pub fn percent_label(&self) -> String { format!("{:.1}%", self.fraction * 100.0) }

  /// Unit vector through the middle of the wedge, in screen space (y down).
  fn mid_direction(&self) -> Vec2 { screen_direction(self.start_angle + self.sweep_angle / 2.0) }

  fn wedge(&self, center: Point, radius: f64) -> BezPath {
    let steps = (self.sweep_angle / 2.0).ceil().max(1.0) as usize;

    let mut path = BezPath::new();
    path.move_to(center);
    for step in 0..=steps {
      let angle = self.start_angle + self.sweep_angle * step as f64 / steps as f64;
      path.line_to(center + screen_direction(angle) * radius);
    }
    path.close_path();
    path
  }
}

fn screen_direction(degrees: f64) -> Vec2 {
  let radians = degrees.to_radians();
  Vec2::new(radians.cos(), -radians.sin())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fractions_follow_values() {
    let labels = Column::new("food".into(), &["A", "B"]);
    let values = Column::new("waste".into(), &[50.0, 30.0]);

    let mut plot = crate::Plot::new();
    let slices = plot.pie(&labels, &values).start_angle(90.0).slices().unwrap();

    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].percent_label(), "62.5%");
    assert_eq!(slices[1].percent_label(), "37.5%");
    assert_eq!(slices[0].start_angle, 90.0);
    assert_eq!(slices[1].start_angle, 90.0 + 225.0);
    assert_eq!(slices.iter().map(|s| s.sweep_angle).sum::<f64>(), 360.0);
  }

  #[test]
  fn empty_and_zero_values_are_skipped() {
    let labels = Column::new("food".into(), &[Some("A"), None, Some("C")]);
    let values = Column::new("waste".into(), &[0.0, 5.0, 5.0]);

    let mut plot = crate::Plot::new();
    let slices = plot.pie(&labels, &values).slices().unwrap();

    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].label, "C");
    assert_eq!(slices[0].fraction, 1.0);
  }

  #[test]
  fn wedges_start_at_the_top() {
    let slice = PieSlice {
      label:       "A".into(),
      value:       1.0,
      fraction:    0.25,
      start_angle: 90.0,
      sweep_angle: 90.0,
    };
    let path = slice.wedge(Point::new(0.0, 0.0), 10.0);
    let bbox = kurbo::Shape::bounding_box(&path);

    // Top-left quadrant in screen space.
    assert!((bbox.x0 + 10.0).abs() < 1e-9);
    assert!((bbox.y0 + 10.0).abs() < 1e-9);
    assert!(bbox.x1.abs() < 1e-9);
    assert!(bbox.y1.abs() < 1e-9);
  }
}
