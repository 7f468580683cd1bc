use std::collections::HashMap;

use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use polars::prelude::*;

use crate::{
  Range,
  axes::{labels, values},
  bounds::{DataBounds, DataRange},
  marker::Marker,
  render::Render,
  theme::{self, CategoricalPalette},
};

pub struct BoxPlotAxes<'a> {
  categories: &'a Column,
  values:     &'a Column,
  options:    BoxPlotOptions,
}

pub struct BoxPlotOptions {
  /// Box width in category units.
  pub width:   f64,
  pub palette: &'static CategoricalPalette,
}

/// Five-number summary plus the points beyond the whiskers.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxStats {
  pub q1:           f64,
  pub median:       f64,
  pub q3:           f64,
  pub low_whisker:  f64,
  pub high_whisker: f64,
  pub outliers:     Vec<f64>,
}

impl Default for BoxPlotOptions {
  fn default() -> Self { BoxPlotOptions { width: 0.8, palette: &theme::SET3 } }
}

impl<'a> BoxPlotAxes<'a> {
  pub(crate) fn new(categories: &'a Column, values: &'a Column) -> Self {
    BoxPlotAxes { categories, values, options: BoxPlotOptions::default() }
  }

  /// One entry per category, in order of first appearance.
  pub fn groups(&self) -> PolarsResult<Vec<(String, BoxStats)>> {
    let mut order: Vec<(String, Vec<f64>)> = vec![];
    let mut index = HashMap::new();

    for (label, value) in labels(self.categories)?.into_iter().zip(values(self.values)?) {
      let (Some(label), Some(value)) = (label, value) else { continue };

      let i = *index.entry(label.clone()).or_insert_with(|| {
        order.push((label, vec![]));
        order.len() - 1
      });
      order[i].1.push(value);
    }

    Ok(
      order
        .into_iter()
        .filter_map(|(label, values)| Some((label, BoxStats::from_values(values)?)))
        .collect(),
    )
  }

  pub(crate) fn data_bounds(&self) -> PolarsResult<DataBounds> {
    let groups = self.groups()?;

    let mut range = Range::new(f64::INFINITY, f64::NEG_INFINITY);
    for (_, stats) in &groups {
      let (min, max) = stats.extent();
      range = Range::new(range.min.min(min), range.max.max(max));
    }
    if groups.is_empty() {
      range = Range::empty();
    }

    Ok(DataBounds {
      x: DataRange::Categorical(groups.into_iter().map(|(label, _)| label).collect()),
      y: range.into(),
    })
  }

  pub(crate) fn draw(
    &self,
    render: &mut Render,
    transform: Affine,
    scale: f64,
  ) -> PolarsResult<()> {
    let outline = Stroke::new(1.5 * scale);
    let half = self.options.width / 2.0;

    for (i, (_, stats)) in self.groups()?.iter().enumerate() {
      let x = i as f64;

      let body = Rect::from_points(
        transform * Point::new(x - half, stats.q1),
        transform * Point::new(x + half, stats.q3),
      );
      render.fill(&body, Affine::IDENTITY, self.options.palette.sample(i));
      render.stroke(&body, Affine::IDENTITY, theme::TEXT, &outline);

      let cap = half / 2.0;
      let mut lines = BezPath::new();
      for (from, to) in [
        (Point::new(x - half, stats.median), Point::new(x + half, stats.median)),
        (Point::new(x, stats.q3), Point::new(x, stats.high_whisker)),
        (Point::new(x, stats.q1), Point::new(x, stats.low_whisker)),
        (Point::new(x - cap, stats.high_whisker), Point::new(x + cap, stats.high_whisker)),
        (Point::new(x - cap, stats.low_whisker), Point::new(x + cap, stats.low_whisker)),
      ] {
        lines.move_to(transform * from);
        lines.line_to(transform * to);
      }
      render.stroke(&lines, Affine::IDENTITY, theme::TEXT, &outline);

      for &outlier in &stats.outliers {
        let path = Marker::Diamond.place(transform * Point::new(x, outlier), 10.0 * scale);
        render.fill(&path, Affine::IDENTITY, theme::AXIS);
      }
    }

    Ok(())
  }
}

impl BoxStats {
  /// Quartiles use linear interpolation between closest ranks. Whiskers reach
  /// the most extreme values within 1.5 IQR of the box.
  pub fn from_values(mut values: Vec<f64>) -> Option<BoxStats> {
    values.retain(|v| v.is_finite());
    if values.is_empty() {
      return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);

    let reach = 1.5 * (q3 - q1);
    let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

    let inside = values.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
    let low_whisker = inside.clone().fold(q1, f64::min);
    let high_whisker = inside.fold(q3, f64::max);

    let outliers = values.iter().copied().filter(|v| !(lo_fence..=hi_fence).contains(v)).collect();

    Some(BoxStats { q1, median, q3, low_whisker, high_whisker, outliers })
  }

  fn extent(&self) -> (f64, f64) {
    self
      .outliers
      .iter()
      .fold((self.low_whisker, self.high_whisker), |(lo, hi), &v| (lo.min(v), hi.max(v)))
  }
}

/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
  let position = q * (sorted.len() - 1) as f64;
  let lower = position.floor() as usize;
  let upper = position.ceil() as usize;
  let frac = position - lower as f64;

  sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quartiles_interpolate() {
    let stats = BoxStats::from_values(vec![4.0, 1.0, 3.0, 2.0]).unwrap();

    assert_eq!(stats.q1, 1.75);
    assert_eq!(stats.median, 2.5);
    assert_eq!(stats.q3, 3.25);
    assert_eq!((stats.low_whisker, stats.high_whisker), (1.0, 4.0));
    assert!(stats.outliers.is_empty());
  }

  #[test]
  fn far_values_become_outliers() {
    let stats = BoxStats::from_values(vec![10.0, 11.0, 12.0, 13.0, 14.0, 100.0]).unwrap();

    // q1 = 11.25, q3 = 13.75, fences at 7.5 and 17.5
    assert_eq!(stats.outliers, [100.0]);
    assert_eq!(stats.high_whisker, 14.0);
    assert_eq!(stats.low_whisker, 10.0);
  }

  #[test]
  fn single_value_collapses() {
    let stats = BoxStats::from_values(vec![7.0]).unwrap();
    assert_eq!((stats.q1, stats.median, stats.q3), (7.0, 7.0, 7.0));
    assert_eq!(BoxStats::from_values(vec![]), None);
  }

  #[test]
  fn groups_follow_first_appearance() {
    let food = Column::new("food".into(), &["Meat", "Fruits", "Meat", "Fruits", "Dairy"]);
    let waste = Column::new("waste".into(), &[10.0, 1.0, 20.0, 3.0, 5.0]);

    let mut plot = crate::Plot::new();
    let groups = plot.box_plot(&food, &waste).groups().unwrap();

    let names: Vec<_> = groups.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["Meat", "Fruits", "Dairy"]);
    assert_eq!(groups[0].1.median, 15.0);
    assert_eq!(groups[1].1.median, 2.0);

    let bounds = plot.box_plot(&food, &waste).data_bounds().unwrap();
    assert_eq!(bounds.x.categories().unwrap().len(), 3);
    assert_eq!(bounds.y, DataRange::from(Range::new(1.0, 20.0)));
  }
}
