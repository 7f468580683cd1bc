use kurbo::{Affine, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  pub x: Range,
  pub y: Range,
}

/// The extent of some data along both plot dimensions, before margins and
/// axis overrides are applied.
#[derive(Clone, Debug, PartialEq)]
pub struct DataBounds {
  pub x: DataRange,
  pub y: DataRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DataRange {
  Continuous { range: Range, margin_min: bool, margin_max: bool },
  /// Category `i` sits at `x = i`.
  Categorical(Vec<String>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
  pub min: f64,
  pub max: f64,
}

impl From<Range> for DataRange {
  fn from(range: Range) -> Self {
    DataRange::Continuous { range, margin_min: true, margin_max: true }
  }
}

impl Bounds {
  pub const fn new(x: Range, y: Range) -> Self { Bounds { x, y } }

  pub(crate) fn transform_to(&self, viewport: Bounds) -> Affine {
    let scale_x = viewport.x.size() / self.x.size();
    let scale_y = viewport.y.size() / self.y.size();
    let translate_x = viewport.x.min - self.x.min * scale_x;
    let translate_y = viewport.y.min - self.y.min * scale_y;

    Affine::new([scale_x, 0.0, 0.0, scale_y, translate_x, translate_y])
  }
}

impl DataBounds {
  pub(crate) fn from_points(points: &[Point]) -> DataBounds {
    let mut x = Range::new(f64::INFINITY, f64::NEG_INFINITY);
    let mut y = Range::new(f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
      x = x.include(p.x);
      y = y.include(p.y);
    }
    if points.is_empty() {
      x = Range::empty();
      y = Range::empty();
    }

    DataBounds { x: x.into(), y: y.into() }
  }

  pub(crate) fn union(self, other: DataBounds) -> DataBounds {
    DataBounds { x: self.x.union(other.x), y: self.y.union(other.y) }
  }
}

impl Default for Range {
  fn default() -> Self { Range::empty() }
}

impl Range {
  pub const fn empty() -> Self { Range { min: 0.0, max: 0.0 } }
  pub const fn new(min: f64, max: f64) -> Self { Range { min, max } }
  pub const fn size(&self) -> f64 { self.max - self.min }

  pub const fn expand(self, amount: f64) -> Self {
    Range {
      min: self.min - amount * self.size().signum(),
      max: self.max + amount * self.size().signum(),
    }
  }

  pub const fn contains(&self, value: &f64) -> bool {
    (*value >= self.min && *value <= self.max) || (*value <= self.min && *value >= self.max)
  }

  pub fn union(&self, other: Range) -> Range {
    if self.size() == 0.0 && self.min == 0.0 {
      other
    } else if other.size() == 0.0 && other.min == 0.0 {
      *self
    } else {
      Range { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
  }

  fn include(self, value: f64) -> Range {
    Range { min: self.min.min(value), max: self.max.max(value) }
  }

  pub fn nice_ticks(&self, count: u32) -> NiceTicksIter {
    let step = (self.max - self.min) / f64::from(count);
    if !step.is_finite() || step <= 0.0 {
      return NiceTicksIter::new(self.min, self.min, 1.0, 0);
    }

    let k = step.log10().floor();
    let base = step / 10f64.powf(k);

    const EPSILON: f64 = 1e-9;
    let nice_base = match base {
      b if b <= 1.0 + EPSILON => 1.0,
      b if b <= 2.0 + EPSILON => 2.0,
      b if b <= 2.5 + EPSILON => 2.5,
      b if b <= 5.0 + EPSILON => 5.0,
      _ => 10.0,
    };

    let step = nice_base * 10f64.powf(k);
    let lo = (self.min / step).floor() * step;
    let hi = (self.max / step).ceil() * step;

    let decimals = (0..12)
      .find(|&d| {
        let scaled = step * 10f64.powi(d);
        (scaled - scaled.round()).abs() < 1e-6 * scaled.max(1.0)
      })
      .unwrap_or(12) as usize;
    NiceTicksIter::new(lo, hi, step, decimals)
  }
}

impl DataRange {
  pub(crate) fn union(self, other: DataRange) -> DataRange {
    match (self, other) {
      (DataRange::Categorical(labels), _) | (_, DataRange::Categorical(labels)) => {
        DataRange::Categorical(labels)
      }
      (
        DataRange::Continuous { range: a, margin_min: a_min, margin_max: a_max },
        DataRange::Continuous { range: b, margin_min: b_min, margin_max: b_max },
      ) => DataRange::Continuous {
        range:      a.union(b),
        margin_min: a_min || b_min,
        margin_max: a_max || b_max,
      },
    }
  }

  pub fn categories(&self) -> Option<&[String]> {
    match self {
      DataRange::Categorical(labels) => Some(labels),
      DataRange::Continuous { .. } => None,
    }
  }

  /// The range shown on screen: data extent plus margins.
  pub(crate) fn resolve(&self) -> Range {
    const MARGIN: f64 = 0.05;

    match self {
      DataRange::Categorical(labels) => Range::new(-0.5, labels.len() as f64 - 0.5),
      DataRange::Continuous { range, margin_min, margin_max } => {
        let mut range = *range;
        if range.size() == 0.0 {
          range = range.expand(1.0);
        }
        let margin = range.size() * MARGIN;
        if *margin_min {
          range.min -= margin;
        }
        if *margin_max {
          range.max += margin;
        }
        range
      }
    }
  }
}

pub struct NiceTicksIter {
  current:  f64,
  step:     f64,
  hi:       f64,
  decimals: usize,
}

impl NiceTicksIter {
  fn new(lo: f64, hi: f64, step: f64, decimals: usize) -> Self {
    NiceTicksIter { current: lo, step, hi, decimals }
  }

  /// Digits after the decimal point needed to print every tick exactly.
  pub fn decimals(&self) -> usize { self.decimals }
}

impl Iterator for NiceTicksIter {
  type Item = f64;
  fn next(&mut self) -> Option<Self::Item> {
    if self.current < self.hi + self.step * 0.5 {
      let p = 10f64.powi(self.decimals as i32 + 2);
      let result = (self.current * p).round() / p;
      self.current += self.step;
      Some(result)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nice_ticks_use_round_steps() {
    let ticks: Vec<f64> = Range::new(3.0, 47.0).nice_ticks(10).collect();
    assert_eq!(ticks, [0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0]);
    assert_eq!(Range::new(3.0, 47.0).nice_ticks(10).decimals(), 0);
  }

  #[test]
  fn nice_ticks_on_small_ranges_keep_decimals() {
    let iter = Range::new(0.0, 1.0).nice_ticks(10);
    assert_eq!(iter.decimals(), 1);
    let ticks: Vec<f64> = iter.collect();
    assert_eq!(ticks.len(), 11);
    assert_eq!(ticks[3], 0.3);

    let iter = Range::new(0.0, 0.22).nice_ticks(10);
    assert_eq!(iter.decimals(), 3);
    assert_eq!(iter.collect::<Vec<_>>()[1], 0.025);
  }

  #[test]
  fn degenerate_range_yields_single_tick() {
    let ticks: Vec<f64> = Range::new(5.0, 5.0).nice_ticks(10).collect();
    assert_eq!(ticks, [5.0]);
  }

  #[test]
  fn transform_maps_corners() {
    let data = Bounds::new(Range::new(0.0, 10.0), Range::new(0.0, 100.0));
    // Screen space with y pointing down.
    let viewport = Bounds::new(Range::new(100.0, 600.0), Range::new(500.0, 0.0));
    let transform = data.transform_to(viewport);

    assert_eq!(transform * Point::new(0.0, 0.0), Point::new(100.0, 500.0));
    assert_eq!(transform * Point::new(10.0, 100.0), Point::new(600.0, 0.0));
  }

  #[test]
  fn categorical_wins_union_and_resolves_around_indices() {
    let labels = DataRange::Categorical(vec!["a".into(), "b".into()]);
    let merged = DataRange::from(Range::new(0.0, 1.0)).union(labels);
    assert_eq!(merged.categories().unwrap().len(), 2);
    assert_eq!(merged.resolve(), Range::new(-0.5, 1.5));
  }

  #[test]
  fn continuous_resolve_adds_margins() {
    let range = DataRange::from(Range::new(0.0, 100.0));
    assert_eq!(range.resolve(), Range::new(-5.0, 105.0));

    let flat = DataRange::from(Range::new(5.0, 5.0)).resolve();
    assert!(flat.min < 4.0 && flat.max > 6.0);
  }

  #[test]
  fn point_bounds_cover_all_points() {
    let bounds = DataBounds::from_points(&[Point::new(3.0, -1.0), Point::new(-2.0, 4.0)]);
    assert_eq!(bounds.x, DataRange::from(Range::new(-2.0, 3.0)));
    assert_eq!(bounds.y, DataRange::from(Range::new(-1.0, 4.0)));
  }
}
