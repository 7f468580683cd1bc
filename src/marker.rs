use kurbo::{Affine, BezPath, Circle, Point, Shape};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
  Circle,
  Diamond,
}

impl Marker {
  /// The marker outline, fitting in a unit square centered on the origin.
  pub(crate) fn to_path(&self, tolerance: f64) -> BezPath {
    match self {
      Marker::Circle => Circle::new(Point::new(0.0, 0.0), 0.5).to_path(tolerance),
      Marker::Diamond => {
        let mut path = BezPath::new();
        path.move_to(Point::new(0.0, -0.5));
        path.line_to(Point::new(0.35, 0.0));
        path.line_to(Point::new(0.0, 0.5));
        path.line_to(Point::new(-0.35, 0.0));
        path.close_path();
        path
      }
    }
  }

  /// The marker scaled to `size` pixels and centered on `center`.
  pub(crate) fn place(&self, center: Point, size: f64) -> BezPath {
    Affine::translate(center.to_vec2()) * Affine::scale(size) * self.to_path(0.01)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn placed_marker_is_centered() {
    let bbox = Marker::Circle.place(Point::new(10.0, 20.0), 4.0).bounding_box();
    assert!((bbox.center().x - 10.0).abs() < 1e-6);
    assert!((bbox.center().y - 20.0).abs() < 1e-6);
    assert!((bbox.width() - 4.0).abs() < 1e-3);
  }
}
