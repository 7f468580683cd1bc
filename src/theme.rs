use peniko::Color;

pub const TEXT: Color = Color::from_rgb8(32, 32, 32);
pub const MUTED: Color = Color::from_rgb8(110, 110, 120);
pub const AXIS: Color = Color::from_rgb8(128, 128, 128);
pub const GRID: Color = Color::from_rgb8(232, 232, 236);
pub const PANEL: Color = Color::from_rgb8(240, 242, 246);
pub const ACCENT: Color = Color::from_rgb8(255, 75, 75);

pub const BLUE: Color = Color::from_rgb8(31, 119, 180);
pub const RED: Color = Color::from_rgb8(214, 39, 40);
pub const GREEN: Color = Color::from_rgb8(44, 160, 44);

/// A fixed list of colors, repeated when there are more categories than
/// colors.
pub struct CategoricalPalette {
  colors: &'static [Color],
}

pub const TAB10: CategoricalPalette = CategoricalPalette::new(&[
  Color::from_rgb8(31, 119, 180),
  Color::from_rgb8(255, 127, 14),
  Color::from_rgb8(44, 160, 44),
  Color::from_rgb8(214, 39, 40),
  Color::from_rgb8(148, 103, 189),
  Color::from_rgb8(140, 86, 75),
  Color::from_rgb8(227, 119, 194),
  Color::from_rgb8(127, 127, 127),
  Color::from_rgb8(188, 189, 34),
  Color::from_rgb8(23, 190, 207),
]);

pub const SET3: CategoricalPalette = CategoricalPalette::new(&[
  Color::from_rgb8(141, 211, 199),
  Color::from_rgb8(255, 255, 179),
  Color::from_rgb8(190, 186, 218),
  Color::from_rgb8(251, 128, 114),
  Color::from_rgb8(128, 177, 211),
  Color::from_rgb8(253, 180, 98),
  Color::from_rgb8(179, 222, 105),
  Color::from_rgb8(252, 205, 229),
  Color::from_rgb8(217, 217, 217),
  Color::from_rgb8(188, 128, 189),
  Color::from_rgb8(204, 235, 197),
  Color::from_rgb8(255, 237, 111),
]);

impl CategoricalPalette {
  pub const fn new(colors: &'static [Color]) -> Self { CategoricalPalette { colors } }

  pub fn sample(&self, index: usize) -> Color { self.colors[index % self.colors.len()] }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn palette_wraps_around() {
    assert_eq!(TAB10.sample(0), TAB10.sample(10));
    assert_ne!(SET3.sample(0), SET3.sample(1));
  }
}
