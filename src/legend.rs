use kurbo::{Affine, Point, Rect, RoundedRect, Size, Stroke, Vec2};
use peniko::Color;

use crate::{
  Axes, Plot,
  render::{Align, DrawText, Render},
  theme,
};

pub struct Legend {
  items: Vec<LegendItem>,
}

pub struct LegendItem {
  label: String,
  color: Color,
}

impl Plot<'_> {
  pub(crate) fn legend(&self) -> Legend {
    let mut items = vec![];
    for ax in &self.axes {
      if let Axes::Scatter(sa) = ax {
        if let Some(trendline) = &sa.options.trendline {
          items.push(LegendItem { label: sa.options.label.clone(), color: sa.options.color });
          items.push(LegendItem { label: trendline.label.clone(), color: trendline.color });
        }
      }
    }

    Legend { items }
  }

  /// Draws the legend into the top-left corner of `viewport`.
  pub(crate) fn draw_legend(&self, render: &mut Render, viewport: Rect, scale: f64) {
    let legend = self.legend();
    if legend.items.is_empty() {
      return;
    }

    let margin = 15.0 * scale;
    let padding = 10.0 * scale;
    let line_height = 26.0 * scale;
    let marker_width = 36.0 * scale;

    let mut inner_width = 0.0_f64;
    let mut layouts = vec![];
    for item in &legend.items {
      let text = DrawText {
        text: &item.label,
        size: (18.0 * scale) as f32,
        vertical_align: Align::Center,
        ..Default::default()
      };
      let layout = render.layout_text(&text);
      inner_width = inner_width.max(f64::from(layout.width()));
      layouts.push((layout, text));
    }

    inner_width += marker_width;
    let inner_height = legend.items.len() as f64 * line_height;

    let rect = Rect::new(
      viewport.x0 + margin,
      viewport.y0 + margin,
      viewport.x0 + margin + inner_width + padding * 2.0,
      viewport.y0 + margin + inner_height + padding * 2.0,
    );
    let background = RoundedRect::from_rect(rect, 5.0 * scale);
    render.fill(&background, Affine::IDENTITY, Color::from_rgba8(255, 255, 255, 220));
    render.stroke(&background, Affine::IDENTITY, theme::AXIS, &Stroke::new(1.5 * scale));

    for (i, (layout, mut text)) in layouts.into_iter().enumerate() {
      let pos = Point::new(
        rect.x0 + padding,
        rect.y0 + i as f64 * line_height + padding + line_height / 2.0,
      );

      let marker_rect = Rect::from_origin_size(
        pos - Vec2::new(0.0, 2.0 * scale),
        Size::new(marker_width - 8.0 * scale, 4.0 * scale),
      );
      render.fill(&marker_rect, Affine::IDENTITY, legend.items[i].color);

      text.position = pos + Vec2::new(marker_width, 0.0);
      render.draw_text_layout(layout, text);
    }
  }
}

#[cfg(test)]
mod tests {
  use polars::prelude::*;

  use crate::{Plot, TrendlineKind};

  #[test]
  fn only_fitted_scatters_get_entries() {
    let x = Column::new("x".into(), &[1.0, 2.0]);
    let y = Column::new("y".into(), &[1.0, 3.0]);

    let mut plot = Plot::new();
    plot.line(&x, &y);
    plot.scatter(&x, &y);
    assert!(plot.legend().items.is_empty());

    plot.scatter(&x, &y).label("Events").trendline(TrendlineKind::Linear).trendline_label("Trend");
    let labels: Vec<_> = plot.legend().items.iter().map(|i| i.label.clone()).collect();
    assert_eq!(labels, ["Events", "Trend"]);
  }
}
