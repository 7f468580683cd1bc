use kurbo::{Affine, Line, Point, Rect, RoundedRect, Stroke};
use parley::FontWeight;
use peniko::{Brush, Color};
use polars::prelude::*;

use crate::{
  Result, ResultExt,
  dashboard::{Block, CAPTION, DESCRIPTION, Page, Section, TITLE, Tab},
  render::{self, Align, DrawText, Render},
  theme,
};

const KEY_HINTS: &str =
  "1 2 3 or Tab: switch tabs    \u{2190} \u{2192}: event type    d: download    q: quit";

/// Page geometry, in unscaled pixels.
const MARGIN: f64 = 30.0;
const GAP: f64 = 30.0;
const HEADING: f64 = 40.0;
const LINE: f64 = 28.0;
const ROW: f64 = 30.0;
const CHIP: f64 = 40.0;
const BUTTON: f64 = 48.0;
const MIN_FLEX: f64 = 120.0;

/// Draws a whole page, header and footer included, into `canvas`.
pub fn draw_page(render: &mut Render, page: &Page, canvas: Rect) -> Result<()> {
  let scale = (canvas.width() / 1600.0).clamp(0.6, 2.0);
  let margin = MARGIN * scale;

  let mut y = canvas.y0 + margin;
  render.draw_text(DrawText {
    text: TITLE,
    size: (34.0 * scale) as f32,
    weight: FontWeight::BOLD,
    brush: Brush::Solid(theme::TEXT),
    position: Point::new(canvas.x0 + margin, y),
    ..Default::default()
  });
  y += 52.0 * scale;

  render.draw_text(DrawText {
    text: DESCRIPTION,
    size: (18.0 * scale) as f32,
    brush: Brush::Solid(theme::MUTED),
    position: Point::new(canvas.x0 + margin, y),
    max_width: Some((canvas.width() - 2.0 * margin) as f32),
    ..Default::default()
  });
  y += 44.0 * scale;

  y = draw_tab_bar(render, page.tab, Point::new(canvas.x0 + margin, y), canvas.x1 - margin, scale);
  y += 20.0 * scale;

  let footer = canvas.y1 - margin - 24.0 * scale;
  render.draw_text(DrawText {
    text: CAPTION,
    size: (16.0 * scale) as f32,
    brush: Brush::Solid(theme::MUTED),
    position: Point::new(canvas.x0 + margin, footer),
    ..Default::default()
  });
  render.draw_text(DrawText {
    text: KEY_HINTS,
    size: (14.0 * scale) as f32,
    brush: Brush::Solid(theme::MUTED),
    position: Point::new(canvas.x1 - margin, footer),
    horizontal_align: Align::End,
    ..Default::default()
  });

  let body = Rect::new(canvas.x0 + margin, y, canvas.x1 - margin, footer - 16.0 * scale);
  let n = page.columns.len().max(1) as f64;
  let width = (body.width() - GAP * scale * (n - 1.0)) / n;

  for (i, column) in page.columns.iter().enumerate() {
    let x0 = body.x0 + i as f64 * (width + GAP * scale);
    draw_column(render, column, Rect::new(x0, body.y0, x0 + width, body.y1), scale)?;
  }

  Ok(())
}

/// Renders `page` offscreen and encodes it as PNG.
pub fn render_png(page: &Page, width: u32, height: u32) -> Result<Vec<u8>> {
  render::render_png(width, height, |render, canvas| draw_page(render, page, canvas))
}

fn draw_tab_bar(render: &mut Render, active: Tab, origin: Point, right: f64, scale: f64) -> f64 {
  let mut x = origin.x;
  let height = 40.0 * scale;

  for (i, tab) in Tab::ALL.into_iter().enumerate() {
    let label = format!("{}  {}", i + 1, tab.title());
    let text = DrawText {
      text: &label,
      size: (20.0 * scale) as f32,
      weight: if tab == active { FontWeight::BOLD } else { FontWeight::NORMAL },
      brush: Brush::Solid(if tab == active { theme::ACCENT } else { theme::TEXT }),
      position: Point::new(x, origin.y + height / 2.0),
      vertical_align: Align::Center,
      ..Default::default()
    };
    let layout = render.layout_text(&text);
    let width = f64::from(layout.width());
    render.draw_text_layout(layout, text);

    if tab == active {
      render.fill(
        &Rect::new(x, origin.y + height - 3.0 * scale, x + width, origin.y + height),
        Affine::IDENTITY,
        theme::ACCENT,
      );
    }
    x += width + 40.0 * scale;
  }

  let bottom = origin.y + height;
  render.stroke(
    &Line::new(Point::new(origin.x, bottom), Point::new(right, bottom)),
    Affine::IDENTITY,
    theme::GRID,
    &Stroke::new(1.0 * scale),
  );
  bottom
}

fn fixed_height(block: &Block, scale: f64) -> Option<f64> {
  match block {
    Block::Text(_) => Some(LINE * scale),
    Block::Select { .. } => Some((LINE + CHIP + 10.0) * scale),
    Block::DownloadButton { .. } => Some((BUTTON + 10.0) * scale),
    Block::Bullets(items) => Some(items.len() as f64 * LINE * scale),
    Block::Table(_) | Block::Chart(_) => None,
  }
}

fn draw_column(render: &mut Render, sections: &[Section], area: Rect, scale: f64) -> Result<()> {
  let blocks = sections.iter().flat_map(|s| &s.blocks);
  let fixed: f64 = sections.len() as f64 * HEADING * scale
    + blocks.clone().filter_map(|b| fixed_height(b, scale)).sum::<f64>();
  let flex = blocks.filter(|b| fixed_height(b, scale).is_none()).count();
  let flex_height = if flex == 0 {
    0.0
  } else {
    ((area.height() - fixed) / flex as f64).max(MIN_FLEX * scale)
  };

  let mut y = area.y0;
  for section in sections {
    render.draw_text(DrawText {
      text: &section.heading,
      size: (22.0 * scale) as f32,
      weight: FontWeight::BOLD,
      brush: Brush::Solid(theme::TEXT),
      position: Point::new(area.x0, y + 6.0 * scale),
      max_width: Some(area.width() as f32),
      ..Default::default()
    });
    y += HEADING * scale;

    for block in &section.blocks {
      let height = fixed_height(block, scale).unwrap_or(flex_height);
      let rect = Rect::new(area.x0, y, area.x1, (y + height).min(area.y1));
      if rect.height() > 0.0 {
        draw_block(render, block, rect, scale)?;
      }
      y += height;
    }
  }

  Ok(())
}

fn draw_block(render: &mut Render, block: &Block, rect: Rect, scale: f64) -> Result<()> {
  let text_size = (16.0 * scale) as f32;

  match block {
    Block::Text(text) => render.draw_text(DrawText {
      text,
      size: text_size,
      brush: Brush::Solid(theme::TEXT),
      position: Point::new(rect.x0, rect.y0),
      ..Default::default()
    }),

    Block::Bullets(items) => {
      for (i, item) in items.iter().enumerate() {
        render.draw_text(DrawText {
          text: &format!("\u{2022}  {item}"),
          size: text_size,
          brush: Brush::Solid(theme::TEXT),
          position: Point::new(rect.x0, rect.y0 + i as f64 * LINE * scale),
          max_width: Some(rect.width() as f32),
          ..Default::default()
        });
      }
    }

    Block::Select { label, options, selected } => {
      render.draw_text(DrawText {
        text: label,
        size: text_size,
        brush: Brush::Solid(theme::TEXT),
        position: Point::new(rect.x0, rect.y0),
        ..Default::default()
      });

      let chips = Rect::new(rect.x0, rect.y0 + LINE * scale, rect.x1, rect.y1);
      render.clipped(chips, |render| draw_chips(render, options, *selected, chips, scale));
    }

    Block::DownloadButton { label, file_name } => {
      let text = DrawText {
        text: label,
        size: text_size,
        weight: FontWeight::BOLD,
        brush: Brush::Solid(Color::WHITE),
        vertical_align: Align::Center,
        ..Default::default()
      };
      let layout = render.layout_text(&text);
      let padding = 18.0 * scale;
      let button = Rect::new(
        rect.x0,
        rect.y0,
        rect.x0 + f64::from(layout.width()) + 2.0 * padding,
        rect.y0 + BUTTON * scale,
      );
      render.fill(&RoundedRect::from_rect(button, 6.0 * scale), Affine::IDENTITY, theme::ACCENT);
      render.draw_text_layout(
        layout,
        DrawText { position: Point::new(button.x0 + padding, button.center().y), ..text },
      );

      render.draw_text(DrawText {
        text: &format!("{file_name}  (press d)"),
        size: (14.0 * scale) as f32,
        brush: Brush::Solid(theme::MUTED),
        position: Point::new(button.x1 + padding, button.center().y),
        vertical_align: Align::Center,
        ..Default::default()
      });
    }

    Block::Table(frame) => render.clipped(rect, |render| draw_table(render, frame, rect, scale)),

    Block::Chart(chart) => {
      let plot = chart.plot()?;
      render.stroke(
        &RoundedRect::from_rect(rect, 4.0 * scale),
        Affine::IDENTITY,
        theme::GRID,
        &Stroke::new(1.0 * scale),
      );
      render.clipped(rect, |render| plot.draw(render, rect))?;
    }
  }

  Ok(())
}

fn draw_chips(render: &mut Render, options: &[String], selected: usize, area: Rect, scale: f64) {
  let padding = 14.0 * scale;
  let mut x = area.x0;

  for (i, option) in options.iter().enumerate() {
    let active = i == selected;
    let text = DrawText {
      text: option,
      size: (16.0 * scale) as f32,
      brush: Brush::Solid(if active { Color::WHITE } else { theme::TEXT }),
      vertical_align: Align::Center,
      ..Default::default()
    };
    let layout = render.layout_text(&text);

    let chip = Rect::new(
      x,
      area.y0 + 4.0 * scale,
      x + f64::from(layout.width()) + 2.0 * padding,
      area.y0 + (CHIP - 4.0) * scale,
    );
    let shape = RoundedRect::from_rect(chip, chip.height() / 2.0);
    render.fill(&shape, Affine::IDENTITY, if active { theme::ACCENT } else { theme::PANEL });

    render.draw_text_layout(
      layout,
      DrawText { position: Point::new(chip.x0 + padding, chip.center().y), ..text },
    );
    x = chip.x1 + 10.0 * scale;
  }
}

fn draw_table(render: &mut Render, frame: &DataFrame, area: Rect, scale: f64) {
  let row = ROW * scale;
  let columns = frame.get_columns();
  let width = area.width() / columns.len().max(1) as f64;
  let cell = |r: f64, c: usize| Point::new(area.x0 + c as f64 * width + 8.0 * scale, r + row / 2.0);

  render.fill(&Rect::new(area.x0, area.y0, area.x1, area.y0 + row), Affine::IDENTITY, theme::PANEL);
  for (c, column) in columns.iter().enumerate() {
    render.draw_text(DrawText {
      text: column.name().as_str(),
      size: (15.0 * scale) as f32,
      weight: FontWeight::BOLD,
      brush: Brush::Solid(theme::TEXT),
      position: cell(area.y0, c),
      vertical_align: Align::Center,
      ..Default::default()
    });
  }

  let fits = ((area.height() - row) / row).floor().max(0.0) as usize;
  let shown = if frame.height() > fits { fits.saturating_sub(1) } else { frame.height() };

  let mut y = area.y0 + row;
  for r in 0..shown {
    if r % 2 == 1 {
      render.fill(
        &Rect::new(area.x0, y, area.x1, y + row),
        Affine::IDENTITY,
        Color::from_rgb8(250, 250, 252),
      );
    }
    for (c, column) in columns.iter().enumerate() {
      let Some(value) = column.get(r).log_err() else { continue };
      render.draw_text(DrawText {
        text: &cell_text(&value),
        size: (15.0 * scale) as f32,
        brush: Brush::Solid(theme::TEXT),
        position: cell(y, c),
        vertical_align: Align::Center,
        ..Default::default()
      });
    }
    y += row;
  }

  if shown < frame.height() {
    render.draw_text(DrawText {
      text: &format!("\u{2026} and {} more rows", frame.height() - shown),
      size: (15.0 * scale) as f32,
      brush: Brush::Solid(theme::MUTED),
      position: cell(y, 0),
      vertical_align: Align::Center,
      ..Default::default()
    });
  }

  render.stroke(
    &Line::new(Point::new(area.x0, area.y0 + row), Point::new(area.x1, area.y0 + row)),
    Affine::IDENTITY,
    theme::AXIS,
    &Stroke::new(1.0 * scale),
  );
}

fn cell_text(value: &AnyValue) -> String {
  match value {
    AnyValue::Null => String::new(),
    AnyValue::String(s) => s.to_string(),
    AnyValue::StringOwned(s) => s.to_string(),
    AnyValue::Float64(v) => format!("{v}"),
    AnyValue::Int64(v) => format!("{v}"),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cells_print_plain_values() {
    assert_eq!(cell_text(&AnyValue::String("Meat")), "Meat");
    assert_eq!(cell_text(&AnyValue::Float64(12.5)), "12.5");
    assert_eq!(cell_text(&AnyValue::Int64(300)), "300");
    assert_eq!(cell_text(&AnyValue::Null), "");
  }
}
