use polars::prelude::*;

use crate::{
  Marker, Plot, Result, TrendlineKind,
  dashboard::Tab,
  dataset::{FOOD_TYPE, GUESTS, WASTAGE},
  theme,
};

/// Everything shown for one tab, laid out as side-by-side columns.
#[derive(Clone, Debug)]
pub struct Page {
  pub tab:     Tab,
  pub columns: Vec<Vec<Section>>,
}

#[derive(Clone, Debug)]
pub struct Section {
  pub heading: String,
  pub blocks:  Vec<Block>,
}

#[derive(Clone, Debug)]
pub enum Block {
  Text(String),
  Table(DataFrame),
  Chart(Chart),
  Select { label: String, options: Vec<String>, selected: usize },
  DownloadButton { label: String, file_name: String },
  Bullets(Vec<String>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
  /// Pie of total wastage per food type.
  WastageShare,
  /// Box plot of wastage per food type.
  WastageDistribution,
  /// Scatter of wastage against guest count, with a linear fit.
  WastageVsGuests,
  /// Line of mean wastage per guest count.
  MeanWastageByGuests,
}

/// A chart and the frame it is drawn from.
#[derive(Clone, Debug)]
pub struct Chart {
  pub kind: ChartKind,
  pub data: DataFrame,
}

impl Section {
  pub fn new(heading: &str, blocks: Vec<Block>) -> Self {
    Section { heading: heading.to_string(), blocks }
  }
}

impl Page {
  pub fn charts(&self) -> impl Iterator<Item = &Chart> {
    self.columns.iter().flatten().flat_map(|s| &s.blocks).filter_map(|b| match b {
      Block::Chart(chart) => Some(chart),
      _ => None,
    })
  }
}

impl ChartKind {
  pub fn file_stem(self) -> &'static str {
    match self {
      ChartKind::WastageShare => "wastage_share",
      ChartKind::WastageDistribution => "wastage_distribution",
      ChartKind::WastageVsGuests => "wastage_vs_guests",
      ChartKind::MeanWastageByGuests => "mean_wastage_by_guests",
    }
  }
}

impl Chart {
  pub fn new(kind: ChartKind, data: DataFrame) -> Self { Chart { kind, data } }

  pub fn plot(&self) -> Result<Plot<'_>> {
    let mut plot = Plot::new();

    match self.kind {
      ChartKind::WastageShare => {
        plot.pie(self.data.column(FOOD_TYPE)?, self.data.column(WASTAGE)?).start_angle(90.0);
      }
      ChartKind::WastageDistribution => {
        plot.title("Distribution of Wastage Amount by Type of Food");
        plot.x.title(FOOD_TYPE).rotate_ticks(45.0);
        plot.y.title("Wastage Amount");
        plot.box_plot(self.data.column(FOOD_TYPE)?, self.data.column(WASTAGE)?);
      }
      ChartKind::WastageVsGuests => {
        plot.title("Wastage Amount vs. Number of Guests");
        plot.x.title(GUESTS);
        plot.y.title("Wastage Amount");
        plot
          .scatter(self.data.column(GUESTS)?, self.data.column(WASTAGE)?)
          .alpha(0.6)
          .label("Events")
          .trendline(TrendlineKind::Linear)
          .trendline_label("Linear fit");
      }
      ChartKind::MeanWastageByGuests => {
        plot.title("Average Wastage Amount by Number of Guests");
        plot.x.title(GUESTS).rotate_ticks(45.0);
        plot.y.title("Average Wastage Amount");
        plot
          .line(self.data.column(GUESTS)?, self.data.column(WASTAGE)?)
          .color(theme::GREEN)
          .marker(Marker::Circle);
      }
    }

    Ok(plot)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn charts_build_from_their_frames() {
    let frame = df! {
      FOOD_TYPE => &["A", "B"],
      GUESTS => &[100i64, 200],
      WASTAGE => &[50.0, 30.0],
    }
    .unwrap();

    for kind in [
      ChartKind::WastageShare,
      ChartKind::WastageDistribution,
      ChartKind::WastageVsGuests,
      ChartKind::MeanWastageByGuests,
    ] {
      let chart = Chart::new(kind, frame.clone());
      let plot = chart.plot().unwrap();
      let bounds = plot.data_bounds().unwrap();
      assert_eq!(bounds.is_none(), kind == ChartKind::WastageShare);
    }
  }

  #[test]
  fn missing_columns_fail() {
    let frame = df! { "other" => &[1.0] }.unwrap();
    assert!(Chart::new(ChartKind::WastageVsGuests, frame).plot().is_err());
  }
}
