//! The three-tab report and the events that drive it.
//!
//! Interaction is modelled as plain values: a [`State`] holds the active tab
//! and the selected event type, [`Dashboard::handle`] maps a state and an
//! [`Event`] to the next state plus an [`Effect`], and [`Dashboard::page`]
//! turns a state into the [`Page`] to show. Nothing here touches the screen
//! or the filesystem.

mod layout;
mod page;

use std::path::{Path, PathBuf};

pub use layout::{draw_page, render_png};
pub use page::{Block, Chart, ChartKind, Page, Section};

use crate::{
  Error, Result, aggregate,
  dataset::{Dataset, FOOD_TYPE, GUESTS, WASTAGE},
};

pub const TITLE: &str = "Waste Reduction & Sustainability Tracker";
pub const DESCRIPTION: &str =
  "Analyze daily food waste and sustainability metrics to minimize environmental impact.";
pub const CAPTION: &str = "Together we can reduce food waste!";

pub const TIPS: [&str; 4] = [
  "Plan your meals and make shopping lists.",
  "Store food properly to extend its shelf life.",
  "Understand expiration dates: \"best before\" is not the same as \"use by.\"",
  "Share surplus food with friends or local food banks.",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
  #[default]
  Overview,
  WastageAnalysis,
  AdditionalInsights,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
  pub tab:        Tab,
  pub event_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
  SelectTab(Tab),
  NextTab,
  SelectEventType(String),
  NextEventType,
  PreviousEventType,
  Download,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
  None,
  Redraw,
  Download(Download),
}

/// A file offered to the user: the filtered rows of one event type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
  pub label:     &'static str,
  pub file_name: String,
  pub mime:      &'static str,
  pub data:      Vec<u8>,
}

pub struct Dashboard<'a> {
  dataset:       &'a Dataset,
  event_types:   Vec<String>,
  overview_rows: usize,
}

impl Tab {
  pub const ALL: [Tab; 3] = [Tab::Overview, Tab::WastageAnalysis, Tab::AdditionalInsights];

  pub fn title(self) -> &'static str {
    match self {
      Tab::Overview => "Overview",
      Tab::WastageAnalysis => "Wastage Analysis",
      Tab::AdditionalInsights => "Additional Insights",
    }
  }

  pub fn file_stem(self) -> &'static str {
    match self {
      Tab::Overview => "overview",
      Tab::WastageAnalysis => "wastage_analysis",
      Tab::AdditionalInsights => "additional_insights",
    }
  }

  pub fn next(self) -> Tab {
    match self {
      Tab::Overview => Tab::WastageAnalysis,
      Tab::WastageAnalysis => Tab::AdditionalInsights,
      Tab::AdditionalInsights => Tab::Overview,
    }
  }
}

impl Download {
  pub fn save(&self, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(&self.file_name);
    std::fs::write(&path, &self.data).map_err(Error::io(&path))?;
    log::info!("saved {} ({} bytes)", path.display(), self.data.len());
    Ok(path)
  }
}

impl<'a> Dashboard<'a> {
  pub fn new(dataset: &'a Dataset) -> Result<Self> {
    let event_types = aggregate::event_types(dataset)?;
    if event_types.is_empty() {
      return Err(Error::EmptyDataset);
    }
    Ok(Dashboard { dataset, event_types, overview_rows: 5 })
  }

  pub fn with_overview_rows(mut self, rows: usize) -> Self {
    self.overview_rows = rows;
    self
  }

  pub fn dataset(&self) -> &'a Dataset { self.dataset }
  pub fn event_types(&self) -> &[String] { &self.event_types }

  /// The overview tab, with the first event type selected.
  pub fn initial_state(&self) -> State {
    State { tab: Tab::Overview, event_type: self.event_types[0].clone() }
  }

  /// A state showing `tab` with `event_type` selected.
  pub fn state(&self, tab: Tab, event_type: Option<&str>) -> Result<State> {
    let state = State { tab, ..self.initial_state() };
    match event_type {
      Some(event_type) => Ok(self.handle(&state, Event::SelectEventType(event_type.into()))?.0),
      None => Ok(state),
    }
  }

  pub fn handle(&self, state: &State, event: Event) -> Result<(State, Effect)> {
    let next = match event {
      Event::SelectTab(tab) => State { tab, ..state.clone() },
      Event::NextTab => State { tab: state.tab.next(), ..state.clone() },
      Event::SelectEventType(event_type) => {
        if !self.event_types.contains(&event_type) {
          return Err(Error::UnknownEventType(event_type));
        }
        State { event_type, ..state.clone() }
      }
      Event::NextEventType => State { event_type: self.step_event_type(state, 1), ..state.clone() },
      Event::PreviousEventType => {
        State { event_type: self.step_event_type(state, -1), ..state.clone() }
      }
      Event::Download => return Ok((state.clone(), Effect::Download(self.download(state)?))),
    };

    let effect = if next == *state { Effect::None } else { Effect::Redraw };
    Ok((next, effect))
  }

  fn step_event_type(&self, state: &State, step: isize) -> String {
    let len = self.event_types.len() as isize;
    let current = self.event_types.iter().position(|e| *e == state.event_type).unwrap_or(0);
    let next = (current as isize + step).rem_euclid(len) as usize;
    self.event_types[next].clone()
  }

  pub fn download(&self, state: &State) -> Result<Download> {
    let filtered = aggregate::select_event_type(self.dataset, &state.event_type)?;
    Ok(Download {
      label:     "Download data as CSV",
      file_name: aggregate::download_file_name(&state.event_type),
      mime:      "text/csv",
      data:      aggregate::encode_csv(&filtered)?,
    })
  }

  pub fn page(&self, state: &State) -> Result<Page> {
    let columns = match state.tab {
      Tab::Overview => vec![vec![Section::new(
        "Data Overview",
        vec![Block::Table(aggregate::overview(self.dataset, self.overview_rows))],
      )]],

      Tab::WastageAnalysis => {
        let frame = self.dataset.frame();
        vec![
          vec![
            Section::new(
              "Wastage Amount by Type of Food",
              vec![Block::Chart(Chart::new(
                ChartKind::WastageShare,
                aggregate::wastage_by_food(self.dataset)?,
              ))],
            ),
            Section::new(
              "Wastage Amount vs. Number of Guests",
              vec![Block::Chart(Chart::new(
                ChartKind::WastageVsGuests,
                frame.select([GUESTS, WASTAGE])?,
              ))],
            ),
          ],
          vec![Section::new(
            "Wastage Amount Distribution by Type of Food",
            vec![Block::Chart(Chart::new(
              ChartKind::WastageDistribution,
              frame.select([FOOD_TYPE, WASTAGE])?,
            ))],
          )],
        ]
      }

      Tab::AdditionalInsights => {
        let filtered = aggregate::select_event_type(self.dataset, &state.event_type)?;
        let selected =
          self.event_types.iter().position(|e| *e == state.event_type).unwrap_or_default();

        vec![
          vec![
            Section::new(
              "Average Wastage by Number of Guests",
              vec![Block::Chart(Chart::new(
                ChartKind::MeanWastageByGuests,
                aggregate::mean_wastage_by_guests(self.dataset)?,
              ))],
            ),
            Section::new(
              "Tips to Reduce Food Waste:",
              vec![Block::Bullets(TIPS.iter().map(|t| t.to_string()).collect())],
            ),
          ],
          vec![
            Section::new(
              "Filter by Event Type",
              vec![
                Block::Select {
                  label: "Select an Event Type:".into(),
                  options: self.event_types.clone(),
                  selected,
                },
                Block::Text(format!("Showing data for {}:", state.event_type)),
                Block::Table(filtered),
              ],
            ),
            Section::new(
              "Download Filtered Data",
              vec![Block::DownloadButton {
                label:     "Download data as CSV".into(),
                file_name: aggregate::download_file_name(&state.event_type),
              }],
            ),
          ],
        ]
      }
    };

    Ok(Page { tab: state.tab, columns })
  }
}

#[cfg(test)]
mod tests {
  use polars::prelude::*;

  use super::*;
  use crate::dataset::EVENT_TYPE;

  fn dataset() -> Dataset {
    let frame = df! {
      FOOD_TYPE => &["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"],
      EVENT_TYPE => &[
        "Wedding", "Corporate", "Wedding", "Birthday", "Corporate",
        "Wedding", "Birthday", "Corporate", "Birthday", "Corporate",
      ],
      GUESTS => &[100i64, 200, 300, 100, 200, 300, 100, 200, 300, 400],
      WASTAGE => &[10.0, 10.0, 10.0, 10.0, 10.0, 6.0, 6.0, 6.0, 6.0, 6.0],
    }
    .unwrap();
    Dataset::from_frame(frame).unwrap()
  }

  #[test]
  fn starts_on_overview_with_first_event_type() {
    let dataset = dataset();
    let dashboard = Dashboard::new(&dataset).unwrap();

    let state = dashboard.initial_state();
    assert_eq!(state.tab, Tab::Overview);
    assert_eq!(state.event_type, "Wedding");
    assert_eq!(dashboard.event_types(), ["Wedding", "Corporate", "Birthday"]);
  }

  #[test]
  fn tabs_cycle() {
    let dataset = dataset();
    let dashboard = Dashboard::new(&dataset).unwrap();

    let mut state = dashboard.initial_state();
    let mut seen = vec![];
    for _ in 0..3 {
      let (next, effect) = dashboard.handle(&state, Event::NextTab).unwrap();
      assert_eq!(effect, Effect::Redraw);
      seen.push(next.tab);
      state = next;
    }
    assert_eq!(seen, [Tab::WastageAnalysis, Tab::AdditionalInsights, Tab::Overview]);

    let (same, effect) = dashboard.handle(&state, Event::SelectTab(Tab::Overview)).unwrap();
    assert_eq!(same, state);
    assert_eq!(effect, Effect::None);
  }

  #[test]
  fn event_type_selection_wraps_and_validates() {
    let dataset = dataset();
    let dashboard = Dashboard::new(&dataset).unwrap();
    let state = dashboard.initial_state();

    let (prev, _) = dashboard.handle(&state, Event::PreviousEventType).unwrap();
    assert_eq!(prev.event_type, "Birthday");
    let (next, _) = dashboard.handle(&prev, Event::NextEventType).unwrap();
    assert_eq!(next.event_type, "Wedding");

    let err = dashboard.handle(&state, Event::SelectEventType("Funeral".into())).unwrap_err();
    assert!(matches!(err, Error::UnknownEventType(e) if e == "Funeral"));
  }

  #[test]
  fn download_exports_selection_without_changing_state() {
    let dataset = dataset();
    let dashboard = Dashboard::new(&dataset).unwrap();
    let state = dashboard.state(Tab::AdditionalInsights, Some("Wedding")).unwrap();

    let (after, effect) = dashboard.handle(&state, Event::Download).unwrap();
    assert_eq!(after, state);

    let Effect::Download(download) = effect else { panic!("expected a download") };
    assert_eq!(download.file_name, "Wedding_data.csv");
    assert_eq!(download.mime, "text/csv");

    let text = String::from_utf8(download.data).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1..].iter().all(|l| l.contains(",Wedding,")));
  }

  #[test]
  fn overview_shows_first_rows() {
    let dataset = dataset();
    let dashboard = Dashboard::new(&dataset).unwrap();
    let page = dashboard.page(&dashboard.initial_state()).unwrap();

    let [column] = page.columns.as_slice() else { panic!("expected one column") };
    let Block::Table(table) = &column[0].blocks[0] else { panic!("expected a table") };
    assert_eq!(column[0].heading, "Data Overview");
    assert_eq!(table.height(), 5);
    assert!(table.equals(&dataset.frame().head(Some(5))));
  }

  #[test]
  fn wastage_page_has_three_charts() {
    let dataset = dataset();
    let dashboard = Dashboard::new(&dataset).unwrap();
    let state = dashboard.state(Tab::WastageAnalysis, None).unwrap();

    let kinds: Vec<_> = dashboard.page(&state).unwrap().charts().map(|c| c.kind).collect();
    assert_eq!(
      kinds,
      [ChartKind::WastageShare, ChartKind::WastageVsGuests, ChartKind::WastageDistribution]
    );
  }

  #[test]
  fn insights_page_filters_by_selection() {
    let dataset = dataset();
    let dashboard = Dashboard::new(&dataset).unwrap();
    let state = dashboard.state(Tab::AdditionalInsights, Some("Birthday")).unwrap();
    let page = dashboard.page(&state).unwrap();

    let blocks: Vec<_> = page.columns.iter().flatten().flat_map(|s| &s.blocks).collect();

    let Some(Block::Select { options, selected, .. }) =
      blocks.iter().find(|b| matches!(b, Block::Select { .. }))
    else {
      panic!("expected a selector")
    };
    assert_eq!(options[*selected], "Birthday");

    let Some(Block::Table(table)) = blocks.iter().find(|b| matches!(b, Block::Table(_))) else {
      panic!("expected a table")
    };
    assert_eq!(table.height(), 3);

    let caption = "Showing data for Birthday:";
    assert!(blocks.iter().any(|b| matches!(b, Block::Text(t) if t == caption)));
    assert!(blocks.iter().any(
      |b| matches!(b, Block::DownloadButton { file_name, .. } if file_name == "Birthday_data.csv")
    ));
    assert!(blocks.iter().any(|b| matches!(b, Block::Bullets(tips) if tips.len() == 4)));
  }
}
