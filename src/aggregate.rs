//! Grouped summaries and selections over a [`Dataset`].
//!
//! Everything here is a pure function of the dataset (and a selection); results
//! are recomputed on each call.

use std::io::Cursor;

use polars::prelude::*;

use crate::{
  Error, Result,
  dataset::{Dataset, EVENT_TYPE, FOOD_TYPE, GUESTS, WASTAGE},
};

/// The first `rows` rows, unchanged.
pub fn overview(dataset: &Dataset, rows: usize) -> DataFrame { dataset.frame().head(Some(rows)) }

/// Total wastage per food type, ordered by food type.
///
/// Columns: `Type of Food`, `Wastage Food Amount`.
pub fn wastage_by_food(dataset: &Dataset) -> Result<DataFrame> {
  let frame = dataset
    .frame()
    .clone()
    .lazy()
    .group_by([col(FOOD_TYPE)])
    .agg([col(WASTAGE).sum()])
    .sort([FOOD_TYPE], SortMultipleOptions::default())
    .collect()?;

  log::debug!("wastage by food: {} groups", frame.height());
  Ok(frame)
}

/// Mean wastage per distinct guest count, ordered by guest count.
///
/// Columns: `Number of Guests`, `Wastage Food Amount`.
pub fn mean_wastage_by_guests(dataset: &Dataset) -> Result<DataFrame> {
  let frame = dataset
    .frame()
    .clone()
    .lazy()
    .group_by([col(GUESTS)])
    .agg([col(WASTAGE).mean()])
    .sort([GUESTS], SortMultipleOptions::default())
    .collect()?;

  log::debug!("mean wastage by guests: {} groups", frame.height());
  Ok(frame)
}

/// Distinct event types in order of first appearance.
pub fn event_types(dataset: &Dataset) -> Result<Vec<String>> {
  let unique = dataset.column(EVENT_TYPE)?.unique_stable()?;
  Ok(unique.str()?.into_iter().flatten().map(str::to_string).collect())
}

/// Rows whose event type equals `event_type`, in dataset order.
pub fn filter_by_event_type(dataset: &Dataset, event_type: &str) -> Result<DataFrame> {
  let frame =
    dataset.frame().clone().lazy().filter(col(EVENT_TYPE).eq(lit(event_type))).collect()?;

  log::debug!("{} of {} rows have event type {event_type:?}", frame.height(), dataset.len());
  Ok(frame)
}

/// Like [`filter_by_event_type`], but rejects event types that never occur.
pub fn select_event_type(dataset: &Dataset, event_type: &str) -> Result<DataFrame> {
  let frame = filter_by_event_type(dataset, event_type)?;
  if frame.height() == 0 {
    return Err(Error::UnknownEventType(event_type.to_string()));
  }
  Ok(frame)
}

/// Encodes a frame as UTF-8 CSV with a header row and no index column.
pub fn encode_csv(frame: &DataFrame) -> Result<Vec<u8>> {
  let mut frame = frame.clone();
  let mut buf = Vec::new();
  CsvWriter::new(&mut buf).include_header(true).finish(&mut frame)?;
  Ok(buf)
}

/// Parses CSV produced by [`encode_csv`].
pub fn decode_csv(bytes: Vec<u8>) -> Result<DataFrame> {
  Ok(CsvReader::new(Cursor::new(bytes)).finish()?)
}

/// `<event type>_data.csv`, with characters that are not valid in a single
/// file name component replaced by `_`.
pub fn download_file_name(event_type: &str) -> String {
  let mut stem: String = event_type
    .chars()
    .map(|c| match c {
      '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
      c if c.is_control() => '_',
      c => c,
    })
    .collect();

  let dots = stem.len() - stem.trim_start_matches('.').len();
  stem.replace_range(..dots, &"_".repeat(dots));

  format!("{stem}_data.csv")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::Record;

  fn sample() -> Dataset {
    let frame = df! {
      FOOD_TYPE => &["Meat", "Fruits", "Meat", "Vegetables", "Fruits", "Meat"],
      EVENT_TYPE => &[
        "Wedding", "Corporate", "Wedding", "Birthday", "Corporate", "Social Gathering",
      ],
      GUESTS => &[300i64, 200, 300, 450, 200, 310],
      WASTAGE => &[25.0, 10.0, 35.0, 40.0, 20.0, 15.0],
    }
    .unwrap();
    Dataset::from_frame(frame).unwrap()
  }

  fn f64s(frame: &DataFrame, name: &str) -> Vec<f64> {
    frame.column(name).unwrap().f64().unwrap().into_no_null_iter().collect()
  }

  #[test]
  fn sums_per_food_type_in_key_order() {
    let sums = wastage_by_food(&sample()).unwrap();

    let keys: Vec<_> =
      sums.column(FOOD_TYPE).unwrap().str().unwrap().into_no_null_iter().collect();
    assert_eq!(keys, ["Fruits", "Meat", "Vegetables"]);
    assert_eq!(f64s(&sums, WASTAGE), [30.0, 75.0, 40.0]);
  }

  #[test]
  fn sum_of_groups_matches_column_total() {
    let dataset = sample();
    let total: f64 = f64s(dataset.frame(), WASTAGE).iter().sum();
    let grouped: f64 = f64s(&wastage_by_food(&dataset).unwrap(), WASTAGE).iter().sum();
    assert!((total - grouped).abs() < 1e-9);
  }

  #[test]
  fn means_per_guest_count() {
    let dataset = sample();
    let means = mean_wastage_by_guests(&dataset).unwrap();

    let guests: Vec<_> = means.column(GUESTS).unwrap().i64().unwrap().into_no_null_iter().collect();
    assert_eq!(guests, [200, 300, 310, 450]);
    assert_eq!(f64s(&means, WASTAGE), [15.0, 30.0, 15.0, 40.0]);

    let records = dataset.records().unwrap();
    for (g, mean) in guests.iter().zip(f64s(&means, WASTAGE)) {
      let matching: Vec<f64> =
        records.iter().filter(|r| r.guests == *g).map(|r| r.wastage).collect();
      let expected = matching.iter().sum::<f64>() / matching.len() as f64;
      assert!((expected - mean).abs() < 1e-9);
    }
  }

  #[test]
  fn event_types_keep_first_appearance() {
    assert_eq!(
      event_types(&sample()).unwrap(),
      ["Wedding", "Corporate", "Birthday", "Social Gathering"]
    );
  }

  #[test]
  fn filter_keeps_exactly_matching_rows() {
    let dataset = sample();
    let records = dataset.records().unwrap();

    for event in event_types(&dataset).unwrap() {
      let filtered = filter_by_event_type(&dataset, &event).unwrap();
      let expected: Vec<Record> =
        records.iter().filter(|r| r.event_type == event).cloned().collect();

      assert!(filtered.height() <= dataset.len());
      assert_eq!(crate::dataset::records(&filtered).unwrap(), expected);
    }
  }

  #[test]
  fn unknown_event_type_is_an_error() {
    let dataset = sample();
    assert_eq!(filter_by_event_type(&dataset, "Funeral").unwrap().height(), 0);
    assert!(matches!(select_event_type(&dataset, "Funeral"), Err(Error::UnknownEventType(_))));
  }

  #[test]
  fn csv_has_header_and_rows() {
    let filtered = filter_by_event_type(&sample(), "Wedding").unwrap();
    let text = String::from_utf8(encode_csv(&filtered).unwrap()).unwrap();
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Type of Food,Event Type,Number of Guests,Wastage Food Amount");
    assert!(lines[1].starts_with("Meat,Wedding,300,25"));
  }

  #[test]
  fn csv_round_trips() {
    let filtered = filter_by_event_type(&sample(), "Corporate").unwrap();
    let decoded = decode_csv(encode_csv(&filtered).unwrap()).unwrap();
    let decoded = Dataset::from_frame(decoded).unwrap();

    assert_eq!(decoded.records().unwrap(), crate::dataset::records(&filtered).unwrap());
  }

  #[test]
  fn file_name_uses_event_type() {
    assert_eq!(download_file_name("Wedding"), "Wedding_data.csv");
    assert_eq!(download_file_name("Social Gathering"), "Social Gathering_data.csv");
  }

  #[test]
  fn file_name_stays_one_component() {
    assert_eq!(download_file_name("Birthday/Party"), "Birthday_Party_data.csv");
    assert_eq!(download_file_name("a\\b:c"), "a_b_c_data.csv");
    assert_eq!(download_file_name("../../x"), "__.._x_data.csv");

    for event_type in ["../../x", "/etc/passwd", "..", "C:\\temp"] {
      let name = download_file_name(event_type);
      assert_eq!(std::path::Path::new(&name).file_name().unwrap(), name.as_str());
    }
  }
}
