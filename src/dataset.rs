use std::{fs::File, path::Path};

use polars::prelude::*;

use crate::{Error, Result};

pub const FOOD_TYPE: &str = "Type of Food";
pub const EVENT_TYPE: &str = "Event Type";
pub const GUESTS: &str = "Number of Guests";
pub const WASTAGE: &str = "Wastage Food Amount";

/// The loaded table. Columns beyond the four required ones are kept as-is.
///
/// A `Dataset` is only constructed through validation, so every accessor can
/// rely on the required columns existing, being non-null and having the
/// expected types (`String`, `String`, `Int64`, `Float64`).
#[derive(Debug, Clone)]
pub struct Dataset {
  frame: DataFrame,
}

/// One typed row of the required columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub food_type:  String,
  pub event_type: String,
  pub guests:     i64,
  pub wastage:    f64,
}

impl Dataset {
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let file = File::open(path).map_err(Error::io(path))?;
    let frame = CsvReader::new(file).finish()?;
    log::info!("read {} rows x {} columns from {}", frame.height(), frame.width(), path.display());

    Self::from_frame(frame)
  }

  pub fn from_frame(mut frame: DataFrame) -> Result<Self> {
    if frame.height() == 0 {
      return Err(Error::EmptyDataset);
    }

    coerce_text(&mut frame, FOOD_TYPE)?;
    coerce_text(&mut frame, EVENT_TYPE)?;
    coerce_number(&mut frame, GUESTS, DataType::Int64)?;
    coerce_number(&mut frame, WASTAGE, DataType::Float64)?;

    Ok(Dataset { frame })
  }

  pub fn frame(&self) -> &DataFrame { &self.frame }
  pub fn len(&self) -> usize { self.frame.height() }
  pub fn is_empty(&self) -> bool { self.frame.height() == 0 }

  pub fn column(&self, name: &str) -> Result<&Column> { Ok(self.frame.column(name)?) }

  pub fn records(&self) -> Result<Vec<Record>> { records(&self.frame) }
}

/// Reads the required columns of any frame shaped like a dataset, such as a
/// filtered subset.
pub fn records(frame: &DataFrame) -> Result<Vec<Record>> {
  let food = frame.column(FOOD_TYPE)?.str()?;
  let event = frame.column(EVENT_TYPE)?.str()?;
  let guests = frame.column(GUESTS)?.i64()?;
  let wastage = frame.column(WASTAGE)?.f64()?;

  Ok(
    food
      .into_no_null_iter()
      .zip(event.into_no_null_iter())
      .zip(guests.into_no_null_iter())
      .zip(wastage.into_no_null_iter())
      .map(|(((food, event), guests), wastage)| Record {
        food_type: food.to_string(),
        event_type: event.to_string(),
        guests,
        wastage,
      })
      .collect(),
  )
}

fn require<'a>(frame: &'a DataFrame, name: &'static str) -> Result<&'a Column> {
  frame.column(name).map_err(|_| Error::MissingColumn(name))
}

fn check_nulls(column: &Column, name: &'static str) -> Result<()> {
  match column.null_count() {
    0 => Ok(()),
    count => Err(Error::MissingValues { column: name, count }),
  }
}

fn coerce_text(frame: &mut DataFrame, name: &'static str) -> Result<()> {
  let column = require(frame, name)?;
  check_nulls(column, name)?;

  if column.dtype() != &DataType::String {
    let column = column.cast(&DataType::String)?;
    frame.with_column(column)?;
  }
  Ok(())
}

fn coerce_number(frame: &mut DataFrame, name: &'static str, dtype: DataType) -> Result<()> {
  let column = require(frame, name)?;
  check_nulls(column, name)?;

  if column.dtype() == &DataType::String {
    let reason = "expected numbers, found text".into();
    return Err(Error::InvalidColumn { column: name, reason });
  }
  if dtype.is_integer() && column.dtype().is_float() {
    let fractional = column
      .cast(&DataType::Float64)?
      .f64()?
      .into_no_null_iter()
      .filter(|v| v.fract() != 0.0)
      .count();
    if fractional > 0 {
      let reason = format!("expected whole numbers, found {fractional} fractional values");
      return Err(Error::InvalidColumn { column: name, reason });
    }
  }
  if column.dtype() != &dtype {
    let column = column
      .strict_cast(&dtype)
      .map_err(|e| Error::InvalidColumn { column: name, reason: e.to_string() })?;
    frame.with_column(column)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn frame() -> DataFrame {
    df! {
      FOOD_TYPE => &["Meat", "Vegetables"],
      EVENT_TYPE => &["Wedding", "Birthday"],
      GUESTS => &[310i32, 400],
      WASTAGE => &[25i64, 40],
      "Pricing" => &["Low", "High"],
    }
    .unwrap()
  }

  #[test]
  fn coerces_numeric_columns() {
    let dataset = Dataset::from_frame(frame()).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.column(GUESTS).unwrap().dtype(), &DataType::Int64);
    assert_eq!(dataset.column(WASTAGE).unwrap().dtype(), &DataType::Float64);
    assert_eq!(dataset.frame().width(), 5);

    let records = dataset.records().unwrap();
    assert_eq!(
      records[1],
      Record {
        food_type:  "Vegetables".into(),
        event_type: "Birthday".into(),
        guests:     400,
        wastage:    40.0,
      }
    );
  }

  #[test]
  fn rejects_missing_column() {
    let mut frame = frame();
    let _ = frame.drop_in_place(EVENT_TYPE).unwrap();

    let err = Dataset::from_frame(frame).unwrap_err();
    assert!(matches!(err, Error::MissingColumn(EVENT_TYPE)));
  }

  #[test]
  fn rejects_text_in_numeric_column() {
    let mut frame = frame();
    frame.with_column(Column::new(WASTAGE.into(), &["a lot", "some"])).unwrap();

    let err = Dataset::from_frame(frame).unwrap_err();
    assert!(matches!(err, Error::InvalidColumn { column: WASTAGE, .. }));
  }

  #[test]
  fn rejects_fractional_guest_counts() {
    let mut frame = frame();
    frame.with_column(Column::new(GUESTS.into(), &[100.7, 200.0])).unwrap();

    let err = Dataset::from_frame(frame).unwrap_err();
    assert!(matches!(err, Error::InvalidColumn { column: GUESTS, .. }));

    let mut frame = self::frame();
    frame.with_column(Column::new(GUESTS.into(), &[100.0, 200.0])).unwrap();
    let dataset = Dataset::from_frame(frame).unwrap();
    assert_eq!(dataset.records().unwrap()[0].guests, 100);
  }

  #[test]
  fn rejects_missing_values() {
    let mut frame = frame();
    frame.with_column(Column::new(GUESTS.into(), &[Some(10i64), None])).unwrap();

    let err = Dataset::from_frame(frame).unwrap_err();
    assert!(matches!(err, Error::MissingValues { column: GUESTS, count: 1 }));
  }

  #[test]
  fn rejects_empty_frame() {
    let frame = frame().head(Some(0));
    assert!(matches!(Dataset::from_frame(frame), Err(Error::EmptyDataset)));
  }
}
