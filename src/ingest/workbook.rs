use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};

use super::IngestError;
use super::table::Cell;

/// Read the first worksheet as raw rows, without header interpretation.
/// A workbook without worksheets reads as no rows.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, IngestError> {
	let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
	match workbook.worksheet_range_at(0) {
		Some(range) => Ok(grid(&range?)),
		None => Ok(Vec::new()),
	}
}

/// Lay the used range out on an A1-anchored grid. Ranges start at their
/// first non-empty cell, so leading rows and columns are padded back in.
fn grid(range: &Range<Data>) -> Vec<Vec<Cell>> {
	let Some((first_row, first_col)) = range.start() else {
		return Vec::new();
	};
	let mut rows: Vec<Vec<Cell>> = (0..first_row).map(|_| Vec::new()).collect();
	for row in range.rows() {
		let mut cells = vec![Cell::Empty; first_col as usize];
		cells.extend(row.iter().map(Cell::from));
		rows.push(cells);
	}
	rows
}

impl From<&Data> for Cell {
	fn from(data: &Data) -> Self {
		match data {
			Data::Empty => Cell::Empty,
			Data::Int(i) => Cell::Number(*i as f64),
			Data::Float(f) => Cell::Number(*f),
			Data::String(s) => Cell::from_text(s),
			other => Cell::from_text(&other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pads_range_back_to_a1() {
		let mut range = Range::new((0, 1), (1, 2));
		range.set_value((0, 1), Data::String("X".into()));
		range.set_value((0, 2), Data::String("Y".into()));
		range.set_value((1, 1), Data::Float(30.0));

		let rows = grid(&range);
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0][0], Cell::Empty);
		assert_eq!(rows[0][1], Cell::Text("X".into()));
		assert_eq!(rows[1][1], Cell::Number(30.0));
		assert_eq!(rows[1][2], Cell::Empty);
	}

	#[test]
	fn pads_leading_rows() {
		let mut range = Range::new((2, 0), (2, 2));
		range.set_value((2, 0), Data::String("A".into()));
		range.set_value((2, 1), Data::Int(2));
		range.set_value((2, 2), Data::String("B".into()));

		let rows = grid(&range);
		assert_eq!(rows.len(), 3);
		assert!(rows[0].is_empty());
		assert_eq!(rows[2][1], Cell::Number(2.0));
	}

	#[test]
	fn empty_range_has_no_rows() {
		assert!(grid(&Range::<Data>::empty()).is_empty());
	}

	#[test]
	fn booleans_become_text() {
		assert_eq!(Cell::from(&Data::Bool(true)), Cell::Text("true".into()));
	}
}
